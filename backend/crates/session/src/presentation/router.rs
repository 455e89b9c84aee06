//! Session Router

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::domain::client::SessionClient;
use crate::presentation::handlers::{self, SessionAppState};
use crate::presentation::middleware::{SessionMiddlewareState, session_guard};

/// Auth endpoints: code exchange callback, sign out, session status
///
/// Routes live under the configured auth prefix and are not gated; merge the
/// router beside the gated one.
pub fn session_router<C>(client: Arc<C>, config: Arc<SessionConfig>) -> Router
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    let prefix = match config.auth_prefix.trim_matches('/') {
        "" => String::new(),
        trimmed => format!("/{trimmed}"),
    };
    let state = SessionAppState { client, config };

    Router::new()
        .route(&format!("{prefix}/callback"), get(handlers::callback::<C>))
        .route(&format!("{prefix}/signout"), post(handlers::sign_out::<C>))
        .route(&format!("{prefix}/session"), get(handlers::session_status::<C>))
        .with_state(state)
}

/// Put `router` (routes and fallback) behind the session gate
pub fn with_session_gate<C>(router: Router, client: Arc<C>, config: Arc<SessionConfig>) -> Router
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    let state = SessionMiddlewareState { client, config };
    router.layer(from_fn_with_state(state, session_guard::<C>))
}
