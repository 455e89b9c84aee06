//! Session Middleware
//!
//! Runs on every request: validates (and refreshes) the session, redirects
//! between the auth and protected route trees, and puts every cookie the
//! session client staged on whichever response goes out.

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use kernel::error::app_error::AppError;
use platform::client::extract_client_ip;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::application::{GuardVerdict, RouteGuardUseCase};
use crate::domain::client::SessionClient;
use crate::presentation::bridge::{append_set_cookies, request_cookies, set_cookie_headers};

/// Middleware state
#[derive(Clone)]
pub struct SessionMiddlewareState<C>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    pub client: Arc<C>,
    pub config: Arc<SessionConfig>,
}

/// Session gate, for `axum::middleware::from_fn_with_state`
///
/// The incoming request is handed on untouched. Staged cookies are rendered
/// before the next handler runs; one that cannot be expressed as a header
/// fails the request with 500.
pub async fn session_guard<C>(
    State(state): State<SessionMiddlewareState<C>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    let path = req.uri().path().to_string();

    if state.config.path_matcher.excludes(&path) {
        return next.run(req).await;
    }

    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let client_ip = extract_client_ip(req.headers(), direct_ip);

    let cookies = request_cookies(req.headers());
    let use_case = RouteGuardUseCase::new(state.client.clone(), state.config.clone());
    let outcome = use_case.execute(&path, cookies).await;

    tracing::debug!(
        path = %path,
        client_ip = ?client_ip,
        route = %outcome.route,
        decision = %outcome.decision,
        authenticated = outcome.authenticated,
        staged_cookies = outcome.cookies.len(),
        "Session gate decided"
    );

    let set_cookies = match set_cookie_headers(&outcome.cookies) {
        Ok(values) => values,
        Err(e) => return e.into_response(),
    };

    let mut response = match outcome.verdict {
        GuardVerdict::Continue => next.run(req).await,
        GuardVerdict::Redirect { location } => Redirect::temporary(&location).into_response(),
        GuardVerdict::Unavailable => {
            AppError::service_unavailable("Authentication service is unavailable")
                .with_action("Try again in a moment")
                .into_response()
        }
    };

    append_set_cookies(&mut response, set_cookies);
    response
}
