//! HTTP Handlers
//!
//! Auth endpoints that need the session client directly. They are mounted
//! beside the gate, not behind it.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::application::{ExchangeCodeUseCase, SignOutUseCase, ValidateSessionUseCase};
use crate::domain::client::SessionClient;
use crate::error::SessionResult;
use crate::presentation::bridge::{apply_cookies, request_cookies};
use crate::presentation::dto::{CallbackQuery, SessionStatusResponse};

/// Shared state for session handlers
#[derive(Clone)]
pub struct SessionAppState<C>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    pub client: Arc<C>,
    pub config: Arc<SessionConfig>,
}

// ============================================================================
// Auth Callback
// ============================================================================

/// GET /auth/callback
pub async fn callback<C>(
    State(state): State<SessionAppState<C>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> SessionResult<Response>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    if let Some(error) = &query.error {
        tracing::warn!(
            error = %error,
            description = query.error_description.as_deref().unwrap_or_default(),
            "Auth provider returned an error"
        );
    }

    let use_case = ExchangeCodeUseCase::new(state.client.clone(), state.config.clone());
    let output = use_case
        .execute(query.code.as_deref(), request_cookies(&headers))
        .await;

    let mut response = Redirect::temporary(&output.location).into_response();
    apply_cookies(&mut response, &output.cookies)?;
    Ok(response)
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /auth/signout
pub async fn sign_out<C>(
    State(state): State<SessionAppState<C>>,
    headers: HeaderMap,
) -> SessionResult<Response>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    let use_case = SignOutUseCase::new(state.client.clone(), state.config.clone());
    let cookies = use_case.execute(request_cookies(&headers)).await;

    let mut response = StatusCode::NO_CONTENT.into_response();
    apply_cookies(&mut response, &cookies)?;
    Ok(response)
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /auth/session
pub async fn session_status<C>(
    State(state): State<SessionAppState<C>>,
    headers: HeaderMap,
) -> SessionResult<Response>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    let use_case = ValidateSessionUseCase::new(state.client.clone(), state.config.clone());
    let outcome = use_case.execute(request_cookies(&headers)).await;

    if let Some(failure) = &outcome.failure {
        failure.log();
    }

    let body = match &outcome.user {
        Some(user) => SessionStatusResponse {
            authenticated: true,
            user_id: Some(user.id.to_string()),
            email: user.email.clone(),
        },
        None => SessionStatusResponse {
            authenticated: false,
            user_id: None,
            email: None,
        },
    };

    let mut response = Json(body).into_response();
    apply_cookies(&mut response, &outcome.cookies)?;
    Ok(response)
}
