//! Session Error Types
//!
//! Session-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use std::time::Duration;
use thiserror::Error;

/// Session-specific result type alias
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-specific error variants
#[derive(Debug, Error)]
pub enum SessionError {
    /// Auth service could not be reached or the response could not be read
    #[error("Auth service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Auth service did not answer within the validation timeout
    #[error("Auth service timed out after {0:?}")]
    Timeout(Duration),

    /// Auth service answered with an unexpected status
    #[error("Auth service responded with {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Session cookie present but not decodable
    #[error("Session cookie is malformed: {0}")]
    MalformedSession(String),

    /// Code exchange started without the PKCE verifier cookie
    #[error("Code verifier cookie is missing")]
    MissingCodeVerifier,

    /// Auth service refused the one-time code
    #[error("Auth code was rejected: {0}")]
    CodeRejected(String),

    /// Staged cookie cannot be expressed as a Set-Cookie header
    #[error("Cookie could not be staged: {0}")]
    CookieStaging(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Transport(e) if e.is_timeout() => ErrorKind::GatewayTimeout,
            SessionError::Transport(e) if e.is_connect() => ErrorKind::ServiceUnavailable,
            SessionError::Transport(_) => ErrorKind::BadGateway,
            SessionError::Timeout(_) => ErrorKind::GatewayTimeout,
            SessionError::Upstream { status, .. } => match ErrorKind::from_upstream_status(*status)
            {
                // A 4xx from the auth service on our own call is still our
                // gateway's problem, not the browser's.
                kind if kind.is_client_error() => ErrorKind::BadGateway,
                kind => kind,
            },
            SessionError::MalformedSession(_)
            | SessionError::MissingCodeVerifier
            | SessionError::CodeRejected(_) => ErrorKind::Unauthorized,
            SessionError::CookieStaging(_) | SessionError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Failure of the auth service itself (as opposed to a bad session)
    pub fn is_upstream(&self) -> bool {
        self.kind().is_upstream()
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            SessionError::MalformedSession(_)
            | SessionError::MissingCodeVerifier
            | SessionError::CodeRejected(_) => err.with_action("Sign in again"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            SessionError::Transport(e) => {
                tracing::error!(error = %e, "Auth service transport error");
            }
            SessionError::Upstream { status, message } => {
                tracing::error!(status = *status, message = %message, "Auth service error response");
            }
            SessionError::CookieStaging(msg) | SessionError::Internal(msg) => {
                tracing::error!(message = %msg, "Session internal error");
            }
            SessionError::Timeout(after) => {
                tracing::warn!(timeout = ?after, "Auth service timed out");
            }
            SessionError::CodeRejected(_) | SessionError::MissingCodeVerifier => {
                tracing::warn!(error = %self, "Auth code exchange failed");
            }
            SessionError::MalformedSession(_) => {
                tracing::debug!(error = %self, "Session error");
            }
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Transport(e) => AppError::from(e),
            other => other.to_app_error(),
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
