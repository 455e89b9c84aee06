//! Session Gate
//!
//! Clean Architecture structure:
//! - `domain/` - Cookie staging, route classification, redirect decision, session client trait
//! - `application/` - Use cases and configuration
//! - `infra/` - Hosted auth service (GoTrue) client and session cookie format
//! - `presentation/` - axum middleware, handlers, router
//!
//! ## Request flow
//! - Every non-asset request has its session validated (refreshed when close to expiry)
//! - Anonymous visitors of protected pages go to sign-in; signed-in visitors of auth pages go to the landing page
//! - Cookies the auth client stages ride on whichever response is returned
//! - Auth service failures count as signed out unless the policy is fail-closed

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{FailurePolicy, SessionConfig};
pub use domain::client::SessionClient;
pub use error::{SessionError, SessionResult};
pub use infra::gotrue::{GoTrueClient, GoTrueConfig};
pub use presentation::router::{session_router, with_session_gate};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
