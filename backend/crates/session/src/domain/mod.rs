//! Domain Layer
//!
//! Cookie staging, path matching, route classification, the redirect
//! decision, and the session client interface.

pub mod client;
pub mod cookie;
pub mod cookie_bridge;
pub mod decision;
pub mod matcher;
pub mod route;
pub mod user;

// Re-exports
pub use client::{LocalSessionClient, SessionClient};
pub use cookie::{CookieOptions, CookieStage, RequestCookie, SessionCookie};
pub use cookie_bridge::CookieBridge;
pub use decision::{Decision, decide};
pub use matcher::PathMatcher;
pub use route::{RouteClass, RouteClassifier};
pub use user::AuthenticatedUser;
