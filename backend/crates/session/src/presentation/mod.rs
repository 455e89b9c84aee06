//! Presentation Layer
//!
//! axum middleware, handlers, DTOs, router, and the cookie header adapters.

pub mod bridge;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::SessionAppState;
pub use middleware::{SessionMiddlewareState, session_guard};
pub use router::{session_router, with_session_gate};
