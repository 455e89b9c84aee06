//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod exchange_code;
pub mod route_guard;
pub mod sign_out;
pub mod validate_session;

// Re-exports
pub use config::{FailurePolicy, SessionConfig};
pub use exchange_code::{CodeExchangeOutput, ExchangeCodeUseCase};
pub use route_guard::{GuardOutcome, GuardVerdict, RouteGuardUseCase};
pub use sign_out::SignOutUseCase;
pub use validate_session::{SessionOutcome, ValidateSessionUseCase};
