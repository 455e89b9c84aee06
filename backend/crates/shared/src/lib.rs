//! Shared Kernel - vocabulary shared by every portal crate
//!
//! Only things with a stable meaning across the whole backend live here:
//! - The unified error type ([`error::app_error::AppError`]) and its kinds
//! - Conversions from library errors into that type
//! - Typed identifiers for records owned by the hosted backend

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
