//! Infrastructure Layer
//!
//! Hosted auth service client and the cookie format it stores sessions in.

pub mod gotrue;
pub mod storage;

pub use gotrue::{GoTrueClient, GoTrueConfig};
