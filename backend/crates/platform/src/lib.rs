//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the portal backend:
//! - Cookie header parsing and chunked cookie values
//! - Client identification for request logging
//! - Outbound HTTP client construction

pub mod client;
pub mod cookie;
pub mod http_client;
