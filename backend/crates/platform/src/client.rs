//! Client identification utilities
//!
//! Used to tag request logs with the caller's address.

use http::HeaderMap;
use std::net::IpAddr;

/// Extract client IP address from headers
///
/// Checks `X-Forwarded-For` (first hop) and then `X-Real-IP` for reverse
/// proxy setups, then falls back to the direct connection IP.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    if forwarded.is_some() {
        return forwarded;
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}
