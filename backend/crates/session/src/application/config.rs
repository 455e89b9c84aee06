//! Application Configuration
//!
//! Configuration for the session gate.

use std::str::FromStr;
use std::time::Duration;

use crate::domain::decision::Decision;
use crate::domain::matcher::PathMatcher;
use crate::domain::route::RouteClassifier;

/// What the gate does when the auth service cannot be consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Treat the visitor as signed out
    #[default]
    FailOpen,
    /// Answer gated routes with 503 Service Unavailable
    FailClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown failure policy: {0} (expected `open` or `closed`)")]
pub struct ParseFailurePolicyError(String);

impl FromStr for FailurePolicy {
    type Err = ParseFailurePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" | "fail-open" | "fail_open" => Ok(FailurePolicy::FailOpen),
            "closed" | "fail-closed" | "fail_closed" => Ok(FailurePolicy::FailClosed),
            _ => Err(ParseFailurePolicyError(s.to_string())),
        }
    }
}

/// Session gate configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Prefix of the sign-in / sign-up / reset pages
    pub auth_prefix: String,
    /// Prefix of the signed-in area
    pub protected_prefix: String,
    /// Where anonymous visitors of protected pages are sent
    pub sign_in_path: String,
    /// Where signed-in visitors of auth pages are sent
    pub landing_path: String,
    pub failure_policy: FailurePolicy,
    /// Upper bound on one session validation round trip
    pub validation_timeout: Duration,
    /// Requests that bypass the gate entirely
    pub path_matcher: PathMatcher,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auth_prefix: "/auth".to_string(),
            protected_prefix: "/dashboard".to_string(),
            sign_in_path: "/auth/signin".to_string(),
            landing_path: "/dashboard".to_string(),
            failure_policy: FailurePolicy::FailOpen,
            validation_timeout: Duration::from_secs(5),
            path_matcher: PathMatcher::default(),
        }
    }
}

impl SessionConfig {
    /// Local auth containers answer slowly on a cold start
    pub fn development() -> Self {
        Self {
            validation_timeout: Duration::from_secs(15),
            ..Self::default()
        }
    }

    pub fn classifier(&self) -> RouteClassifier {
        RouteClassifier::new(&self.auth_prefix, &self.protected_prefix)
    }

    /// Location header for a redirecting decision
    pub fn redirect_location(&self, decision: Decision) -> Option<&str> {
        match decision {
            Decision::Continue => None,
            Decision::RedirectToSignIn => Some(&self.sign_in_path),
            Decision::RedirectToLanding => Some(&self.landing_path),
        }
    }

    /// Sign-in page flagged with the callback failure
    pub fn callback_error_location(&self) -> String {
        format!("{}?error=callback_error", self.sign_in_path)
    }

    pub fn validation_timeout_ms(&self) -> u64 {
        u64::try_from(self.validation_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_policy_parse() {
        assert_eq!("open".parse::<FailurePolicy>().unwrap(), FailurePolicy::FailOpen);
        assert_eq!("Fail-Closed".parse::<FailurePolicy>().unwrap(), FailurePolicy::FailClosed);
        assert!("maybe".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_redirect_locations() {
        let config = SessionConfig::default();
        assert_eq!(config.redirect_location(Decision::Continue), None);
        assert_eq!(
            config.redirect_location(Decision::RedirectToSignIn),
            Some("/auth/signin")
        );
        assert_eq!(
            config.redirect_location(Decision::RedirectToLanding),
            Some("/dashboard")
        );
        assert_eq!(
            config.callback_error_location(),
            "/auth/signin?error=callback_error"
        );
    }

    #[test]
    fn test_timeout_millis_saturate() {
        let mut config = SessionConfig::default();
        config.validation_timeout = Duration::from_millis(1500);
        assert_eq!(config.validation_timeout_ms(), 1500);

        config.validation_timeout = Duration::MAX;
        assert_eq!(config.validation_timeout_ms(), u64::MAX);
    }
}
