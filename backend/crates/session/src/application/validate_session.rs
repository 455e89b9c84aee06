//! Validate Session Use Case
//!
//! Runs the session client's "get current user" against the request cookies
//! under the configured timeout.

use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::domain::client::SessionClient;
use crate::domain::cookie::{CookieStage, RequestCookie};
use crate::domain::cookie_bridge::CookieBridge;
use crate::domain::user::AuthenticatedUser;
use crate::error::SessionError;

/// Result of one validation round trip
///
/// `cookies` holds everything the client staged, including on failure: a
/// refresh that rotated the tokens before a later step failed must still
/// reach the browser.
#[derive(Debug)]
pub struct SessionOutcome {
    pub user: Option<AuthenticatedUser>,
    pub cookies: CookieStage,
    pub failure: Option<SessionError>,
}

impl SessionOutcome {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Validate session use case
pub struct ValidateSessionUseCase<C>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    client: Arc<C>,
    config: Arc<SessionConfig>,
}

impl<C> ValidateSessionUseCase<C>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    pub fn new(client: Arc<C>, config: Arc<SessionConfig>) -> Self {
        Self { client, config }
    }

    /// Validate the session; never fails, failures are reported in the outcome
    pub async fn execute(&self, request_cookies: Vec<RequestCookie>) -> SessionOutcome {
        let mut bridge = CookieBridge::new(request_cookies);
        let timeout = self.config.validation_timeout;

        let result = tokio::time::timeout(timeout, self.client.get_user(&mut bridge)).await;

        let (user, failure) = match result {
            Ok(Ok(user)) => (user, None),
            Ok(Err(e)) => (None, Some(e)),
            Err(_) => (None, Some(SessionError::Timeout(timeout))),
        };

        SessionOutcome {
            user,
            cookies: bridge.into_staged(),
            failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fakes::{FakeSessionClient, TOKEN_COOKIE};
    use std::time::Duration;

    fn use_case(client: FakeSessionClient, timeout: Duration) -> ValidateSessionUseCase<FakeSessionClient> {
        let config = SessionConfig {
            validation_timeout: timeout,
            ..SessionConfig::default()
        };
        ValidateSessionUseCase::new(Arc::new(client), Arc::new(config))
    }

    #[tokio::test]
    async fn test_valid_session() {
        let uc = use_case(FakeSessionClient::tokens(), Duration::from_secs(1));
        let outcome = uc
            .execute(vec![RequestCookie::new(TOKEN_COOKIE, "valid")])
            .await;

        assert!(outcome.is_authenticated());
        assert!(outcome.failure.is_none());
        assert!(outcome.cookies.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_stages_latest_cookie() {
        let uc = use_case(FakeSessionClient::tokens(), Duration::from_secs(1));
        let outcome = uc
            .execute(vec![RequestCookie::new(TOKEN_COOKIE, "stale")])
            .await;

        assert!(outcome.is_authenticated());
        assert_eq!(outcome.cookies.len(), 1);
        assert_eq!(outcome.cookies.get(TOKEN_COOKIE).unwrap().value, "valid");
    }

    #[tokio::test]
    async fn test_failure_keeps_staged_cookies() {
        let uc = use_case(FakeSessionClient::failing(), Duration::from_secs(1));
        let outcome = uc.execute(vec![]).await;

        assert!(!outcome.is_authenticated());
        assert!(matches!(outcome.failure, Some(SessionError::Upstream { status: 503, .. })));
        assert!(outcome.cookies.get("sb-test-probe").is_some());
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let uc = use_case(FakeSessionClient::hanging(), Duration::from_millis(20));
        let outcome = uc.execute(vec![]).await;

        assert!(!outcome.is_authenticated());
        assert!(matches!(outcome.failure, Some(SessionError::Timeout(_))));
    }
}
