//! Sign Out Use Case

use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::domain::client::SessionClient;
use crate::domain::cookie::{CookieStage, RequestCookie};
use crate::domain::cookie_bridge::CookieBridge;
use crate::error::SessionError;

/// Sign out use case
pub struct SignOutUseCase<C>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    client: Arc<C>,
    config: Arc<SessionConfig>,
}

impl<C> SignOutUseCase<C>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    pub fn new(client: Arc<C>, config: Arc<SessionConfig>) -> Self {
        Self { client, config }
    }

    /// Revoke the session and return the cookie removals
    ///
    /// Revocation errors are logged and swallowed: the browser loses its
    /// session cookies either way.
    pub async fn execute(&self, request_cookies: Vec<RequestCookie>) -> CookieStage {
        let mut bridge = CookieBridge::new(request_cookies);
        let timeout = self.config.validation_timeout;

        let result = tokio::time::timeout(timeout, self.client.sign_out(&mut bridge))
            .await
            .map_err(|_| SessionError::Timeout(timeout))
            .and_then(|r| r);

        if let Err(e) = result {
            tracing::warn!(error = %e, "Sign out could not revoke the session, clearing cookies anyway");
        }

        bridge.into_staged()
    }
}
