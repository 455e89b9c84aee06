//! Exchange Code Use Case
//!
//! Finishes an OAuth / email-link sign-in: the auth service redirects back
//! with a one-time code, which is traded for a session.

use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::domain::client::SessionClient;
use crate::domain::cookie::{CookieStage, RequestCookie};
use crate::domain::cookie_bridge::CookieBridge;
use crate::domain::user::AuthenticatedUser;
use crate::error::{SessionError, SessionResult};

/// Where the browser goes next, and with which cookies
#[derive(Debug)]
pub struct CodeExchangeOutput {
    pub user: Option<AuthenticatedUser>,
    pub location: String,
    pub cookies: CookieStage,
}

/// Exchange code use case
pub struct ExchangeCodeUseCase<C>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    client: Arc<C>,
    config: Arc<SessionConfig>,
}

impl<C> ExchangeCodeUseCase<C>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    pub fn new(client: Arc<C>, config: Arc<SessionConfig>) -> Self {
        Self { client, config }
    }

    /// Success lands on the signed-in area; any failure goes back to sign-in
    /// with `?error=callback_error`.
    pub async fn execute(
        &self,
        code: Option<&str>,
        request_cookies: Vec<RequestCookie>,
    ) -> CodeExchangeOutput {
        let mut bridge = CookieBridge::new(request_cookies);

        let result = match code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => self.exchange(code, &mut bridge).await,
            None => Err(SessionError::CodeRejected("missing code".to_string())),
        };

        match result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Auth callback completed");
                CodeExchangeOutput {
                    user: Some(user),
                    location: self.config.landing_path.clone(),
                    cookies: bridge.into_staged(),
                }
            }
            Err(e) => {
                e.log();
                CodeExchangeOutput {
                    user: None,
                    location: self.config.callback_error_location(),
                    cookies: bridge.into_staged(),
                }
            }
        }
    }

    async fn exchange(&self, code: &str, bridge: &mut CookieBridge) -> SessionResult<AuthenticatedUser> {
        let timeout = self.config.validation_timeout;
        tokio::time::timeout(timeout, self.client.exchange_code_for_session(code, bridge))
            .await
            .map_err(|_| SessionError::Timeout(timeout))?
    }
}
