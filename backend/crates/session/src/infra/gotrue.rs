//! Hosted Auth Service Client
//!
//! Talks to the GoTrue REST API (`/auth/v1/*`) with the project's public
//! key. The session lives in browser cookies only; every call reads it from
//! the [`CookieBridge`] and stages whatever the browser must store next.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::domain::client::SessionClient;
use crate::domain::cookie::{CookieOptions, SameSite};
use crate::domain::cookie_bridge::CookieBridge;
use crate::domain::user::AuthenticatedUser;
use crate::error::{SessionError, SessionResult};
use crate::infra::storage::{self, StoredSession};

/// Browsers cap cookie lifetime at 400 days
pub const DEFAULT_COOKIE_MAX_AGE_SECS: i64 = 400 * 24 * 60 * 60;

/// Access tokens this close to expiry are refreshed before use
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Connection settings for the hosted auth service
#[derive(Debug, Clone)]
pub struct GoTrueConfig {
    /// Project URL, without the `/auth/v1` suffix
    pub base_url: String,
    /// Public (anon) API key
    pub anon_key: String,
    /// Cookie name the session is stored under
    pub storage_key: String,
    pub cookie_options: CookieOptions,
    pub refresh_margin: Duration,
    pub chunk_size: usize,
}

impl GoTrueConfig {
    /// Production settings: secure cookies, storage key derived from the
    /// project URL (`https://<ref>.supabase.co` -> `sb-<ref>-auth-token`)
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> SessionResult<Self> {
        let url = reqwest::Url::parse(base_url)
            .map_err(|e| SessionError::Internal(format!("Invalid auth service URL: {e}")))?;
        let project_ref = url
            .host_str()
            .and_then(|host| host.split('.').next())
            .filter(|label| !label.is_empty())
            .ok_or_else(|| SessionError::Internal("Auth service URL has no host".to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            storage_key: format!("sb-{project_ref}-auth-token"),
            cookie_options: CookieOptions {
                path: Some("/".to_string()),
                domain: None,
                max_age_secs: Some(DEFAULT_COOKIE_MAX_AGE_SECS),
                expires: None,
                secure: true,
                http_only: false,
                same_site: Some(SameSite::Lax),
            },
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            chunk_size: platform::cookie::MAX_CHUNK_SIZE,
        })
    }

    /// Settings for local development (cookies over plain HTTP)
    pub fn development(base_url: &str, anon_key: impl Into<String>) -> SessionResult<Self> {
        let mut config = Self::new(base_url, anon_key)?;
        config.cookie_options.secure = false;
        Ok(config)
    }

    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{path}", self.base_url)
    }
}

/// Error payload shapes returned by GoTrue
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.msg.or(b.error_description).or(b.message).or(b.error))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

async fn upstream_error(response: reqwest::Response) -> SessionError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    SessionError::Upstream {
        status,
        message: error_message(&body),
    }
}

/// Session client backed by the hosted auth service
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    config: Arc<GoTrueConfig>,
}

impl GoTrueClient {
    pub fn new(http: reqwest::Client, config: GoTrueConfig) -> Self {
        Self {
            http,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &GoTrueConfig {
        &self.config
    }

    /// Trade a refresh token for a new session
    ///
    /// `Ok(None)` when the auth service no longer honours the token.
    async fn refresh(&self, refresh_token: &str) -> SessionResult<Option<StoredSession>> {
        if refresh_token.is_empty() {
            return Ok(None);
        }

        let response = self
            .http
            .post(self.config.endpoint("/token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let session: StoredSession = response.json().await?;
                tracing::debug!("Session refreshed");
                Ok(Some(session.with_expiry_from(Utc::now().timestamp())))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                let message = error_message(&response.text().await.unwrap_or_default());
                tracing::debug!(reason = %message, "Refresh token rejected");
                Ok(None)
            }
            _ => Err(upstream_error(response).await),
        }
    }

    /// User owning `access_token`, `None` when the token is not accepted
    async fn fetch_user(&self, access_token: &str) -> SessionResult<Option<AuthenticatedUser>> {
        let response = self
            .http
            .get(self.config.endpoint("/user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(upstream_error(response).await),
        }
    }

    fn store_session(&self, session: &StoredSession, bridge: &mut CookieBridge) -> SessionResult<()> {
        let encoded = storage::encode_session(session)?;
        let cookies = storage::store_cookies(
            &self.config.storage_key,
            &encoded,
            &self.config.cookie_options,
            self.config.chunk_size,
            bridge.get_all(),
        );
        bridge.set_all(cookies);
        Ok(())
    }

    fn clear_session(&self, bridge: &mut CookieBridge) {
        let removals = storage::removal_cookies(
            &self.config.storage_key,
            &self.config.cookie_options,
            bridge.get_all(),
        );
        bridge.set_all(removals);
    }

    fn clear_code_verifier(&self, bridge: &mut CookieBridge) {
        let name = storage::code_verifier_name(&self.config.storage_key);
        let removals = storage::removal_cookies(&name, &self.config.cookie_options, bridge.get_all());
        bridge.set_all(removals);
    }

    /// Session cookie contents; unreadable cookies count as no session
    fn current_session(&self, bridge: &CookieBridge) -> Option<StoredSession> {
        match storage::read_session(bridge, &self.config.storage_key) {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable session cookie");
                None
            }
        }
    }
}

impl SessionClient for GoTrueClient {
    async fn get_user(&self, cookies: &mut CookieBridge) -> SessionResult<Option<AuthenticatedUser>> {
        let Some(session) = self.current_session(cookies) else {
            return Ok(None);
        };

        let margin = i64::try_from(self.config.refresh_margin.as_secs()).unwrap_or(i64::MAX);
        let session = if session.expires_within(Utc::now().timestamp(), margin) {
            match self.refresh(&session.refresh_token).await? {
                Some(fresh) => {
                    self.store_session(&fresh, cookies)?;
                    fresh
                }
                None => {
                    self.clear_session(cookies);
                    return Ok(None);
                }
            }
        } else {
            session
        };

        self.fetch_user(&session.access_token).await
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        cookies: &mut CookieBridge,
    ) -> SessionResult<AuthenticatedUser> {
        let verifier = storage::read_code_verifier(cookies, &self.config.storage_key)?
            .ok_or(SessionError::MissingCodeVerifier)?;

        let response = self
            .http
            .post(self.config.endpoint("/token"))
            .query(&[("grant_type", "pkce")])
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "auth_code": code, "code_verifier": verifier }))
            .send()
            .await?;

        // The verifier is single use whatever the outcome.
        self.clear_code_verifier(cookies);

        let session = match response.status() {
            StatusCode::OK => response
                .json::<StoredSession>()
                .await?
                .with_expiry_from(Utc::now().timestamp()),
            status if status.is_client_error() => {
                let message = error_message(&response.text().await.unwrap_or_default());
                return Err(SessionError::CodeRejected(message));
            }
            _ => return Err(upstream_error(response).await),
        };

        let embedded = session
            .user
            .clone()
            .and_then(|user| serde_json::from_value::<AuthenticatedUser>(user).ok());
        let user = match embedded {
            Some(user) => user,
            None => self
                .fetch_user(&session.access_token)
                .await?
                .ok_or_else(|| SessionError::CodeRejected("issued session has no user".to_string()))?,
        };

        self.store_session(&session, cookies)?;
        Ok(user)
    }

    async fn sign_out(&self, cookies: &mut CookieBridge) -> SessionResult<()> {
        let session = self.current_session(cookies);
        self.clear_session(cookies);

        let Some(session) = session else {
            return Ok(());
        };

        let response = self
            .http
            .post(self.config.endpoint("/logout"))
            .query(&[("scope", "local")])
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Already revoked or expired
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(upstream_error(response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cookie::RequestCookie;
    use mockito::{Matcher, Server};

    const KEY: &str = "sb-test-auth-token";
    const USER_ID: &str = "5f0c3a52-8d2e-4a36-9a47-0d1f5e3b7c11";

    fn client(base_url: &str) -> GoTrueClient {
        let config = GoTrueConfig::development(base_url, "anon-key")
            .unwrap()
            .with_storage_key(KEY);
        GoTrueClient::new(reqwest::Client::new(), config)
    }

    fn session(access: &str, expires_at: i64) -> StoredSession {
        StoredSession {
            access_token: access.to_string(),
            refresh_token: format!("refresh-for-{access}"),
            token_type: Some("bearer".to_string()),
            expires_in: Some(3600),
            expires_at: Some(expires_at),
            user: None,
        }
    }

    fn cookies_with(session: &StoredSession) -> CookieBridge {
        CookieBridge::new(vec![RequestCookie::new(
            KEY,
            storage::encode_session(session).unwrap(),
        )])
    }

    fn user_body() -> String {
        json!({
            "id": USER_ID,
            "aud": "authenticated",
            "role": "authenticated",
            "email": "member@example.org"
        })
        .to_string()
    }

    fn token_body(access: &str) -> String {
        json!({
            "access_token": access,
            "refresh_token": format!("refresh-for-{access}"),
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {
                "id": USER_ID,
                "role": "authenticated",
                "email": "member@example.org"
            }
        })
        .to_string()
    }

    fn later() -> i64 {
        Utc::now().timestamp() + 3600
    }

    fn earlier() -> i64 {
        Utc::now().timestamp() - 10
    }

    #[test]
    fn test_storage_key_derived_from_project_url() {
        let config = GoTrueConfig::new("https://abcdefgh.supabase.co/", "key").unwrap();
        assert_eq!(config.storage_key, "sb-abcdefgh-auth-token");
        assert_eq!(config.base_url, "https://abcdefgh.supabase.co");
        assert!(config.cookie_options.secure);
        assert!(!config.cookie_options.http_only);
        assert_eq!(config.cookie_options.max_age_secs, Some(34_560_000));

        assert!(!GoTrueConfig::development("http://localhost:54321", "key")
            .unwrap()
            .cookie_options
            .secure);
        assert!(GoTrueConfig::new("not a url", "key").is_err());
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(error_message(r#"{"msg":"m"}"#), "m");
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#),
            "Invalid Refresh Token"
        );
        assert_eq!(error_message("plain text"), "plain text");
    }

    #[tokio::test]
    async fn test_no_cookie_makes_no_request() {
        let mut server = Server::new_async().await;
        let user = server.mock("GET", "/auth/v1/user").expect(0).create_async().await;

        let mut bridge = CookieBridge::default();
        let result = client(&server.url()).get_user(&mut bridge).await.unwrap();

        assert!(result.is_none());
        assert!(bridge.staged().is_empty());
        user.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_cookie_is_no_session() {
        let server = Server::new_async().await;
        let mut bridge = CookieBridge::new(vec![RequestCookie::new(KEY, "base64-%%%")]);

        let result = client(&server.url()).get_user(&mut bridge).await.unwrap();
        assert!(result.is_none());
        assert!(bridge.staged().is_empty());
    }

    #[tokio::test]
    async fn test_fresh_session_returns_user() {
        let mut server = Server::new_async().await;
        let user = server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer access-1")
            .match_header("apikey", "anon-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(user_body())
            .create_async()
            .await;

        let mut bridge = cookies_with(&session("access-1", later()));
        let result = client(&server.url()).get_user(&mut bridge).await.unwrap();

        assert_eq!(result.unwrap().email.as_deref(), Some("member@example.org"));
        assert!(bridge.staged().is_empty());
        user.assert_async().await;
    }

    #[tokio::test]
    async fn test_expiring_session_is_refreshed_and_staged() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()))
            .match_body(Matcher::Json(json!({ "refresh_token": "refresh-for-access-1" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(token_body("access-2"))
            .create_async()
            .await;
        let user = server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer access-2")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(user_body())
            .create_async()
            .await;

        let mut bridge = cookies_with(&session("access-1", earlier()));
        let result = client(&server.url()).get_user(&mut bridge).await.unwrap();
        assert!(result.is_some());

        let staged = bridge.staged().get(KEY).unwrap();
        let stored = storage::decode_session(&staged.value).unwrap();
        assert_eq!(stored.access_token, "access-2");
        assert!(stored.expires_at.is_some());
        assert_eq!(staged.options.same_site, Some(SameSite::Lax));

        token.assert_async().await;
        user.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_refresh_expires_cookies() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()))
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#)
            .create_async()
            .await;

        let mut bridge = cookies_with(&session("access-1", earlier()));
        let result = client(&server.url()).get_user(&mut bridge).await.unwrap();

        assert!(result.is_none());
        assert!(bridge.staged().get(KEY).unwrap().is_removal());
    }

    #[tokio::test]
    async fn test_out_of_range_expiry_is_refreshed() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()))
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#)
            .create_async()
            .await;

        let raw = r#"{"access_token":"a","refresh_token":"r","expires_at":-9223372036854775808}"#;
        let mut bridge = CookieBridge::new(vec![RequestCookie::new(KEY, raw)]);
        let result = client(&server.url()).get_user(&mut bridge).await.unwrap();

        assert!(result.is_none());
        assert!(bridge.staged().get(KEY).unwrap().is_removal());
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_revoked_token_is_no_session() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/auth/v1/user")
            .with_status(401)
            .with_body(r#"{"msg":"invalid JWT"}"#)
            .create_async()
            .await;

        let mut bridge = cookies_with(&session("access-1", later()));
        assert!(client(&server.url()).get_user(&mut bridge).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/auth/v1/user")
            .with_status(500)
            .with_body(r#"{"message":"database unavailable"}"#)
            .create_async()
            .await;

        let mut bridge = cookies_with(&session("access-1", later()));
        let err = client(&server.url()).get_user(&mut bridge).await.unwrap_err();

        match err {
            SessionError::Upstream { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "database unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_failure() {
        let mut bridge = cookies_with(&session("access-1", later()));
        let err = client("http://127.0.0.1:1").get_user(&mut bridge).await.unwrap_err();

        assert!(matches!(err, SessionError::Transport(_)));
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_code_exchange_stores_session() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "pkce".into()))
            .match_body(Matcher::Json(json!({
                "auth_code": "code-1",
                "code_verifier": "verifier-1"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(token_body("access-9"))
            .create_async()
            .await;

        let verifier_cookie = storage::code_verifier_name(KEY);
        let mut bridge = CookieBridge::new(vec![RequestCookie::new(
            verifier_cookie.clone(),
            storage::encode_value("\"verifier-1\""),
        )]);

        let user = client(&server.url())
            .exchange_code_for_session("code-1", &mut bridge)
            .await
            .unwrap();

        assert_eq!(user.id.to_string(), USER_ID);
        let staged = bridge.staged();
        assert!(staged.get(&verifier_cookie).unwrap().is_removal());
        let stored = storage::decode_session(&staged.get(KEY).unwrap().value).unwrap();
        assert_eq!(stored.access_token, "access-9");
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_code_exchange_failures() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "pkce".into()))
            .with_status(404)
            .with_body(r#"{"msg":"invalid flow state, no valid flow state found"}"#)
            .create_async()
            .await;
        let client = client(&server.url());

        let mut bridge = CookieBridge::default();
        assert!(matches!(
            client.exchange_code_for_session("code-1", &mut bridge).await,
            Err(SessionError::MissingCodeVerifier)
        ));

        let mut bridge = CookieBridge::new(vec![RequestCookie::new(
            storage::code_verifier_name(KEY),
            "verifier-1",
        )]);
        assert!(matches!(
            client.exchange_code_for_session("code-1", &mut bridge).await,
            Err(SessionError::CodeRejected(_))
        ));
        assert!(bridge.staged().get(KEY).is_none());
    }

    #[tokio::test]
    async fn test_sign_out_revokes_and_expires() {
        let mut server = Server::new_async().await;
        let logout = server
            .mock("POST", "/auth/v1/logout")
            .match_query(Matcher::UrlEncoded("scope".into(), "local".into()))
            .match_header("authorization", "Bearer access-1")
            .with_status(204)
            .create_async()
            .await;

        let mut bridge = cookies_with(&session("access-1", later()));
        client(&server.url()).sign_out(&mut bridge).await.unwrap();

        assert!(bridge.staged().get(KEY).unwrap().is_removal());
        logout.assert_async().await;
    }

    #[tokio::test]
    async fn test_sign_out_tolerates_revoked_session() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/v1/logout")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let mut bridge = cookies_with(&session("access-1", later()));
        client(&server.url()).sign_out(&mut bridge).await.unwrap();
        assert!(bridge.staged().get(KEY).unwrap().is_removal());
    }
}
