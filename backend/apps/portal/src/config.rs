//! Portal Configuration
//!
//! Loaded from environment variables (a `.env` file is honoured).
//!
//! ## Environment Variables
//! - `SUPABASE_URL`: Hosted auth service project URL (required)
//! - `SUPABASE_ANON_KEY`: Public API key of the project (required)
//! - `SUPABASE_STORAGE_KEY`: Session cookie name (default: derived from the project URL)
//! - `PORTAL_ADDR`: Listen address (default: 0.0.0.0:31113)
//! - `PORTAL_STATIC_DIR`: Prebuilt frontend (default: static)
//! - `SESSION_AUTH_PREFIX`, `SESSION_PROTECTED_PREFIX`: Route trees
//! - `SESSION_SIGN_IN_PATH`, `SESSION_LANDING_PATH`: Redirect targets
//! - `SESSION_FAILURE_POLICY`: `open` or `closed`
//! - `SESSION_TIMEOUT_MS`: Upper bound on one session validation
//! - `SESSION_COOKIE_SECURE`: Mark session cookies `Secure` (default: on in release builds)
//! - `SESSION_COOKIE_SAME_SITE`: `lax`, `strict` or `none` (default: lax)
//! - `SESSION_EXCLUDE_PATHS`, `SESSION_EXCLUDE_PREFIXES`, `SESSION_EXCLUDE_EXTENSIONS`:
//!   Comma separated additions to the paths the gate never sees
//! - `FRONTEND_ORIGINS`: Comma separated CORS origins

use anyhow::{Context, Result, bail};
use axum::http::HeaderValue;
use platform::cookie::SameSite;
use session::{FailurePolicy, GoTrueConfig, SessionConfig};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub static_dir: PathBuf,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub storage_key: Option<String>,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    pub frontend_origins: Vec<String>,
    pub session: SessionConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{name} must be set in environment"))
        };

        let mut session = if cfg!(debug_assertions) {
            SessionConfig::development()
        } else {
            SessionConfig::default()
        };
        if let Some(prefix) = lookup("SESSION_AUTH_PREFIX") {
            session.auth_prefix = prefix;
        }
        if let Some(prefix) = lookup("SESSION_PROTECTED_PREFIX") {
            session.protected_prefix = prefix;
        }
        if let Some(path) = lookup("SESSION_SIGN_IN_PATH") {
            session.sign_in_path = path;
        }
        if let Some(path) = lookup("SESSION_LANDING_PATH") {
            session.landing_path = path;
        }
        if let Some(policy) = parse_var::<FailurePolicy, _>(&lookup, "SESSION_FAILURE_POLICY")? {
            session.failure_policy = policy;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "SESSION_TIMEOUT_MS")? {
            session.validation_timeout = Duration::from_millis(ms);
        }
        for path in list_var(&lookup, "SESSION_EXCLUDE_PATHS") {
            session.path_matcher = session.path_matcher.with_exact(path);
        }
        for prefix in list_var(&lookup, "SESSION_EXCLUDE_PREFIXES") {
            session.path_matcher = session.path_matcher.with_prefix(&prefix);
        }
        for extension in list_var(&lookup, "SESSION_EXCLUDE_EXTENSIONS") {
            session.path_matcher = session.path_matcher.with_extension(&extension);
        }

        // Redirect targets end up in a Location header
        for (name, path) in [
            ("SESSION_SIGN_IN_PATH", &session.sign_in_path),
            ("SESSION_LANDING_PATH", &session.landing_path),
        ] {
            if HeaderValue::from_str(path).is_err() {
                bail!("{name} is not a valid Location value: {path:?}");
            }
        }

        Ok(Config {
            addr: match parse_var::<SocketAddr, _>(&lookup, "PORTAL_ADDR")? {
                Some(addr) => addr,
                None => DEFAULT_ADDR.parse()?,
            },
            static_dir: lookup("PORTAL_STATIC_DIR")
                .unwrap_or_else(|| "static".to_string())
                .into(),
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            storage_key: lookup("SUPABASE_STORAGE_KEY").filter(|v| !v.is_empty()),
            cookie_secure: parse_var::<bool, _>(&lookup, "SESSION_COOKIE_SECURE")?
                .unwrap_or(!cfg!(debug_assertions)),
            cookie_same_site: parse_var::<SameSite, _>(&lookup, "SESSION_COOKIE_SAME_SITE")?
                .unwrap_or_default(),
            frontend_origins: split_list(
                &lookup("FRONTEND_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGINS.to_string()),
            ),
            session,
        })
    }

    /// Auth service client settings
    pub fn gotrue(&self) -> Result<GoTrueConfig> {
        let mut config = GoTrueConfig::new(&self.supabase_url, self.supabase_anon_key.clone())
            .context("SUPABASE_URL is not a valid URL")?;
        config.cookie_options.secure = self.cookie_secure;
        config.cookie_options.same_site = Some(self.cookie_same_site);
        if let Some(key) = &self.storage_key {
            config = config.with_storage_key(key.clone());
        }
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| raw.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("{name} is invalid"))
}

fn list_var<F>(lookup: &F, name: &str) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).map(|raw| split_list(&raw)).unwrap_or_default()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
