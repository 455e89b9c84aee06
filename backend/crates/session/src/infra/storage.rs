//! Session cookie storage format
//!
//! The session is stored as JSON under the storage key. Written values are
//! `base64-` + base64url(JSON); plain JSON is accepted on read. Values over
//! the chunk size are split across `<key>.0`, `<key>.1`, ...

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use platform::cookie::{chunk_name, combine_chunks, is_chunk_of, split_chunks};

use crate::domain::cookie::{CookieOptions, RequestCookie, SessionCookie};
use crate::domain::cookie_bridge::CookieBridge;
use crate::error::{SessionError, SessionResult};

pub const BASE64_PREFIX: &str = "base64-";

/// Session as issued by the token endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<serde_json::Value>,
}

impl StoredSession {
    /// Fill `expires_at` from `expires_in` when the issuer left it out
    pub fn with_expiry_from(mut self, now: i64) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = self.expires_in.map(|secs| now.saturating_add(secs));
        }
        self
    }

    /// True when the access token expires within `margin_secs` of `now`
    ///
    /// Sessions without an expiry are left for the user endpoint to judge.
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at.saturating_sub(margin_secs) <= now)
    }
}

/// Decode a cookie value (prefixed base64url or plain JSON)
pub fn decode_value(raw: &str) -> SessionResult<String> {
    match raw.strip_prefix(BASE64_PREFIX) {
        Some(encoded) => {
            let bytes = URL_SAFE_NO_PAD
                .decode(encoded.trim_end_matches('='))
                .map_err(|e| SessionError::MalformedSession(format!("invalid base64: {e}")))?;
            String::from_utf8(bytes)
                .map_err(|e| SessionError::MalformedSession(format!("invalid utf-8: {e}")))
        }
        None => Ok(raw.to_string()),
    }
}

pub fn encode_value(plain: &str) -> String {
    format!("{BASE64_PREFIX}{}", URL_SAFE_NO_PAD.encode(plain.as_bytes()))
}

pub fn decode_session(raw: &str) -> SessionResult<StoredSession> {
    let json = decode_value(raw)?;
    serde_json::from_str(&json)
        .map_err(|e| SessionError::MalformedSession(format!("invalid session json: {e}")))
}

pub fn encode_session(session: &StoredSession) -> SessionResult<String> {
    let json = serde_json::to_string(session)
        .map_err(|e| SessionError::Internal(format!("Failed to serialize session: {e}")))?;
    Ok(encode_value(&json))
}

/// Session stored under `key`, reassembled from chunks
///
/// `Ok(None)` when no cookie exists; `Err(MalformedSession)` when one exists
/// but cannot be decoded.
pub fn read_session(bridge: &CookieBridge, key: &str) -> SessionResult<Option<StoredSession>> {
    match combine_chunks(key, |name| bridge.get(name)) {
        Some(raw) => decode_session(&raw).map(Some),
        None => Ok(None),
    }
}

/// Cookies that store `encoded` under `key`, plus removals for chunks the
/// browser holds that the new layout no longer uses
pub fn store_cookies(
    key: &str,
    encoded: &str,
    options: &CookieOptions,
    chunk_size: usize,
    existing: &[RequestCookie],
) -> Vec<SessionCookie> {
    let chunks = split_chunks(encoded, chunk_size);

    let mut cookies: Vec<SessionCookie> = if chunks.len() == 1 {
        vec![SessionCookie::new(key, encoded, options.clone())]
    } else {
        chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| SessionCookie::new(chunk_name(key, index), chunk, options.clone()))
            .collect()
    };

    let stale: Vec<SessionCookie> = existing
        .iter()
        .filter(|c| is_chunk_of(&c.name, key))
        .filter(|c| !cookies.iter().any(|new| new.name == c.name))
        .map(|c| SessionCookie::removal(c.name.clone(), options.clone()))
        .collect();

    cookies.extend(stale);
    cookies
}

/// Removals for every cookie under `key` the browser holds
pub fn removal_cookies(
    key: &str,
    options: &CookieOptions,
    existing: &[RequestCookie],
) -> Vec<SessionCookie> {
    existing
        .iter()
        .filter(|c| is_chunk_of(&c.name, key))
        .map(|c| SessionCookie::removal(c.name.clone(), options.clone()))
        .collect()
}

/// PKCE verifier stored by the browser client under `<key>-code-verifier`
///
/// The stored value may be a JSON string and may carry a `/<flow>` suffix.
pub fn read_code_verifier(bridge: &CookieBridge, key: &str) -> SessionResult<Option<String>> {
    let name = code_verifier_name(key);
    let Some(raw) = combine_chunks(&name, |n| bridge.get(n)) else {
        return Ok(None);
    };

    let plain = decode_value(&raw)?;
    let verifier = serde_json::from_str::<String>(&plain).unwrap_or(plain);
    let verifier = verifier
        .split_once('/')
        .map(|(v, _)| v.to_string())
        .unwrap_or(verifier);

    Ok((!verifier.is_empty()).then_some(verifier))
}

pub fn code_verifier_name(key: &str) -> String {
    format!("{key}-code-verifier")
}
