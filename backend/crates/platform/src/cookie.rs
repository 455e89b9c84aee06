//! Cookie Management Infrastructure
//!
//! Request cookie parsing, SameSite policy, and the chunking scheme used to
//! fit large values (serialized sessions) under the browser's per-cookie limit.

use axum_extra::extract::cookie::{Cookie, SameSite as CookieSameSite};
use http::{HeaderMap, header};
use std::str::FromStr;

/// Largest value stored in a single cookie before it is split into chunks
pub const MAX_CHUNK_SIZE: usize = 3180;

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown SameSite policy: {0}")]
pub struct ParseSameSiteError(String);

impl FromStr for SameSite {
    type Err = ParseSameSiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            _ => Err(ParseSameSiteError(s.to_string())),
        }
    }
}

impl From<SameSite> for CookieSameSite {
    fn from(value: SameSite) -> Self {
        match value {
            SameSite::Strict => CookieSameSite::Strict,
            SameSite::Lax => CookieSameSite::Lax,
            SameSite::None => CookieSameSite::None,
        }
    }
}

/// All `name=value` pairs sent by the browser, in header order
///
/// Multiple `Cookie` headers (HTTP/2 splits them) are concatenated.
/// Fragments that do not parse are skipped, never fatal.
pub fn request_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw.to_string()))
        .filter_map(Result::ok)
        .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
        .collect()
}

/// Name of the `index`-th chunk of `base`
pub fn chunk_name(base: &str, index: usize) -> String {
    format!("{base}.{index}")
}

/// Whether `name` is `base` itself or one of its numbered chunks
pub fn is_chunk_of(name: &str, base: &str) -> bool {
    if name == base {
        return true;
    }
    name.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

/// Split `value` into pieces of at most `max_len` bytes
///
/// Splits only on char boundaries. A value that fits is returned as a
/// single piece.
pub fn split_chunks(value: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(4);
    if value.len() <= max_len {
        return vec![value.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = value;
    while !rest.is_empty() {
        let mut end = max_len.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (head, tail) = rest.split_at(end);
        chunks.push(head.to_string());
        rest = tail;
    }
    chunks
}

/// Reassemble a possibly chunked value
///
/// `base` itself wins when present; otherwise `base.0`, `base.1`, ... are
/// joined until the first gap.
pub fn combine_chunks<'a, F>(base: &str, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<&'a str>,
{
    if let Some(value) = lookup(base) {
        return Some(value.to_string());
    }

    let mut combined = String::new();
    let mut index = 0;
    while let Some(part) = lookup(&chunk_name(base, index)) {
        combined.push_str(part);
        index += 1;
    }

    (index > 0).then_some(combined)
}
