//! Cookie bridge adapters for axum
//!
//! Reads request cookies out of the header map and renders staged cookies as
//! `Set-Cookie` headers.

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;
use axum_extra::extract::cookie::Cookie;

use crate::domain::cookie::{CookieStage, RequestCookie, SessionCookie};
use crate::error::{SessionError, SessionResult};

/// Cookies on the incoming request, in header order
pub fn request_cookies(headers: &HeaderMap) -> Vec<RequestCookie> {
    platform::cookie::request_cookies(headers)
        .into_iter()
        .map(|(name, value)| RequestCookie { name, value })
        .collect()
}

/// Render one staged cookie with every attribute it carries
pub fn set_cookie_header(cookie: &SessionCookie) -> SessionResult<HeaderValue> {
    let options = &cookie.options;

    let mut builder = Cookie::build((cookie.name.clone(), cookie.value.clone()))
        .path(cookie.path().to_string())
        .secure(options.secure)
        .http_only(options.http_only);

    if let Some(domain) = &options.domain {
        builder = builder.domain(domain.clone());
    }
    if let Some(max_age) = options.max_age_secs {
        builder = builder.max_age(time::Duration::seconds(max_age));
    }
    if let Some(expires) = options.expires {
        builder = builder.expires(expires);
    }
    if let Some(same_site) = options.same_site {
        builder = builder.same_site(same_site.into());
    }

    HeaderValue::from_str(&builder.build().to_string())
        .map_err(|e| SessionError::CookieStaging(format!("{}: {e}", cookie.name)))
}

/// Render the whole stage up front so a bad cookie fails before any
/// response is produced
pub fn set_cookie_headers(stage: &CookieStage) -> SessionResult<Vec<HeaderValue>> {
    stage.iter().map(set_cookie_header).collect()
}

pub fn append_set_cookies(response: &mut Response, values: Vec<HeaderValue>) {
    let headers = response.headers_mut();
    for value in values {
        headers.append(header::SET_COOKIE, value);
    }
}

/// Copy every staged cookie onto `response`
pub fn apply_cookies(response: &mut Response, stage: &CookieStage) -> SessionResult<()> {
    let values = set_cookie_headers(stage)?;
    append_set_cookies(response, values);
    Ok(())
}
