//! Session cookies and the per-request cookie stage

use time::OffsetDateTime;

pub use platform::cookie::SameSite;

/// Path given to staged cookies that do not name one
pub const DEFAULT_COOKIE_PATH: &str = "/";

/// Cookie sent by the browser on the incoming request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCookie {
    pub name: String,
    pub value: String,
}

impl RequestCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Set-Cookie attributes, exactly as the session client supplied them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    pub path: Option<String>,
    pub domain: Option<String>,
    pub max_age_secs: Option<i64>,
    pub expires: Option<OffsetDateTime>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

/// Cookie the session client wants the browser to store (or drop)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, options: CookieOptions) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            options,
        }
    }

    /// Cookie that makes the browser forget `name` immediately
    pub fn removal(name: impl Into<String>, mut options: CookieOptions) -> Self {
        options.max_age_secs = Some(0);
        options.expires = None;
        Self::new(name, "", options)
    }

    pub fn is_removal(&self) -> bool {
        self.options.max_age_secs == Some(0)
    }

    /// Effective path (the staged default when none was given)
    pub fn path(&self) -> &str {
        self.options.path.as_deref().unwrap_or(DEFAULT_COOKIE_PATH)
    }
}

/// Cookies staged for the outgoing response
///
/// Ordered by first write; a later write for the same name replaces the
/// earlier one in place. Whatever is in the stage when the request is
/// decided is what the browser receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieStage {
    cookies: Vec<SessionCookie>,
}

impl CookieStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one cookie, defaulting its path
    pub fn stage(&mut self, mut cookie: SessionCookie) {
        if cookie.options.path.is_none() {
            cookie.options.path = Some(DEFAULT_COOKIE_PATH.to_string());
        }

        match self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SessionCookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionCookie> {
        self.cookies.iter()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl IntoIterator for CookieStage {
    type Item = SessionCookie;
    type IntoIter = std::vec::IntoIter<SessionCookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.cookies.into_iter()
    }
}
