//! Cookie Bridge
//!
//! The adapter handed to the session client: reads come from the incoming
//! request, writes land on a [`CookieStage`] that is applied to whichever
//! response is finally returned. Writes never touch the request side.

use crate::domain::cookie::{CookieStage, RequestCookie, SessionCookie};

#[derive(Debug, Clone, Default)]
pub struct CookieBridge {
    request: Vec<RequestCookie>,
    staged: CookieStage,
}

impl CookieBridge {
    pub fn new(request: Vec<RequestCookie>) -> Self {
        Self {
            request,
            staged: CookieStage::new(),
        }
    }

    /// Every cookie on the incoming request
    pub fn get_all(&self) -> &[RequestCookie] {
        &self.request
    }

    /// First request cookie called `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.request
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// Stage a batch of cookies for the response
    ///
    /// May be called any number of times; the stage always ends up holding the
    /// latest value per cookie name.
    pub fn set_all<I>(&mut self, cookies: I)
    where
        I: IntoIterator<Item = SessionCookie>,
    {
        for cookie in cookies {
            tracing::trace!(cookie = %cookie.name, removal = cookie.is_removal(), "Staging cookie");
            self.staged.stage(cookie);
        }
    }

    pub fn staged(&self) -> &CookieStage {
        &self.staged
    }

    pub fn into_staged(self) -> CookieStage {
        self.staged
    }
}

impl From<Vec<(String, String)>> for CookieBridge {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, value)| RequestCookie { name, value })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cookie::CookieOptions;

    #[test]
    fn test_reads_come_from_request_only() {
        let mut bridge = CookieBridge::from(vec![("theme".to_string(), "dark".to_string())]);
        bridge.set_all([SessionCookie::new("theme", "light", CookieOptions::default())]);

        assert_eq!(bridge.get("theme"), Some("dark"));
        assert_eq!(bridge.get_all().len(), 1);
        assert_eq!(bridge.staged().get("theme").unwrap().value, "light");
    }

    #[test]
    fn test_repeated_set_all_keeps_latest() {
        let mut bridge = CookieBridge::default();
        bridge.set_all([
            SessionCookie::new("sb-token.0", "old-0", CookieOptions::default()),
            SessionCookie::new("sb-token.1", "old-1", CookieOptions::default()),
        ]);
        bridge.set_all([SessionCookie::new("sb-token.0", "new-0", CookieOptions::default())]);

        let staged = bridge.into_staged();
        assert_eq!(staged.len(), 2);
        assert_eq!(staged.get("sb-token.0").unwrap().value, "new-0");
        assert_eq!(staged.get("sb-token.1").unwrap().value, "old-1");
    }
}
