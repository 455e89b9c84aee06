//! Path matcher for requests the gate never sees
//!
//! Static assets are served without touching the auth service.

/// Excluded paths: exact matches, prefixes (whole segments), and file
/// extensions (case-insensitive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    exact: Vec<String>,
    prefixes: Vec<String>,
    extensions: Vec<String>,
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self {
            exact: vec!["/favicon.ico".to_string()],
            prefixes: vec!["/static".to_string(), "/assets".to_string()],
            extensions: ["svg", "png", "jpg", "jpeg", "gif", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl PathMatcher {
    pub fn with_exact(mut self, path: impl Into<String>) -> Self {
        self.exact.push(path.into());
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        if !prefix.is_empty() {
            self.prefixes.push(prefix.to_string());
        }
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extensions
            .push(extension.trim_start_matches('.').to_ascii_lowercase());
        self
    }

    /// True when the request should bypass the gate
    pub fn excludes(&self, path: &str) -> bool {
        if self.exact.iter().any(|p| p == path) {
            return true;
        }

        let under_prefix = self.prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        });
        if under_prefix {
            return true;
        }

        let file_name = path.rsplit('/').next().unwrap_or(path);
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self
                .extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
            _ => false,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_excludes_assets() {
        let m = PathMatcher::default();
        assert!(m.excludes("/favicon.ico"));
        assert!(m.excludes("/static/app.js"));
        assert!(m.excludes("/assets"));
        assert!(m.excludes("/images/logo.PNG"));
        assert!(m.excludes("/dashboard/avatar.webp"));
    }

    #[test]
    fn test_default_gates_pages() {
        let m = PathMatcher::default();
        assert!(!m.excludes("/"));
        assert!(!m.excludes("/dashboard/profile"));
        assert!(!m.excludes("/auth/signin"));
        assert!(!m.excludes("/staticky"));
        assert!(!m.excludes("/public-events"));
        assert!(!m.excludes("/docs/.png"));
    }

    #[test]
    fn test_builder() {
        let m = PathMatcher::default()
            .with_exact("/robots.txt")
            .with_prefix("/_build/")
            .with_extension(".css");
        assert!(m.excludes("/robots.txt"));
        assert!(m.excludes("/_build/chunk-1.js"));
        assert!(m.excludes("/theme.CSS"));
        assert!(m.excludes("/favicon.ico"));
        assert!(!m.excludes("/theme"));
    }
}
