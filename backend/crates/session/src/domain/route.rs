//! Route classification

use std::fmt;

/// Which route tree a request path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Sign-in / sign-up / password reset pages
    Auth,
    /// Pages that need a signed-in user
    Protected,
    Public,
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteClass::Auth => "auth",
            RouteClass::Protected => "protected",
            RouteClass::Public => "public",
        };
        f.write_str(name)
    }
}

/// Classifies paths against the auth and protected prefixes
///
/// Prefixes match whole path segments, not raw string prefixes: `/auth`
/// covers `/auth` and `/auth/signin` but not `/authors`, and `/dashboard-old`
/// is public. The auth prefix is checked first, so a path under both trees is
/// an auth page.
#[derive(Debug, Clone)]
pub struct RouteClassifier {
    auth_prefix: String,
    protected_prefix: String,
}

impl RouteClassifier {
    pub fn new(auth_prefix: &str, protected_prefix: &str) -> Self {
        Self {
            auth_prefix: normalize_prefix(auth_prefix),
            protected_prefix: normalize_prefix(protected_prefix),
        }
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if under_prefix(path, &self.auth_prefix) {
            RouteClass::Auth
        } else if under_prefix(path, &self.protected_prefix) {
            RouteClass::Protected
        } else {
            RouteClass::Public
        }
    }
}

/// `/dashboard/` and `dashboard` both become `/dashboard`; `/` becomes the
/// empty prefix, which covers every path
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn under_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RouteClassifier {
        RouteClassifier::new("/auth", "/dashboard")
    }

    #[test]
    fn test_classify_groups() {
        let c = classifier();
        assert_eq!(c.classify("/auth"), RouteClass::Auth);
        assert_eq!(c.classify("/auth/signin"), RouteClass::Auth);
        assert_eq!(c.classify("/auth/reset-password"), RouteClass::Auth);
        assert_eq!(c.classify("/dashboard"), RouteClass::Protected);
        assert_eq!(c.classify("/dashboard/profile"), RouteClass::Protected);
        assert_eq!(c.classify("/about"), RouteClass::Public);
        assert_eq!(c.classify("/"), RouteClass::Public);
    }

    #[test]
    fn test_prefix_matches_whole_segments() {
        let c = classifier();
        assert_eq!(c.classify("/authors"), RouteClass::Public);
        assert_eq!(c.classify("/dashboard-old"), RouteClass::Public);
        assert_eq!(c.classify("/dashboards"), RouteClass::Public);
    }

    #[test]
    fn test_prefix_normalization() {
        let c = RouteClassifier::new("auth/", "/dashboard/");
        assert_eq!(c.classify("/auth/signin"), RouteClass::Auth);
        assert_eq!(c.classify("/dashboard"), RouteClass::Protected);
    }

    #[test]
    fn test_auth_wins_on_overlap() {
        let c = RouteClassifier::new("/app/auth", "/app");
        assert_eq!(c.classify("/app/auth/signin"), RouteClass::Auth);
        assert_eq!(c.classify("/app/settings"), RouteClass::Protected);
    }
}
