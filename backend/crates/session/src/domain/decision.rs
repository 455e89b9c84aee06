//! Redirect decision

use std::fmt;

use crate::domain::route::RouteClass;

/// What the gate does with a request once the session is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Hand the request to the next handler
    Continue,
    /// Anonymous visitor on a protected page
    RedirectToSignIn,
    /// Signed-in user on a sign-in/sign-up page
    RedirectToLanding,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Decision::Continue => "continue",
            Decision::RedirectToSignIn => "redirect_sign_in",
            Decision::RedirectToLanding => "redirect_landing",
        };
        f.write_str(name)
    }
}

/// First matching row wins:
///
/// | authenticated | route     | decision            |
/// |---------------|-----------|---------------------|
/// | no            | protected | redirect to sign-in |
/// | yes           | auth      | redirect to landing |
/// | otherwise     |           | continue            |
pub fn decide(authenticated: bool, route: RouteClass) -> Decision {
    match (authenticated, route) {
        (false, RouteClass::Protected) => Decision::RedirectToSignIn,
        (true, RouteClass::Auth) => Decision::RedirectToLanding,
        _ => Decision::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_table() {
        assert_eq!(decide(false, RouteClass::Protected), Decision::RedirectToSignIn);
        assert_eq!(decide(true, RouteClass::Auth), Decision::RedirectToLanding);
        assert_eq!(decide(true, RouteClass::Protected), Decision::Continue);
        assert_eq!(decide(false, RouteClass::Auth), Decision::Continue);
    }

    #[test]
    fn test_public_routes_always_continue() {
        assert_eq!(decide(true, RouteClass::Public), Decision::Continue);
        assert_eq!(decide(false, RouteClass::Public), Decision::Continue);
    }
}
