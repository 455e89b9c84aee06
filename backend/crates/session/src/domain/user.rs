//! Authenticated user marker

use kernel::id::UserId;
use serde::{Deserialize, Serialize};

/// User the auth service vouched for on this request
///
/// The gate only checks presence; the fields exist for the session status
/// endpoint and for log context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    /// Auth-service role (`authenticated`, `service_role`, ...)
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let json = r#"{
            "id": "5f0c3a52-8d2e-4a36-9a47-0d1f5e3b7c11",
            "aud": "authenticated",
            "role": "authenticated",
            "email": "member@example.org",
            "app_metadata": {"provider": "email"},
            "user_metadata": {"full_name": "Member"}
        }"#;

        let user: AuthenticatedUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id.to_string(), "5f0c3a52-8d2e-4a36-9a47-0d1f5e3b7c11");
        assert_eq!(user.email.as_deref(), Some("member@example.org"));
        assert_eq!(user.role.as_deref(), Some("authenticated"));
    }

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{"id": "5f0c3a52-8d2e-4a36-9a47-0d1f5e3b7c11"}"#;
        let user: AuthenticatedUser = serde_json::from_str(json).unwrap();
        assert!(user.email.is_none());
        assert!(user.role.is_none());
    }
}
