use serde::Serialize;

use crate::types::UserProfile;

/// Identity resolved for the current request.
///
/// Built by the session layer from the `access`/`refresh` cookies and
/// dropped when the request ends. Nothing about it is persisted.
///
/// Serializes as the profile fields plus `accessToken`, which is the shape
/// page loaders hand to the templates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Raw access token, forwarded as a bearer credential to the backend.
    pub access_token: String,
}

impl CurrentUser {
    #[must_use]
    pub fn new(profile: UserProfile, access_token: impl Into<String>) -> Self {
        Self {
            profile,
            access_token: access_token.into(),
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_profile_with_access_token() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"id":"u1","username":"bob"}"#).unwrap();
        let user = CurrentUser::new(profile, "a1");
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            serde_json::json!({"id": "u1", "username": "bob", "accessToken": "a1"})
        );
    }
}
