use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Wire form of a backend identifier: some endpoints send numbers, others strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(i64),
}

impl From<IdRepr> for String {
    fn from(repr: IdRepr) -> Self {
        match repr {
            IdRepr::Text(s) => s,
            IdRepr::Number(n) => n.to_string(),
        }
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
        #[serde(from = "IdRepr", into = "String")]
        pub struct $name(pub String);

        impl From<IdRepr> for $name {
            fn from(repr: IdRepr) -> Self {
                Self(repr.into())
            }
        }

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

opaque_id!(
    /// Backend user identifier.
    UserId
);
opaque_id!(
    /// Backend article identifier.
    ArticleId
);
opaque_id!(
    /// Backend category identifier.
    CategoryId
);
opaque_id!(
    /// Backend tag identifier.
    TagId
);

/// Role name granting access to `/admin`.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Profile returned by `GET /auth/me`.
///
/// Only `id` and `username` are guaranteed; everything else depends on
/// what the backend chooses to expose for the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserProfile {
    /// Whether the profile carries the admin role (with or without a `ROLE_` prefix).
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles
            .iter()
            .any(|r| r.trim_start_matches("ROLE_").eq_ignore_ascii_case(ADMIN_ROLE))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Spring-style page envelope used by every backend listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let a: ArticleId = serde_json::from_str("42").unwrap();
        let b: ArticleId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"42\"");
    }

    #[test]
    fn test_minimal_profile_deserializes() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"id":"u1","username":"bob"}"#).unwrap();
        assert_eq!(profile.id.as_str(), "u1");
        assert_eq!(profile.username, "bob");
        assert!(profile.roles.is_empty());
        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            serde_json::json!({"id": "u1", "username": "bob"})
        );
    }

    #[test]
    fn test_profile_without_username_is_rejected() {
        assert!(serde_json::from_str::<UserProfile>(r#"{"id":"u1"}"#).is_err());
    }

    #[test]
    fn test_admin_role_detection() {
        let mut profile: UserProfile =
            serde_json::from_str(r#"{"id":1,"username":"root","roles":["USER"]}"#).unwrap();
        assert!(!profile.is_admin());
        profile.roles.push("ROLE_ADMIN".into());
        assert!(profile.is_admin());
    }

    #[test]
    fn test_page_keeps_unknown_fields() {
        let page: Page<Tag> = serde_json::from_str(
            r#"{"content":[{"id":3,"name":"rust","color":"red"}],"totalElements":1,"number":0}"#,
        )
        .unwrap();
        assert_eq!(page.content[0].id.as_str(), "3");
        assert_eq!(page.content[0].extra["color"], "red");
        assert_eq!(page.extra["number"], 0);
    }

    #[test]
    fn test_empty_page_serializes_with_defaults() {
        let page: Page<Article> = Page::empty();
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({"content": [], "totalElements": 0})
        );
    }
}
