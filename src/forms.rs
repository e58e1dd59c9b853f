use axum::body::Bytes;
use axum::extract::Multipart;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Result payload of a dashboard form action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    #[must_use]
    pub fn done(action: &'static str, message: impl Into<String>) -> Self {
        Self {
            action: Some(action),
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            action: None,
            success: false,
            message: message.into(),
        }
    }
}

// ── Credentials ────────────────────────────────────────────────────

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// A submitted value echoed back to the form, with an optional complaint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldEcho {
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FieldEcho {
    fn of(value: &str) -> Self {
        Self {
            data: Some(value.to_string()).filter(|v| !v.is_empty()),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }
}

/// Errors shown on the login and registration forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CredentialErrors {
    pub username: FieldEcho,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<FieldEcho>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CredentialErrors {
    /// Echo of the username alone, for refusals with nothing more specific to say.
    #[must_use]
    pub fn echo(username: &str) -> Self {
        Self {
            username: FieldEcho::of(username),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Checks run before credentials are sent to the backend.
///
/// # Errors
///
/// Returns the form errors when the username is missing or the password is
/// shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn validate_credentials(username: &str, password: &str) -> Result<(), CredentialErrors> {
    if username.is_empty() {
        return Err(CredentialErrors {
            username: FieldEcho::of(username)
                .with_detail(Some("you didn't provide a username".into())),
            ..CredentialErrors::default()
        });
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredentialErrors {
            password: Some("password is less than 6 character".into()),
            ..CredentialErrors::echo(username)
        });
    }
    Ok(())
}

/// Per-field messages the backend returns when it refuses a registration.
#[derive(Debug, Default, Deserialize)]
struct RegistrationRejection {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

/// Maps a refused registration onto the form, echoing what the user typed.
#[must_use]
pub fn registration_errors(username: &str, email: &str, backend_detail: &str) -> CredentialErrors {
    let rejection: RegistrationRejection =
        serde_json::from_str(backend_detail).unwrap_or_default();
    CredentialErrors {
        username: FieldEcho::of(username).with_detail(rejection.username),
        email: Some(FieldEcho::of(email).with_detail(rejection.email)),
        password: rejection.password,
        error: None,
    }
}

// ── Multipart drafts ───────────────────────────────────────────────

/// One field of a submitted multipart form.
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl FormPart {
    #[must_use]
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            file_name: None,
            content_type: None,
            data: Bytes::copy_from_slice(value.as_bytes()),
        }
    }

    #[must_use]
    pub fn file(name: &str, file_name: &str, content_type: &str, data: &'static [u8]) -> Self {
        Self {
            name: name.to_string(),
            file_name: Some(file_name.to_string()),
            content_type: Some(content_type.to_string()),
            data: Bytes::from_static(data),
        }
    }

    fn text_value(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Drains a multipart body into memory.
///
/// # Errors
///
/// Returns the multipart error if the body is not valid multipart.
pub async fn read_parts(
    mut multipart: Multipart,
) -> Result<Vec<FormPart>, axum::extract::multipart::MultipartError> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        parts.push(FormPart {
            name,
            file_name,
            content_type,
            data,
        });
    }
    Ok(parts)
}

/// An uploaded image that passed validation.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Removes the `name` file field; empty uploads count as absent.
fn take_image(parts: &mut Vec<FormPart>, name: &str) -> Result<Option<Upload>, &'static str> {
    let Some(pos) = parts.iter().position(|p| p.name == name) else {
        return Ok(None);
    };
    let part = parts.remove(pos);
    let file_name = part.file_name.unwrap_or_default();
    if part.data.is_empty() || file_name.is_empty() {
        return Ok(None);
    }
    let content_type = part.content_type.unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err("Please upload a valid image file");
    }
    Ok(Some(Upload {
        file_name,
        content_type,
        data: part.data,
    }))
}

fn take_text(parts: &mut Vec<FormPart>, name: &str) -> Option<String> {
    let pos = parts
        .iter()
        .position(|p| p.name == name && p.file_name.is_none())?;
    let value = parts.remove(pos).text_value();
    Some(value).filter(|v| !v.trim().is_empty())
}

fn passthrough(parts: Vec<FormPart>) -> Vec<(String, String)> {
    parts
        .into_iter()
        .filter(|p| p.file_name.is_none())
        .map(|p| {
            let value = p.text_value();
            (p.name, value)
        })
        .collect()
}

fn upload_part(upload: Upload) -> Result<Part, Error> {
    Ok(Part::bytes(upload.data.to_vec())
        .file_name(upload.file_name)
        .mime_str(&upload.content_type)?)
}

/// Article submitted from the editor or the dashboards.
#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub featured_image: Option<Upload>,
    pub other: Vec<(String, String)>,
}

impl ArticleDraft {
    /// # Errors
    ///
    /// Returns the message to show when a required field is blank or the
    /// image is not an image.
    pub fn from_parts(mut parts: Vec<FormPart>) -> Result<Self, &'static str> {
        let title = take_text(&mut parts, "title").ok_or("Title is required")?;
        let content = take_text(&mut parts, "content").ok_or("Content is required")?;
        let category = take_text(&mut parts, "category");
        let featured_image = take_image(&mut parts, "featuredImage")?;
        Ok(Self {
            title,
            content,
            category,
            featured_image,
            other: passthrough(parts),
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::Http`] if the image MIME type cannot be encoded.
    pub fn into_form(self) -> Result<Form, Error> {
        let mut form = Form::new()
            .text("title", self.title)
            .text("content", self.content);
        if let Some(category) = self.category {
            form = form.text("category", category);
        }
        for (name, value) in self.other {
            form = form.text(name, value);
        }
        if let Some(image) = self.featured_image {
            form = form.part("featuredImage", upload_part(image)?);
        }
        Ok(form)
    }
}

/// Category submitted from the admin table.
#[derive(Debug, Clone)]
pub struct CategoryDraft {
    pub title: String,
    pub description: String,
    pub image: Option<Upload>,
}

impl CategoryDraft {
    /// # Errors
    ///
    /// Returns the message to show when a required field is blank or the
    /// image is not an image.
    pub fn from_parts(mut parts: Vec<FormPart>) -> Result<Self, &'static str> {
        let title = take_text(&mut parts, "title").ok_or("Title is required")?;
        let description =
            take_text(&mut parts, "description").ok_or("Description is required")?;
        let image = take_image(&mut parts, "image")?;
        Ok(Self {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            image,
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::Http`] if the image MIME type cannot be encoded.
    pub fn into_form(self) -> Result<Form, Error> {
        let mut form = Form::new()
            .text("title", self.title)
            .text("description", self.description);
        if let Some(image) = self.image {
            form = form.part("image", upload_part(image)?);
        }
        Ok(form)
    }
}

/// Re-encodes url-encoded fields as multipart, keeping names and order.
#[must_use]
pub fn pairs_to_form(pairs: Vec<(String, String)>) -> Form {
    pairs
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value))
}

/// Values of a repeated field, accepting both `name` and `name[]`.
#[must_use]
pub fn repeated(pairs: &[(String, String)], name: &str) -> Vec<String> {
    let bracketed = format!("{name}[]");
    pairs
        .iter()
        .filter(|(k, v)| (k == name || *k == bracketed) && !v.is_empty())
        .map(|(_, v)| v.clone())
        .collect()
}

/// First non-empty value of a field.
#[must_use]
pub fn field(pairs: &[(String, String)], name: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, v)| k == name && !v.trim().is_empty())
        .map(|(_, v)| v.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_username_is_reported() {
        let err = validate_credentials("", "secret1").unwrap_err();
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({
                "username": {"data": null, "detail": "you didn't provide a username"}
            })
        );
    }

    #[test]
    fn test_short_password_is_reported() {
        let err = validate_credentials("bob", "12345").unwrap_err();
        assert_eq!(err.username.data.as_deref(), Some("bob"));
        assert_eq!(err.password.as_deref(), Some("password is less than 6 character"));
    }

    #[test]
    fn test_password_length_counts_characters() {
        assert!(validate_credentials("bob", "éééééé").is_ok());
    }

    #[test]
    fn test_registration_errors_use_backend_messages() {
        let errors = registration_errors(
            "bob",
            "bob@example.com",
            r#"{"username":"already taken","email":"invalid"}"#,
        );
        assert_eq!(errors.username.detail.as_deref(), Some("already taken"));
        assert_eq!(
            errors.email,
            Some(FieldEcho {
                data: Some("bob@example.com".into()),
                detail: Some("invalid".into())
            })
        );
        assert_eq!(errors.password, None);
    }

    #[test]
    fn test_registration_errors_tolerate_non_json_detail() {
        let errors = registration_errors("bob", "", "Internal Server Error");
        assert_eq!(errors.username.data.as_deref(), Some("bob"));
        assert_eq!(errors.username.detail, None);
    }

    #[test]
    fn test_article_requires_title_and_content() {
        let err = ArticleDraft::from_parts(vec![FormPart::text("content", "body")]).unwrap_err();
        assert_eq!(err, "Title is required");

        let err = ArticleDraft::from_parts(vec![
            FormPart::text("title", "Hello"),
            FormPart::text("content", "   "),
        ])
        .unwrap_err();
        assert_eq!(err, "Content is required");
    }

    #[test]
    fn test_article_drops_blank_category_and_empty_image() {
        let draft = ArticleDraft::from_parts(vec![
            FormPart::text("title", "Hello"),
            FormPart::text("content", "body"),
            FormPart::text("category", " "),
            FormPart::file("featuredImage", "", "application/octet-stream", b""),
            FormPart::text("tags", "rust"),
        ])
        .unwrap();
        assert_eq!(draft.category, None);
        assert!(draft.featured_image.is_none());
        assert_eq!(draft.other, vec![("tags".to_string(), "rust".to_string())]);
    }

    #[test]
    fn test_article_rejects_non_image_upload() {
        let err = ArticleDraft::from_parts(vec![
            FormPart::text("title", "Hello"),
            FormPart::text("content", "body"),
            FormPart::file("featuredImage", "notes.txt", "text/plain", b"hi"),
        ])
        .unwrap_err();
        assert_eq!(err, "Please upload a valid image file");
    }

    #[test]
    fn test_article_keeps_valid_image() {
        let draft = ArticleDraft::from_parts(vec![
            FormPart::text("title", "Hello"),
            FormPart::text("content", "body"),
            FormPart::file("featuredImage", "cover.png", "image/png", b"\x89PNG"),
        ])
        .unwrap();
        let image = draft.featured_image.as_ref().unwrap();
        assert_eq!(image.file_name, "cover.png");
        assert!(draft.into_form().is_ok());
    }

    #[test]
    fn test_category_requires_description() {
        let err = CategoryDraft::from_parts(vec![FormPart::text("title", "Rust")]).unwrap_err();
        assert_eq!(err, "Description is required");
    }

    #[test]
    fn test_repeated_accepts_bracketed_names() {
        let pairs = vec![
            ("selectedIds[]".to_string(), "1".to_string()),
            ("selectedIds".to_string(), "2".to_string()),
            ("other".to_string(), "3".to_string()),
            ("selectedIds[]".to_string(), String::new()),
        ];
        assert_eq!(repeated(&pairs, "selectedIds"), vec!["1", "2"]);
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_value(ActionOutcome::done("delete", "Article Deleted successfully"))
                .unwrap(),
            serde_json::json!({
                "action": "delete",
                "success": true,
                "message": "Article Deleted successfully"
            })
        );
        assert_eq!(
            serde_json::to_value(ActionOutcome::failed("Id Not provided")).unwrap(),
            serde_json::json!({"success": false, "message": "Id Not provided"})
        );
    }
}
