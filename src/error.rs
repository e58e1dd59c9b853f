use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} failed with status {status}: {detail}")]
    Backend {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    #[error("malformed {operation} response: {source}")]
    MalformedResponse {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid backend URL: {0}")]
    Url(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Status code reported by the backend, if the backend answered at all.
    #[must_use]
    pub fn backend_status(&self) -> Option<StatusCode> {
        match self {
            Self::Backend { status, .. } => StatusCode::from_u16(*status).ok(),
            _ => None,
        }
    }

    /// Raw body of a non-success backend response.
    #[must_use]
    pub fn backend_detail(&self) -> Option<&str> {
        match self {
            Self::Backend { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// `message` field of a JSON error body, when the backend sent one.
    #[must_use]
    pub fn backend_message(&self) -> Option<String> {
        let detail = self.backend_detail()?;
        let body: serde_json::Value = serde_json::from_str(detail).ok()?;
        body.get("message")?
            .as_str()
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_status_is_exposed() {
        let err = Error::Backend {
            operation: "verify token",
            status: 401,
            detail: "expired".into(),
        };
        assert_eq!(err.backend_status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.backend_detail(), Some("expired"));
        assert_eq!(err.to_string(), "verify token failed with status 401: expired");
    }

    #[test]
    fn test_non_backend_errors_have_no_status() {
        let err = Error::Config("BACKEND_URL is required".into());
        assert_eq!(err.backend_status(), None);
        assert_eq!(err.backend_detail(), None);
        assert_eq!(err.backend_message(), None);
    }

    #[test]
    fn test_backend_message_from_json_body() {
        let backend = |detail: &str| Error::Backend {
            operation: "create article",
            status: 400,
            detail: detail.into(),
        };
        assert_eq!(
            backend(r#"{"message":"Title already taken","status":400}"#).backend_message(),
            Some("Title already taken".to_string())
        );
        assert_eq!(backend(r#"{"message":""}"#).backend_message(), None);
        assert_eq!(backend(r#"{"error":"nope"}"#).backend_message(), None);
        assert_eq!(backend("Bad Request").backend_message(), None);
    }
}
