use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::Error;
use crate::forms::ActionOutcome;

/// Failures of page loaders and form actions.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Input rejected before reaching the backend.
    #[error("{0}")]
    Invalid(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Backend(#[from] Error),
}

impl RouteError {
    pub(crate) fn missing_id() -> Self {
        Self::Invalid("Id Not provided".into())
    }
}

impl From<&'static str> for RouteError {
    fn from(message: &'static str) -> Self {
        Self::Invalid(message.into())
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Invalid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Multipart(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            // relay whatever the backend decided
            Self::Backend(e) => match e.backend_status() {
                Some(status) => {
                    tracing::warn!(error = %e, "Backend refused request");
                    let message = e
                        .backend_message()
                        .unwrap_or_else(|| "Request was refused".to_string());
                    (status, message)
                }
                None => {
                    tracing::error!(error = %e, "Backend unavailable");
                    (StatusCode::BAD_GATEWAY, "Backend unavailable".to_string())
                }
            },
        };
        (status, Json(ActionOutcome::failed(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_status_is_relayed() {
        let response = RouteError::from(Error::Backend {
            operation: "delete article",
            status: 409,
            detail: "conflict".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_backend_message_is_relayed() {
        let response = RouteError::from(Error::Backend {
            operation: "create article",
            status: 400,
            detail: r#"{"message":"Title already taken"}"#.into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "Title already taken");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_plain_refusal_uses_fixed_message() {
        let response = RouteError::from(Error::Backend {
            operation: "create article",
            status: 403,
            detail: "Forbidden".into(),
        })
        .into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "Request was refused");
    }

    #[test]
    fn test_unreachable_backend_is_bad_gateway() {
        let response = RouteError::from(Error::Url("mailto:x".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_missing_id_is_bad_request() {
        let response = RouteError::missing_id().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
