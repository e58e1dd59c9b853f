use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

/// Rejections produced by the route guards.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No resolved identity on a protected route.
    #[error("Not authenticated")]
    Unauthenticated { login_path: String },

    /// Signed in, but without the role the route requires.
    #[error("Forbidden")]
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated { login_path } => Redirect::to(&login_path).into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, self.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let response = AuthError::Unauthenticated {
            login_path: "/login".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/login");
    }

    #[test]
    fn test_forbidden_is_403() {
        let response = AuthError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
