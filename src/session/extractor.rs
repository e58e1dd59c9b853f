use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use super::config::SessionSettings;
use super::error::AuthError;
use super::types::CurrentUser;

/// Identity resolved by [`session_layer`](super::session_layer).
///
/// As an extractor, redirects anonymous requests to the login page.
/// Use `Option<CurrentUser>` on pages that serve both.
///
/// ```rust,ignore
/// async fn account(user: CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", user.profile.username)
/// }
///
/// async fn trending(user: Option<CurrentUser>) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}", u.profile.username),
///         None => "Hello, guest".to_string(),
///     }
/// }
/// ```
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AuthError::Unauthenticated {
                login_path: login_path(parts),
            })
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

fn login_path(parts: &Parts) -> String {
    parts
        .extensions
        .get::<SessionSettings>()
        .map_or_else(|| SessionSettings::default().login_path, |s| s.login_path.clone())
}

/// A [`CurrentUser`] holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = <CurrentUser as FromRequestParts<S>>::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.profile.id, "Non-admin tried to reach admin area");
            return Err(AuthError::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Guard for signed-in route groups. Mount with `route_layer(from_fn(require_user))`.
pub async fn require_user(_user: CurrentUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// Guard for admin route groups.
pub async fn require_admin(_admin: AdminUser, request: Request, next: Next) -> Response {
    next.run(request).await
}
