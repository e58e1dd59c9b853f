use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use time::Duration;

use super::cookies::{self, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
use super::state::SessionState;
use super::traits::TokenService;
use super::types::CurrentUser;

/// Outcome of resolving one request's cookies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Identity to expose downstream, if the session checked out.
    pub user: Option<CurrentUser>,
    /// Access token minted by a silent refresh; must be written back as the `access` cookie.
    pub refreshed_access_token: Option<String>,
}

/// Decides what the `refresh`/`access` cookie pair is worth for this request.
///
/// - no `refresh`: anonymous, nothing is called
/// - `refresh` only: silent refresh, then profile fetch with the new token
/// - both: verify `access`, then profile fetch with it
///
/// A rejected `access` token is not refreshed here; only a missing one is.
/// Every backend failure degrades to "anonymous" and never escapes.
pub async fn resolve_session<T: TokenService>(
    tokens: &T,
    refresh: Option<&str>,
    access: Option<&str>,
) -> Resolution {
    let Some(refresh) = refresh else {
        return Resolution::default();
    };

    match access {
        None => {
            let access = match tokens.refresh_access_token(refresh).await {
                Ok(token) => token,
                Err(e) => {
                    tracing::warn!(error = %e, "Silent refresh failed");
                    return Resolution::default();
                }
            };
            let user = load_identity(tokens, &access).await;
            Resolution {
                user,
                refreshed_access_token: Some(access),
            }
        }
        Some(access) => {
            if let Err(e) = tokens.verify_access_token(access).await {
                tracing::debug!(error = %e, "Access token rejected");
                return Resolution::default();
            }
            Resolution {
                user: load_identity(tokens, access).await,
                refreshed_access_token: None,
            }
        }
    }
}

async fn load_identity<T: TokenService>(tokens: &T, access: &str) -> Option<CurrentUser> {
    match tokens.fetch_profile(access).await {
        Ok(profile) => Some(CurrentUser::new(profile, access)),
        Err(e) => {
            tracing::warn!(error = %e, "Profile fetch failed");
            None
        }
    }
}

/// Request hook: resolves the session, exposes it to handlers, then always
/// runs the rest of the stack.
///
/// Mount with `axum::middleware::from_fn_with_state(SessionState::new(..), session_layer::<T>)`.
/// Handlers read the result through the [`CurrentUser`] extractor.
pub async fn session_layer<T: TokenService>(
    State(state): State<SessionState<T>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let (refresh, access) = cookies::session_tokens(&jar);
    let resolution =
        resolve_session(state.tokens.as_ref(), refresh.as_deref(), access.as_deref()).await;

    if let Some(user) = &resolution.user {
        tracing::debug!(user_id = %user.profile.id, "Session resolved");
    }

    request.extensions_mut().insert(state.settings.clone());
    if let Some(user) = resolution.user {
        request.extensions_mut().insert(user);
    }

    let response = next.run(request).await;

    match resolution.refreshed_access_token {
        // A handler that wrote session cookies itself (login, logout) wins.
        Some(token) if !writes_session_cookies(&response) => {
            let cookie = cookies::access_cookie(
                &token,
                Duration::seconds(state.settings.refreshed_access_ttl_secs),
                &state.settings,
            );
            (jar.add(cookie), response).into_response()
        }
        _ => response,
    }
}

fn writes_session_cookies(response: &Response) -> bool {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse(v).ok())
        .any(|c| c.name() == ACCESS_COOKIE_NAME || c.name() == REFRESH_COOKIE_NAME)
}
