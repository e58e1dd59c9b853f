use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use axum_extra::extract::CookieJar;
use serde_json::{Map, Value as JsonValue};

use crate::backend::LoginResponse;
use crate::error::Error;
use crate::forms::{self, CredentialErrors, LoginForm, validate_credentials};
use crate::session::{CurrentUser, SessionSettings, cookies};
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth_page).post(login))
        .route("/register", get(auth_page).post(register))
        .route("/logout", post(logout))
}

// ── Pages ──────────────────────────────────────────────────────────

/// Signed-in users have no business on the login or register pages.
async fn auth_page(State(state): State<AppState>, user: Option<CurrentUser>) -> Response {
    if user.is_some() {
        return Redirect::to(state.settings.home_path()).into_response();
    }
    Json(JsonValue::Object(Map::new())).into_response()
}

// ── Login ──────────────────────────────────────────────────────────

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), Response> {
    validate_credentials(&form.username, &form.password)
        .map_err(|errors| (StatusCode::BAD_REQUEST, Json(errors)).into_response())?;

    let tokens = state
        .backend
        .login(&form.username, &form.password)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, username = %form.username, "Login refused");
            (status_of(&e), Json(CredentialErrors::echo(&form.username))).into_response()
        })?;

    tracing::info!(username = %form.username, "Login successful");

    Ok((
        start_session(jar, &tokens, &state.settings),
        Redirect::to(state.settings.home_path()),
    ))
}

// ── Register ───────────────────────────────────────────────────────

async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<(CookieJar, Redirect), Response> {
    let username = forms::field(&pairs, "username").unwrap_or_default();
    let password = forms::field(&pairs, "password").unwrap_or_default();
    let email = forms::field(&pairs, "email").unwrap_or_default();

    validate_credentials(&username, &password)
        .map_err(|errors| (StatusCode::BAD_REQUEST, Json(errors)).into_response())?;

    let fields: Map<String, JsonValue> = pairs
        .into_iter()
        .map(|(k, v)| (k, JsonValue::String(v)))
        .collect();

    if let Err(e) = state.backend.register(&fields).await {
        let response = match e.backend_detail() {
            Some(detail) => {
                tracing::info!(username = %username, "Registration refused");
                (
                    status_of(&e),
                    Json(forms::registration_errors(&username, &email, detail)),
                )
            }
            None => {
                tracing::error!(error = %e, "Register API error");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(CredentialErrors::echo(&username).with_error("Network error. Please try again.")),
                )
            }
        };
        return Err(response.into_response());
    }

    let tokens = state.backend.login(&username, &password).await.map_err(|e| {
        tracing::error!(error = %e, username = %username, "Login after registration failed");
        (
            status_of(&e),
            Json(CredentialErrors::echo(&username).with_error("Login failed")),
        )
            .into_response()
    })?;

    tracing::info!(username = %username, "Registration successful");

    Ok((
        start_session(jar, &tokens, &state.settings),
        Redirect::to(state.settings.home_path()),
    ))
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    (
        cookies::clear_session(jar),
        Redirect::to(state.settings.home_path()),
    )
}

// ── Helpers ────────────────────────────────────────────────────────

fn start_session(jar: CookieJar, tokens: &LoginResponse, settings: &SessionSettings) -> CookieJar {
    cookies::store_session(
        jar,
        &tokens.refresh_token,
        &tokens.access_token,
        cookies::access_max_age_from_millis(tokens.expire_in),
        settings,
    )
}

fn status_of(e: &Error) -> StatusCode {
    e.backend_status().unwrap_or(StatusCode::BAD_GATEWAY)
}
