//! HTTP surface: public pages, auth forms and the two dashboards.
//!
//! Loaders answer `GET` with the JSON a template would render. Actions answer
//! `POST` with an [`ActionOutcome`](crate::forms::ActionOutcome) or a redirect.

mod actions;
mod admin;
mod auth;
mod dashboard;
mod error;
mod public;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use tower_http::trace::TraceLayer;

pub use error::RouteError;

use crate::backend::BackendClient;
use crate::session::{SessionState, require_admin, require_user, session_layer};
use crate::state::AppState;

/// Builds the full application router.
///
/// The session layer wraps every route, so `/dashboard` and `/admin` guards
/// see the identity it resolved.
pub fn app(state: AppState) -> Router {
    let session = SessionState::new(state.backend.clone(), state.settings.clone());

    Router::new()
        .merge(auth::routes())
        .merge(public::routes())
        .nest(
            "/dashboard",
            dashboard::routes().route_layer(from_fn(require_user)),
        )
        .nest("/admin", admin::routes().route_layer(from_fn(require_admin)))
        .with_state(state)
        .layer(from_fn_with_state(session, session_layer::<BackendClient>))
        .layer(TraceLayer::new_for_http())
}
