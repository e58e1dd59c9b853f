//! Token-cookie sessions for axum.
//!
//! Every request runs through [`session_layer`], which turns the
//! `refresh`/`access` cookie pair into an optional [`CurrentUser`] by asking
//! the backend. There is no server-side session store: identity is
//! recomputed from the cookies on each request.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use inkpress::session::{SessionSettings, SessionState, require_user, session_layer};
//!
//! let state = SessionState::new(backend.clone(), SessionSettings::new());
//!
//! let app = axum::Router::new()
//!     .nest("/dashboard", dashboard.route_layer(from_fn(require_user)))
//!     .layer(from_fn_with_state(state, session_layer::<BackendClient>));
//! ```

mod config;
pub mod cookies;
mod error;
mod extractor;
mod resolver;
mod state;
mod traits;
mod types;

pub use config::SessionSettings;
pub use error::AuthError;
pub use extractor::{AdminUser, require_admin, require_user};
pub use resolver::{Resolution, resolve_session, session_layer};
pub use state::SessionState;
pub use traits::TokenService;
pub use types::CurrentUser;
