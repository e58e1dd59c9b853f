#![doc = include_str!("../README.md")]

pub mod backend;
pub mod config;
pub mod error;
pub mod forms;
pub mod query;
pub mod routes;
pub mod session;
pub mod state;
pub mod types;

// Re-exports for convenient access
pub use backend::{
    ArticleCommand, BackendClient, BackendConfig, LoginResponse, NewUser, UserCommand,
};
pub use config::AppConfig;
pub use error::Error;
pub use query::{ArticleFilters, ListingQuery, UserFilters};
pub use routes::{RouteError, app};
pub use session::{CurrentUser, SessionSettings};
pub use state::AppState;
pub use types::{Article, ArticleId, Category, CategoryId, Page, Tag, TagId, UserId, UserProfile};
