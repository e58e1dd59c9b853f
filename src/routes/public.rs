use axum::extract::{Multipart, Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::actions::{self, ActionResult, bearer};
use super::error::RouteError;
use crate::query::ListingQuery;
use crate::session::CurrentUser;
use crate::state::AppState;
use crate::types::{Article, Category, Page};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/trending", get(trending))
        .route("/categories", get(categories))
        .route("/categories/{title}", get(category))
        .route("/write", get(write_page).post(write))
}

#[derive(Serialize)]
struct HomePage {
    user: Option<CurrentUser>,
}

async fn home(user: Option<CurrentUser>) -> Json<HomePage> {
    Json(HomePage { user })
}

#[derive(Serialize)]
struct ArticlesPage {
    articles: Page<Article>,
}

async fn trending(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
) -> Result<Json<ArticlesPage>, RouteError> {
    let articles = state
        .backend
        .list_articles(bearer(user.as_ref()), &ListingQuery::newest_first())
        .await?;
    Ok(Json(ArticlesPage { articles }))
}

#[derive(Serialize)]
struct CategoriesPage {
    categories: Page<Category>,
}

async fn categories(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
) -> Result<Json<CategoriesPage>, RouteError> {
    let categories = state
        .backend
        .list_categories(bearer(user.as_ref()), None)
        .await?;
    Ok(Json(CategoriesPage { categories }))
}

#[derive(Serialize)]
struct CategoryPage {
    category: Category,
    articles: Page<Article>,
}

async fn category(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(title): Path<String>,
) -> Result<Json<CategoryPage>, RouteError> {
    let token = bearer(user.as_ref());
    let category = state.backend.category(token, &title).await?;
    let articles = state.backend.category_articles(token, &title).await?;
    Ok(Json(CategoryPage { category, articles }))
}

#[derive(Serialize)]
struct WritePage {
    categories: Vec<String>,
}

/// Editor page. Category titles are a nicety: the editor still works without them.
async fn write_page(State(state): State<AppState>, user: Option<CurrentUser>) -> Json<WritePage> {
    let categories = state
        .backend
        .category_titles(bearer(user.as_ref()))
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Category titles unavailable");
            Vec::new()
        });
    Json(WritePage { categories })
}

async fn write(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    multipart: Multipart,
) -> ActionResult {
    actions::create_article(&state.backend, user.as_ref(), multipart, "createArticle").await
}
