use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};

use super::actions::{self, ActionResult, ArticleIdForm, CategoryIdForm};
use super::error::RouteError;
use crate::backend::ArticleCommand;
use crate::forms::{ActionOutcome, FieldEcho};
use crate::query::ListingQuery;
use crate::session::CurrentUser;
use crate::state::AppState;
use crate::types::{Article, ArticleId, Category, Page};

/// Routes for signed-in users, mounted under `/dashboard`.
pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(articles))
        .route("/articles/create", post(create_article))
        .route("/articles/delete", post(delete_article))
        .route("/my-articles", get(my_articles))
        .route("/my-articles/send-for-review", post(send_for_review))
        .route("/my-articles/publish", post(publish))
        .route("/my-articles/delete", post(delete_article))
        .route("/my-articles/{id}", get(my_article))
        .route("/my-draft", get(my_drafts))
        .route("/my-draft/delete", post(delete_article))
        .route("/review-articles", get(review_articles))
        .route("/categories", get(categories))
        .route("/categories/delete", post(delete_category))
        .route("/account/verify", post(verify_account))
}

// ── Loaders ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ArticlesPage {
    articles: Page<Article>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MyArticlesPage {
    my_articles: Page<Article>,
}

async fn articles(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ArticlesPage>, RouteError> {
    let articles = state
        .backend
        .list_articles(Some(&user.access_token), &ListingQuery::newest_first())
        .await?;
    Ok(Json(ArticlesPage { articles }))
}

async fn my_articles(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MyArticlesPage>, RouteError> {
    let my_articles = state.backend.list_my_articles(Some(&user.access_token)).await?;
    Ok(Json(MyArticlesPage { my_articles }))
}

async fn my_drafts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MyArticlesPage>, RouteError> {
    let my_articles = state.backend.list_my_drafts(Some(&user.access_token)).await?;
    Ok(Json(MyArticlesPage { my_articles }))
}

#[derive(Serialize)]
struct ArticlePage {
    article: Article,
}

async fn my_article(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ArticlePage>, RouteError> {
    let article = state
        .backend
        .owned_article(Some(&user.access_token), &ArticleId(id))
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Own article lookup failed");
            RouteError::NotFound("Article")
        })?;
    Ok(Json(ArticlePage { article }))
}

async fn review_articles(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ArticlesPage>, RouteError> {
    let articles = state
        .backend
        .list_articles_for_review(Some(&user.access_token))
        .await?;
    Ok(Json(ArticlesPage { articles }))
}

#[derive(Serialize)]
struct CategoriesPage {
    categories: Page<Category>,
}

async fn categories(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<CategoriesPage>, RouteError> {
    let categories = state
        .backend
        .list_categories(Some(&user.access_token), None)
        .await?;
    Ok(Json(CategoriesPage { categories }))
}

// ── Actions ────────────────────────────────────────────────────────

async fn create_article(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> ActionResult {
    actions::create_article(&state.backend, Some(&user), multipart, "create").await
}

async fn delete_article(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<ArticleIdForm>,
) -> ActionResult {
    actions::delete_article(&state.backend, &user, form).await
}

async fn send_for_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ActionResult {
    actions::article_command(&state.backend, &user, ArticleCommand::SendForReview, pairs).await?;
    Ok(Json(ActionOutcome::done("sendForReview", "Article awaiting review")))
}

async fn publish(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ActionResult {
    actions::article_command(&state.backend, &user, ArticleCommand::Publish, pairs).await?;
    Ok(Json(ActionOutcome::done("publish", "Article Published successfully")))
}

async fn delete_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<CategoryIdForm>,
) -> ActionResult {
    let id = form.id()?;
    state
        .backend
        .delete_category(Some(&user.access_token), &id)
        .await?;
    tracing::info!(category_id = %id, "Category deleted");
    Ok(Json(ActionOutcome::done("delete", "Category Deleted successfully")))
}

#[derive(Debug, Deserialize)]
struct VerifyAccountForm {
    #[serde(default)]
    email: String,
}

#[derive(Serialize)]
struct VerifyAccountErrors {
    email: FieldEcho,
}

#[derive(Serialize)]
struct VerifyAccountDone {
    success: &'static str,
}

async fn verify_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<VerifyAccountForm>,
) -> Result<Response, RouteError> {
    if form.email.trim().is_empty() {
        let errors = VerifyAccountErrors {
            email: FieldEcho {
                data: None,
                detail: Some("you didn't provide a email".into()),
            },
        };
        return Ok((StatusCode::BAD_REQUEST, Json(errors)).into_response());
    }
    state
        .backend
        .verify_account(Some(&user.access_token), &form.email)
        .await?;
    Ok(Json(VerifyAccountDone {
        success: "Account verified successfully",
    })
    .into_response())
}
