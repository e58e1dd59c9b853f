use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};

use super::actions::{self, ActionResult, ArticleIdForm, CategoryIdForm, fan_out, required_id};
use super::error::RouteError;
use crate::backend::{ArticleCommand, NewUser, UserCommand};
use crate::forms::{self, ActionOutcome, CategoryDraft};
use crate::query::{ArticleFilters, ListingQuery, UserFilters};
use crate::session::AdminUser;
use crate::state::AppState;
use crate::types::{Article, Category, Page, Tag, UserId, UserProfile};

/// Routes for admins, mounted under `/admin`.
pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(articles))
        .route("/articles/create", post(create_article))
        .route("/articles/approve", post(approve_article))
        .route("/articles/reject", post(reject_article))
        .route("/articles/analyse", post(analyse_article))
        .route("/articles/delete", post(delete_article))
        .route("/articles/delete-batch", post(delete_articles))
        .route("/categories", get(categories))
        .route("/categories/create", post(create_category))
        .route("/categories/delete", post(delete_category))
        .route("/tags", get(tags))
        .route("/users", get(users))
        .route("/users/enable", post(enable_user))
        .route("/users/disable", post(disable_user))
        .route("/users/promote", post(promote_user))
        .route("/users/demote", post(demote_user))
        .route("/users/create", post(create_user))
        .route("/users/delete", post(delete_user))
        .route("/users/delete-batch", post(delete_users))
        .route("/users/enable-batch", post(enable_users))
        .route("/users/disable-batch", post(disable_users))
}

// ── Articles ───────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ArticleListParams {
    status: Option<String>,
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
    #[serde(default)]
    sort: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminArticlesPage {
    articles: Page<Article>,
    categories: Vec<String>,
    applied_filters: ArticleFilters,
    applied_sorting: Vec<String>,
}

/// Article table. A backend outage renders an empty table rather than an error page.
async fn articles(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Query(params): Query<ArticleListParams>,
) -> Json<AdminArticlesPage> {
    let filters = ArticleFilters {
        status: params.status,
        search_term: params.search_term,
    };
    let token = Some(user.access_token.as_str());
    let query = filters.to_query(&params.sort);

    let loaded = async {
        let categories = state.backend.category_titles(token).await?;
        let articles = state.backend.list_admin_articles(token, &query).await?;
        Ok::<_, crate::error::Error>((categories, articles))
    }
    .await;

    match loaded {
        Ok((categories, articles)) => Json(AdminArticlesPage {
            articles,
            categories,
            applied_filters: filters,
            applied_sorting: params.sort,
        }),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load articles");
            Json(AdminArticlesPage {
                articles: Page::empty(),
                categories: Vec::new(),
                applied_filters: ArticleFilters::default(),
                applied_sorting: Vec::new(),
            })
        }
    }
}

async fn create_article(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    multipart: Multipart,
) -> ActionResult {
    actions::create_article(&state.backend, Some(&user), multipart, "create").await
}

async fn approve_article(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ActionResult {
    actions::article_command(&state.backend, &user, ArticleCommand::Approve, pairs).await?;
    Ok(Json(ActionOutcome::done("publish", "Article Published successfully")))
}

async fn reject_article(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ActionResult {
    actions::article_command(&state.backend, &user, ArticleCommand::Reject, pairs).await?;
    Ok(Json(ActionOutcome::done("reject", "Article Rejected successfully")))
}

async fn analyse_article(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Form(form): Form<ArticleIdForm>,
) -> ActionResult {
    let id = form.id()?;
    state
        .backend
        .article_command(Some(&user.access_token), ArticleCommand::Analyse, &id, None)
        .await?;
    Ok(Json(ActionOutcome::done(
        "analyse",
        "Article Submitted for analysis successfully",
    )))
}

async fn delete_article(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Form(form): Form<ArticleIdForm>,
) -> ActionResult {
    actions::delete_article(&state.backend, &user, form).await
}

/// Forwards the submitted selection to the backend's batch endpoint unchanged.
async fn delete_articles(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ActionResult {
    let count = pairs.len();
    state
        .backend
        .delete_articles(Some(&user.access_token), forms::pairs_to_form(pairs))
        .await?;
    tracing::info!(fields = count, "Articles batch deleted");
    Ok(Json(ActionOutcome::done("delete", "Articles Deleted successfully")))
}

// ── Categories ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct CategoriesPage {
    categories: Page<Category>,
}

async fn categories(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
) -> Result<Json<CategoriesPage>, RouteError> {
    let categories = state
        .backend
        .list_categories(Some(&user.access_token), Some(&ListingQuery::newest_first()))
        .await?;
    Ok(Json(CategoriesPage { categories }))
}

async fn create_category(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    multipart: Multipart,
) -> ActionResult {
    let parts = forms::read_parts(multipart).await?;
    let draft = CategoryDraft::from_parts(parts)?;
    let title = draft.title.clone();
    state
        .backend
        .create_category(Some(&user.access_token), draft.into_form()?)
        .await?;
    tracing::info!(title = %title, "Category created");
    Ok(Json(ActionOutcome::done("create", "Category Created successfully")))
}

async fn delete_category(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
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

// ── Tags ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TagsPage {
    tags: Page<Tag>,
}

async fn tags(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
) -> Result<Json<TagsPage>, RouteError> {
    let tags = state.backend.list_tags(Some(&user.access_token)).await?;
    Ok(Json(TagsPage { tags }))
}

// ── Users ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserListParams {
    role: Option<String>,
    enabled: Option<String>,
    search_terms: Option<String>,
    #[serde(default)]
    sort: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UsersPage {
    users: Page<UserProfile>,
    applied_filters: UserFilters,
    applied_sorting: Vec<String>,
}

async fn users(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Query(params): Query<UserListParams>,
) -> Result<Json<UsersPage>, RouteError> {
    let filters = UserFilters {
        role: params.role,
        enabled: params.enabled,
        search_terms: params.search_terms,
    };
    let users = state
        .backend
        .list_users(Some(&user.access_token), &filters.to_query(&params.sort))
        .await?;
    Ok(Json(UsersPage {
        users,
        applied_filters: filters,
        applied_sorting: params.sort,
    }))
}

/// Target of a single-user action: `userId`, or the first `selectedIds` entry
/// when submitted from a table row.
fn user_id(pairs: &[(String, String)]) -> Result<UserId, RouteError> {
    let first_selected = || forms::repeated(pairs, "selectedIds").into_iter().next();
    required_id(forms::field(pairs, "userId").or_else(first_selected)).map(UserId)
}

async fn run_user_command(
    state: &AppState,
    admin: &crate::session::CurrentUser,
    command: UserCommand,
    pairs: &[(String, String)],
) -> Result<UserId, RouteError> {
    let id = user_id(pairs)?;
    state
        .backend
        .user_command(Some(&admin.access_token), command, &id)
        .await?;
    tracing::info!(user_id = %id, admin_id = %admin.profile.id, command = ?command, "User updated");
    Ok(id)
}

async fn enable_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ActionResult {
    run_user_command(&state, &admin, UserCommand::Enable, &pairs).await?;
    Ok(Json(ActionOutcome::done("enable", "User enabled successfully")))
}

async fn disable_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ActionResult {
    run_user_command(&state, &admin, UserCommand::Disable, &pairs).await?;
    Ok(Json(ActionOutcome::done("disable", "User disabled successfully")))
}

async fn promote_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ActionResult {
    run_user_command(&state, &admin, UserCommand::Promote, &pairs).await?;
    Ok(Json(ActionOutcome::done("promote", "User promoted to admin")))
}

async fn demote_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ActionResult {
    run_user_command(&state, &admin, UserCommand::Demote, &pairs).await?;
    Ok(Json(ActionOutcome::done("demote", "User Set to USER")))
}

#[derive(Debug, Deserialize)]
struct CreateUserForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: String,
}

async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(form): Form<CreateUserForm>,
) -> ActionResult {
    if form.username.trim().is_empty() {
        return Err(RouteError::Invalid("Username is required".into()));
    }
    if form.email.trim().is_empty() {
        return Err(RouteError::Invalid("Email is required".into()));
    }
    let roles = Some(form.role)
        .filter(|r| !r.is_empty())
        .into_iter()
        .collect();
    let user = NewUser {
        username: form.username,
        email: form.email,
        roles,
        enabled: true,
    };
    state
        .backend
        .create_user(Some(&admin.access_token), &user)
        .await?;
    tracing::info!(username = %user.username, "User created");
    Ok(Json(ActionOutcome::done("create", "User created successfully")))
}

async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ActionResult {
    let id = user_id(&pairs)?;
    state
        .backend
        .delete_user(Some(&admin.access_token), &id)
        .await?;
    tracing::info!(user_id = %id, "User deleted");
    Ok(Json(ActionOutcome::done("delete", "User deleted successfully")))
}

fn batch_outcome(action: &'static str, verb: &str, done: usize, failed: usize) -> Response {
    if failed == 0 {
        return Json(ActionOutcome::done(
            action,
            format!("{done} users {verb} successfully"),
        ))
        .into_response();
    }
    (
        StatusCode::BAD_GATEWAY,
        Json(ActionOutcome::failed(format!(
            "{failed} of {} users could not be {verb}",
            done + failed
        ))),
    )
        .into_response()
}

fn selected_ids(pairs: &[(String, String)]) -> Result<Vec<String>, RouteError> {
    let ids = forms::repeated(pairs, "selectedIds");
    if ids.is_empty() {
        return Err(RouteError::missing_id());
    }
    Ok(ids)
}

async fn delete_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, RouteError> {
    let ids = selected_ids(&pairs)?;
    let token = Some(admin.access_token.as_str());
    let (done, failed) = fan_out(&ids, |id| {
        let id = UserId(id.to_string());
        let backend = &state.backend;
        async move { backend.delete_user(token, &id).await }
    })
    .await;
    Ok(batch_outcome("delete", "deleted", done, failed))
}

async fn batch_user_command(
    state: &AppState,
    admin: &crate::session::CurrentUser,
    command: UserCommand,
    pairs: &[(String, String)],
) -> Result<(usize, usize), RouteError> {
    let ids = selected_ids(pairs)?;
    let token = Some(admin.access_token.as_str());
    Ok(fan_out(&ids, |id| {
        let id = UserId(id.to_string());
        let backend = &state.backend;
        async move { backend.user_command(token, command, &id).await }
    })
    .await)
}

async fn enable_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, RouteError> {
    let (done, failed) = batch_user_command(&state, &admin, UserCommand::Enable, &pairs).await?;
    Ok(batch_outcome("enable", "enabled", done, failed))
}

async fn disable_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, RouteError> {
    let (done, failed) = batch_user_command(&state, &admin, UserCommand::Disable, &pairs).await?;
    Ok(batch_outcome("disable", "disabled", done, failed))
}
