//! Form actions shared by the public editor and both dashboards.

use axum::Json;
use axum::extract::Multipart;
use futures_util::future::join_all;
use serde::Deserialize;

use super::error::RouteError;
use crate::backend::{ArticleCommand, BackendClient};
use crate::error::Error;
use crate::forms::{self, ActionOutcome, ArticleDraft};
use crate::session::CurrentUser;
use crate::types::{ArticleId, CategoryId};

pub(super) type ActionResult = Result<Json<ActionOutcome>, RouteError>;

#[derive(Debug, Deserialize)]
pub(super) struct ArticleIdForm {
    #[serde(rename = "articleId", default)]
    article_id: Option<String>,
}

impl ArticleIdForm {
    pub(super) fn id(self) -> Result<ArticleId, RouteError> {
        required_id(self.article_id).map(ArticleId)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CategoryIdForm {
    #[serde(rename = "categoryId", default)]
    category_id: Option<String>,
}

impl CategoryIdForm {
    pub(super) fn id(self) -> Result<CategoryId, RouteError> {
        required_id(self.category_id).map(CategoryId)
    }
}

pub(super) fn required_id(value: Option<String>) -> Result<String, RouteError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(RouteError::missing_id)
}

/// Bearer token of the signed-in user, if any.
pub(super) fn bearer(user: Option<&CurrentUser>) -> Option<&str> {
    user.map(|u| u.access_token.as_str())
}

pub(super) async fn create_article(
    backend: &BackendClient,
    user: Option<&CurrentUser>,
    multipart: Multipart,
    action: &'static str,
) -> ActionResult {
    let parts = forms::read_parts(multipart).await?;
    let draft = ArticleDraft::from_parts(parts)?;
    let title = draft.title.clone();
    backend.create_article(bearer(user), draft.into_form()?).await?;
    tracing::info!(title = %title, "Article created");
    Ok(Json(ActionOutcome::done(action, "Article created successfully")))
}

pub(super) async fn delete_article(
    backend: &BackendClient,
    user: &CurrentUser,
    form: ArticleIdForm,
) -> ActionResult {
    let id = form.id()?;
    backend.delete_article(Some(&user.access_token), &id).await?;
    tracing::info!(article_id = %id, user_id = %user.profile.id, "Article deleted");
    Ok(Json(ActionOutcome::done("delete", "Article Deleted successfully")))
}

/// Runs an article state transition, forwarding any fields besides `articleId`.
pub(super) async fn article_command(
    backend: &BackendClient,
    user: &CurrentUser,
    command: ArticleCommand,
    mut pairs: Vec<(String, String)>,
) -> Result<ArticleId, RouteError> {
    let id = required_id(forms::field(&pairs, "articleId")).map(ArticleId)?;
    pairs.retain(|(k, _)| k != "articleId");
    let form = (!pairs.is_empty()).then(|| forms::pairs_to_form(pairs));
    backend
        .article_command(Some(&user.access_token), command, &id, form)
        .await?;
    tracing::info!(article_id = %id, command = ?command, "Article command accepted");
    Ok(id)
}

/// Issues one backend call per id concurrently and reports how many failed.
pub(super) async fn fan_out<'a, F, Fut>(ids: &'a [String], call: F) -> (usize, usize)
where
    F: Fn(&'a str) -> Fut,
    Fut: std::future::Future<Output = Result<(), Error>>,
{
    let results = join_all(ids.iter().map(|id| call(id.as_str()))).await;
    let failed = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .inspect(|e| tracing::warn!(error = %e, "Batch item failed"))
        .count();
    (ids.len() - failed, failed)
}
