use std::time::Duration;

use reqwest::Method;
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::query::ListingQuery;
use crate::types::{Article, ArticleId, Category, CategoryId, Page, Tag, UserId, UserProfile};

/// Location of the content backend.
///
/// ```rust,ignore
/// let config = BackendConfig::new("http://localhost:8080/api".parse()?)
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct BackendConfig {
    pub(crate) base_url: Url,
    pub(crate) timeout: Option<Duration>,
}

impl BackendConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: None,
        }
    }

    /// Per-request timeout. Without one, reqwest's default (none) applies.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Tokens minted by `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in milliseconds.
    pub expire_in: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

/// Account created from the admin users table.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub enabled: bool,
}

/// State transitions the backend exposes for a single article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleCommand {
    SendForReview,
    Publish,
    Approve,
    Reject,
    Analyse,
}

impl ArticleCommand {
    fn segments(self) -> &'static [&'static str] {
        match self {
            Self::SendForReview => &["articles", "send-review"],
            Self::Publish => &["articles", "publish"],
            Self::Approve => &["admin", "articles", "approve"],
            Self::Reject => &["admin", "articles", "reject"],
            Self::Analyse => &["admin", "articles", "analyse-by-ai"],
        }
    }

    fn operation(self) -> &'static str {
        match self {
            Self::SendForReview => "send article for review",
            Self::Publish => "publish article",
            Self::Approve => "approve article",
            Self::Reject => "reject article",
            Self::Analyse => "analyse article",
        }
    }
}

/// Account-level changes available to admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Enable,
    Disable,
    Promote,
    Demote,
}

impl UserCommand {
    fn segment(self) -> &'static str {
        match self {
            Self::Enable => "enable-user",
            Self::Disable => "disable-user",
            Self::Promote => "set-admin",
            Self::Demote => "set-user",
        }
    }

    fn operation(self) -> &'static str {
        match self {
            Self::Enable => "enable user",
            Self::Disable => "disable user",
            Self::Promote => "promote user",
            Self::Demote => "demote user",
        }
    }
}

/// Typed client for the content backend.
///
/// Every call is a single request; there is no retry and no caching.
/// Calls that take `token` send it as a bearer credential when present.
pub struct BackendClient {
    config: BackendConfig,
    http: reqwest::Client,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the underlying HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    // ── Auth ───────────────────────────────────────────────────────

    /// # Errors
    ///
    /// [`Error::Backend`] when the credentials are refused.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, Error> {
        let url = self.endpoint(&["auth", "login"])?;
        let response = self
            .http
            .post(url)
            .json(&Credentials { username, password })
            .send()
            .await?;
        let response = Self::ensure_success(response, "login").await?;
        Self::decode(response, "login").await
    }

    /// Forwards every registration field as-is. On refusal the backend's
    /// per-field messages are in [`Error::backend_detail`].
    pub async fn register(&self, fields: &serde_json::Map<String, serde_json::Value>) -> Result<(), Error> {
        let url = self.endpoint(&["auth", "register"])?;
        let response = self.http.post(url).json(fields).send().await?;
        Self::ensure_success(response, "register").await.map(drop)
    }

    /// Exchanges a refresh token for a fresh access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<String, Error> {
        let url = self.endpoint(&["auth", "refresh-token"])?;
        let response = self
            .http
            .post(url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        let response = Self::ensure_success(response, "refresh token").await?;
        let body: RefreshResponse = Self::decode(response, "refresh token").await?;
        Ok(body.access_token)
    }

    /// Only the status matters; the body is ignored.
    pub async fn verify_token(&self, token: &str) -> Result<(), Error> {
        let url = self.endpoint(&["auth", "verify-token"])?;
        let response = self
            .http
            .post(url)
            .json(&VerifyRequest { token })
            .send()
            .await?;
        Self::ensure_success(response, "verify token").await.map(drop)
    }

    pub async fn me(&self, access_token: &str) -> Result<UserProfile, Error> {
        let url = self.endpoint(&["auth", "me"])?;
        let response = self.http.get(url).bearer_auth(access_token).send().await?;
        let response = Self::ensure_success(response, "user info").await?;
        Self::decode(response, "user info").await
    }

    pub async fn verify_account(&self, token: Option<&str>, email: &str) -> Result<(), Error> {
        let url = self.endpoint(&["auth", "verify-account"])?;
        let response = self
            .request(Method::POST, url, token)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        Self::ensure_success(response, "verify account").await.map(drop)
    }

    // ── Articles ───────────────────────────────────────────────────

    pub async fn list_articles(
        &self,
        token: Option<&str>,
        query: &ListingQuery,
    ) -> Result<Page<Article>, Error> {
        self.get_listing(&["articles"], token, query, "list articles").await
    }

    pub async fn list_admin_articles(
        &self,
        token: Option<&str>,
        query: &ListingQuery,
    ) -> Result<Page<Article>, Error> {
        self.get_listing(&["admin", "articles"], token, query, "list admin articles")
            .await
    }

    pub async fn list_my_articles(&self, token: Option<&str>) -> Result<Page<Article>, Error> {
        self.get_listing(
            &["articles", "my-articles"],
            token,
            &ListingQuery::newest_first(),
            "list own articles",
        )
        .await
    }

    pub async fn list_my_drafts(&self, token: Option<&str>) -> Result<Page<Article>, Error> {
        self.get_listing(
            &["articles", "my-drafts"],
            token,
            &ListingQuery::newest_first(),
            "list own drafts",
        )
        .await
    }

    pub async fn list_articles_for_review(
        &self,
        token: Option<&str>,
    ) -> Result<Page<Article>, Error> {
        self.get_listing(
            &["articles", "for-review"],
            token,
            &ListingQuery::newest_first(),
            "list articles for review",
        )
        .await
    }

    /// One of the caller's own articles.
    pub async fn owned_article(&self, token: Option<&str>, id: &ArticleId) -> Result<Article, Error> {
        self.get_json(&["articles", "id-user", id.as_str()], token, "get own article")
            .await
    }

    pub async fn create_article(&self, token: Option<&str>, form: Form) -> Result<(), Error> {
        let url = self.endpoint(&["articles"])?;
        let response = self.request(Method::POST, url, token).multipart(form).send().await?;
        Self::ensure_success(response, "create article").await.map(drop)
    }

    pub async fn delete_article(&self, token: Option<&str>, id: &ArticleId) -> Result<(), Error> {
        self.delete(&["articles", id.as_str()], token, "delete article").await
    }

    pub async fn delete_articles(&self, token: Option<&str>, form: Form) -> Result<(), Error> {
        let url = self.endpoint(&["articles", "batch"])?;
        let response = self
            .request(Method::DELETE, url, token)
            .multipart(form)
            .send()
            .await?;
        Self::ensure_success(response, "delete articles").await.map(drop)
    }

    /// Runs a state transition; `form` carries any extra fields the caller submitted.
    pub async fn article_command(
        &self,
        token: Option<&str>,
        command: ArticleCommand,
        id: &ArticleId,
        form: Option<Form>,
    ) -> Result<(), Error> {
        let mut segments = command.segments().to_vec();
        segments.push(id.as_str());
        let url = self.endpoint(&segments)?;
        let mut request = self.request(Method::POST, url, token);
        if let Some(form) = form {
            request = request.multipart(form);
        }
        let response = request.send().await?;
        Self::ensure_success(response, command.operation()).await.map(drop)
    }

    // ── Categories ─────────────────────────────────────────────────

    pub async fn list_categories(
        &self,
        token: Option<&str>,
        query: Option<&ListingQuery>,
    ) -> Result<Page<Category>, Error> {
        let query = query.cloned().unwrap_or_default();
        self.get_listing(&["categories"], token, &query, "list categories").await
    }

    pub async fn category_titles(&self, token: Option<&str>) -> Result<Vec<String>, Error> {
        self.get_json(&["categories", "titles"], token, "list category titles")
            .await
    }

    pub async fn category(&self, token: Option<&str>, title: &str) -> Result<Category, Error> {
        self.get_json(&["categories", title], token, "get category").await
    }

    pub async fn category_articles(
        &self,
        token: Option<&str>,
        title: &str,
    ) -> Result<Page<Article>, Error> {
        self.get_json(&["categories", title, "articles"], token, "list category articles")
            .await
    }

    pub async fn create_category(&self, token: Option<&str>, form: Form) -> Result<(), Error> {
        let url = self.endpoint(&["categories"])?;
        let response = self.request(Method::POST, url, token).multipart(form).send().await?;
        Self::ensure_success(response, "create category").await.map(drop)
    }

    pub async fn delete_category(&self, token: Option<&str>, id: &CategoryId) -> Result<(), Error> {
        self.delete(&["categories", id.as_str()], token, "delete category").await
    }

    // ── Tags ───────────────────────────────────────────────────────

    pub async fn list_tags(&self, token: Option<&str>) -> Result<Page<Tag>, Error> {
        self.get_json(&["tags"], token, "list tags").await
    }

    // ── Users ──────────────────────────────────────────────────────

    pub async fn list_users(
        &self,
        token: Option<&str>,
        query: &ListingQuery,
    ) -> Result<Page<UserProfile>, Error> {
        self.get_listing(&["admin", "users"], token, query, "list users").await
    }

    pub async fn user_command(
        &self,
        token: Option<&str>,
        command: UserCommand,
        id: &UserId,
    ) -> Result<(), Error> {
        let url = self.endpoint(&["admin", "users", command.segment(), id.as_str()])?;
        let response = self.request(Method::POST, url, token).send().await?;
        Self::ensure_success(response, command.operation()).await.map(drop)
    }

    pub async fn create_user(&self, token: Option<&str>, user: &NewUser) -> Result<(), Error> {
        let url = self.endpoint(&["admin", "users"])?;
        let response = self.request(Method::POST, url, token).json(user).send().await?;
        Self::ensure_success(response, "create user").await.map(drop)
    }

    pub async fn delete_user(&self, token: Option<&str>, id: &UserId) -> Result<(), Error> {
        self.delete(&["admin", "users", id.as_str()], token, "delete user").await
    }

    // ── Helpers ────────────────────────────────────────────────────

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Url(self.config.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: Option<&str>) -> reqwest::RequestBuilder {
        let request = self.http.request(method, url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        token: Option<&str>,
        operation: &'static str,
    ) -> Result<T, Error> {
        let url = self.endpoint(segments)?;
        let response = self.request(Method::GET, url, token).send().await?;
        let response = Self::ensure_success(response, operation).await?;
        Self::decode(response, operation).await
    }

    async fn get_listing<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        token: Option<&str>,
        query: &ListingQuery,
        operation: &'static str,
    ) -> Result<Page<T>, Error> {
        let mut url = self.endpoint(segments)?;
        query.apply(&mut url);
        let response = self.request(Method::GET, url, token).send().await?;
        let response = Self::ensure_success(response, operation).await?;
        Self::decode(response, operation).await
    }

    async fn delete(
        &self,
        segments: &[&str],
        token: Option<&str>,
        operation: &'static str,
    ) -> Result<(), Error> {
        let url = self.endpoint(segments)?;
        let response = self.request(Method::DELETE, url, token).send().await?;
        Self::ensure_success(response, operation).await.map(drop)
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(Error::Backend {
            operation,
            status,
            detail,
        })
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<T, Error> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| Error::MalformedResponse { operation, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(BackendConfig::new(base.parse().unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let c = client("http://backend.test/api");
        assert_eq!(
            c.endpoint(&["auth", "refresh-token"]).unwrap().as_str(),
            "http://backend.test/api/auth/refresh-token"
        );
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let c = client("http://backend.test/api/");
        assert_eq!(
            c.endpoint(&["auth", "me"]).unwrap().as_str(),
            "http://backend.test/api/auth/me"
        );
    }

    #[test]
    fn test_endpoint_escapes_user_supplied_segments() {
        let c = client("http://backend.test");
        assert_eq!(
            c.endpoint(&["categories", "rust & go/web", "articles"]).unwrap().as_str(),
            "http://backend.test/categories/rust%20&%20go%2Fweb/articles"
        );
    }

    #[test]
    fn test_endpoint_rejects_cannot_be_a_base_urls() {
        let c = client("mailto:ops@backend.test");
        assert!(matches!(c.endpoint(&["auth"]), Err(Error::Url(_))));
    }

    #[test]
    fn test_article_commands_map_to_backend_paths() {
        assert_eq!(ArticleCommand::Approve.segments(), ["admin", "articles", "approve"]);
        assert_eq!(ArticleCommand::SendForReview.segments(), ["articles", "send-review"]);
        assert_eq!(UserCommand::Demote.segment(), "set-user");
    }

    #[test]
    fn test_config_with_timeout() {
        let config = BackendConfig::new("http://backend.test".parse().unwrap())
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.base_url().as_str(), "http://backend.test/");
    }

    #[test]
    fn test_login_response_uses_camel_case() {
        let body = r#"{"accessToken":"a1","refreshToken":"r1","expireIn":3600000}"#;
        let parsed: LoginResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.access_token, "a1");
        assert_eq!(parsed.refresh_token, "r1");
        assert_eq!(parsed.expire_in, 3_600_000);
    }
}
