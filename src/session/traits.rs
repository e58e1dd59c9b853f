use std::future::Future;

use crate::backend::BackendClient;
use crate::error::Error;
use crate::types::UserProfile;

/// The three identity calls the session layer needs from the backend.
///
/// [`BackendClient`] is the production implementation. Tokens are opaque:
/// implementations pass them through and never look inside.
///
/// # Example
///
/// ```rust,ignore
/// impl TokenService for StaticTokens {
///     async fn refresh_access_token(&self, refresh: &str) -> Result<String, Error> {
///         Ok(format!("access-for-{refresh}"))
///     }
///     async fn verify_access_token(&self, _access: &str) -> Result<(), Error> { Ok(()) }
///     async fn fetch_profile(&self, _access: &str) -> Result<UserProfile, Error> {
///         Ok(self.profile.clone())
///     }
/// }
/// ```
pub trait TokenService: Send + Sync + 'static {
    /// Mint a new access token from a refresh token.
    fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<String, Error>> + Send;

    /// Succeeds only if the backend still accepts `access_token`.
    fn verify_access_token(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Profile of the account owning `access_token`.
    fn fetch_profile(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<UserProfile, Error>> + Send;
}

impl TokenService for BackendClient {
    fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<String, Error>> + Send {
        self.refresh_token(refresh_token)
    }

    fn verify_access_token(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send {
        self.verify_token(access_token)
    }

    fn fetch_profile(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<UserProfile, Error>> + Send {
        self.me(access_token)
    }
}
