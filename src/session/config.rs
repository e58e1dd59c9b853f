/// Cookie and redirect settings shared by the session layer and the auth routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub(crate) refresh_ttl_days: i64,
    pub(crate) refreshed_access_ttl_secs: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) login_path: String,
    pub(crate) home_path: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            refresh_ttl_days: 90,
            refreshed_access_ttl_secs: 60 * 60,
            secure_cookies: true,
            login_path: "/login".into(),
            home_path: "/".into(),
        }
    }
}

impl SessionSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifetime of the `refresh` cookie set at login.
    #[must_use]
    pub fn with_refresh_ttl_days(mut self, days: i64) -> Self {
        self.refresh_ttl_days = days;
        self
    }

    /// Lifetime of the `access` cookie minted by a silent refresh.
    #[must_use]
    pub fn with_refreshed_access_ttl_secs(mut self, secs: i64) -> Self {
        self.refreshed_access_ttl_secs = secs;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Where anonymous visitors of protected pages are sent.
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Where users land after login, registration and logout.
    #[must_use]
    pub fn with_home_path(mut self, path: impl Into<String>) -> Self {
        self.home_path = path.into();
        self
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cookie_lifetimes() {
        let settings = SessionSettings::new();
        assert_eq!(settings.refresh_ttl_days, 90);
        assert_eq!(settings.refreshed_access_ttl_secs, 3600);
        assert!(settings.secure_cookies);
        assert_eq!(settings.login_path(), "/login");
        assert_eq!(settings.home_path(), "/");
    }

    #[test]
    fn test_builder_overrides() {
        let settings = SessionSettings::new()
            .with_secure_cookies(false)
            .with_refreshed_access_ttl_secs(120)
            .with_login_path("/signin");
        assert!(!settings.secure_cookies);
        assert_eq!(settings.refreshed_access_ttl_secs, 120);
        assert_eq!(settings.login_path(), "/signin");
    }
}
