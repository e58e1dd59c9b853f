//! Startup configuration read from the environment.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::backend::BackendConfig;
use crate::error::Error;
use crate::session::SessionSettings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Everything the binary needs to start serving.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub backend: BackendConfig,
    pub settings: SessionSettings,
}

impl AppConfig {
    /// Loads configuration from process environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `BACKEND_URL` | required |
    /// | `BIND_ADDR` | `0.0.0.0:3000` |
    /// | `DEV_COOKIES` | `false` (cookies are `Secure`) |
    /// | `ACCESS_TTL_SECS` | `3600` |
    /// | `BACKEND_TIMEOUT_SECS` | none |
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = var("BACKEND_URL")
            .ok_or_else(|| Error::Config("BACKEND_URL is required".into()))?;
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| Error::Config(format!("BACKEND_URL is not a valid URL: {e}")))?;

        let bind_addr = parse(
            "BIND_ADDR",
            var("BIND_ADDR").as_deref().unwrap_or(DEFAULT_BIND_ADDR),
        )?;

        let mut backend = BackendConfig::new(base_url);
        if let Some(secs) = var("BACKEND_TIMEOUT_SECS") {
            backend = backend.with_timeout(Duration::from_secs(parse("BACKEND_TIMEOUT_SECS", &secs)?));
        }

        let mut settings = SessionSettings::new();
        if let Some(dev) = var("DEV_COOKIES") {
            let dev: bool = parse("DEV_COOKIES", &dev)?;
            settings = settings.with_secure_cookies(!dev);
        }
        if let Some(secs) = var("ACCESS_TTL_SECS") {
            let secs: NonZeroU32 = parse("ACCESS_TTL_SECS", &secs)?;
            settings = settings.with_refreshed_access_ttl_secs(i64::from(secs.get()));
        }

        Ok(Self {
            bind_addr,
            backend,
            settings,
        })
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{key}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_backend_url_required() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("BACKEND_URL")));
    }

    #[test]
    fn test_invalid_backend_url() {
        let err = AppConfig::from_lookup(lookup(&[("BACKEND_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("BACKEND_URL", "http://api:8080/api/v1")]))
            .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.backend.base_url().as_str(), "http://api:8080/api/v1");
        assert_eq!(config.backend.timeout(), None);
        assert!(config.settings.secure_cookies);
        assert_eq!(config.settings.refreshed_access_ttl_secs, 3600);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("BACKEND_URL", "http://api:8080"),
            ("BIND_ADDR", "127.0.0.1:8000"),
            ("DEV_COOKIES", "true"),
            ("ACCESS_TTL_SECS", "600"),
            ("BACKEND_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(config.backend.timeout(), Some(Duration::from_secs(5)));
        assert!(!config.settings.secure_cookies);
        assert_eq!(config.settings.refreshed_access_ttl_secs, 600);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("BACKEND_URL", "http://api:8080"),
            ("BIND_ADDR", "  "),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn test_bad_number_names_the_variable() {
        let err = AppConfig::from_lookup(lookup(&[
            ("BACKEND_URL", "http://api:8080"),
            ("ACCESS_TTL_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.starts_with("ACCESS_TTL_SECS")));
    }

    #[test]
    fn test_access_ttl_must_be_positive() {
        for value in ["0", "-30"] {
            let err = AppConfig::from_lookup(lookup(&[
                ("BACKEND_URL", "http://api:8080"),
                ("ACCESS_TTL_SECS", value),
            ]))
            .unwrap_err();
            assert!(
                matches!(err, Error::Config(ref m) if m.starts_with("ACCESS_TTL_SECS")),
                "{value} should be rejected"
            );
        }
    }
}
