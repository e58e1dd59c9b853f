use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use super::config::SessionSettings;

pub const REFRESH_COOKIE_NAME: &str = "refresh";
pub const ACCESS_COOKIE_NAME: &str = "access";

fn token_cookie(name: &'static str, value: &str, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Long-lived `refresh` cookie set at login.
pub fn refresh_cookie(token: &str, settings: &SessionSettings) -> Cookie<'static> {
    token_cookie(
        REFRESH_COOKIE_NAME,
        token,
        Duration::days(settings.refresh_ttl_days),
        settings.secure_cookies,
    )
}

/// Short-lived `access` cookie.
pub fn access_cookie(token: &str, max_age: Duration, settings: &SessionSettings) -> Cookie<'static> {
    token_cookie(ACCESS_COOKIE_NAME, token, max_age, settings.secure_cookies)
}

/// Converts the backend's `expireIn` (milliseconds) into a cookie max-age.
#[must_use]
pub fn access_max_age_from_millis(expire_in_ms: u64) -> Duration {
    Duration::seconds(i64::try_from(expire_in_ms / 1000).unwrap_or(i64::MAX))
}

/// Adds both session cookies. `access` is never written without `refresh`.
pub fn store_session(
    jar: CookieJar,
    refresh_token: &str,
    access_token: &str,
    access_max_age: Duration,
    settings: &SessionSettings,
) -> CookieJar {
    jar.add(refresh_cookie(refresh_token, settings))
        .add(access_cookie(access_token, access_max_age, settings))
}

fn expired(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Expires both session cookies, whether or not the browser sent them.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.add(expired(REFRESH_COOKIE_NAME))
        .add(expired(ACCESS_COOKIE_NAME))
}

/// Reads `(refresh, access)` from the jar.
pub fn session_tokens(jar: &CookieJar) -> (Option<String>, Option<String>) {
    let get = |name| {
        jar.get(name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    };
    (get(REFRESH_COOKIE_NAME), get(ACCESS_COOKIE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let c = refresh_cookie("r1", &SessionSettings::new());
        assert_eq!(c.name(), "refresh");
        assert_eq!(c.value(), "r1");
        assert_eq!(c.http_only(), Some(true));
        assert_eq!(c.secure(), Some(true));
        assert_eq!(c.path(), Some("/"));
        assert_eq!(c.max_age(), Some(Duration::days(90)));
    }

    #[test]
    fn test_access_cookie_respects_insecure_setting() {
        let settings = SessionSettings::new().with_secure_cookies(false);
        let c = access_cookie("a1", Duration::hours(1), &settings);
        assert_eq!(c.name(), "access");
        assert_eq!(c.secure(), Some(false));
        assert_eq!(c.max_age(), Some(Duration::hours(1)));
    }

    #[test]
    fn test_expire_in_is_milliseconds() {
        assert_eq!(access_max_age_from_millis(3_600_000), Duration::hours(1));
        assert_eq!(access_max_age_from_millis(999), Duration::ZERO);
    }

    #[test]
    fn test_store_then_read_tokens() {
        let jar = store_session(
            CookieJar::new(),
            "r1",
            "a1",
            Duration::hours(1),
            &SessionSettings::new(),
        );
        assert_eq!(
            session_tokens(&jar),
            (Some("r1".to_string()), Some("a1".to_string()))
        );
    }

    #[test]
    fn test_clear_removes_both() {
        let jar = store_session(
            CookieJar::new(),
            "r1",
            "a1",
            Duration::hours(1),
            &SessionSettings::new(),
        );
        let jar = clear_session(jar);
        assert_eq!(session_tokens(&jar), (None, None));
    }

    #[test]
    fn test_clear_expires_cookies_the_browser_never_sent() {
        let jar = clear_session(CookieJar::new());
        let names: Vec<_> = jar.iter().map(|c| (c.name().to_string(), c.max_age())).collect();
        assert!(names.contains(&("refresh".to_string(), Some(Duration::ZERO))));
        assert!(names.contains(&("access".to_string(), Some(Duration::ZERO))));
    }

    #[test]
    fn test_empty_cookie_values_count_as_missing() {
        let jar = CookieJar::new().add(Cookie::new(REFRESH_COOKIE_NAME, ""));
        assert_eq!(session_tokens(&jar), (None, None));
    }
}
