//! Cookies issued by the API.
//!
//! `ecid` names the caller's event channel so logout can close it. `rps`
//! carries the reset-subject hash that pairs with a reset token.

use std::time::Duration;

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use dashx_core::config::ServerConfig;

/// Event channel id cookie.
pub const CHANNEL_COOKIE: &str = "ecid";
/// Reset-password subject hash cookie.
pub const RESET_COOKIE: &str = "rps";
/// The reset cookie is only sent back to the reset endpoint.
pub const RESET_COOKIE_PATH: &str = "/api/v1/users/reset-password";

const ONE_YEAR: Duration = Duration::from_secs(365 * 24 * 60 * 60);

fn issue(
    name: &'static str,
    value: String,
    path: &'static str,
    max_age: Duration,
    server: &ServerConfig,
) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, value))
        .path(path)
        .http_only(true)
        .secure(server.secure_cookies)
        .max_age(time::Duration::try_from(max_age).unwrap_or(time::Duration::MAX))
        .build();
    if !server.domain.is_empty() {
        cookie.set_domain(server.domain.clone());
    }
    cookie
}

/// Cookie naming the channel opened by an event stream.
pub fn channel_cookie(server: &ServerConfig, channel_id: &str) -> Cookie<'static> {
    let mut cookie = issue(CHANNEL_COOKIE, channel_id.to_string(), "/", ONE_YEAR, server);
    cookie.set_same_site(SameSite::Strict);
    cookie
}

/// Cookie carrying the reset subject hash for `lifespan`.
pub fn reset_cookie(server: &ServerConfig, subject_hash: &str, lifespan: Duration) -> Cookie<'static> {
    issue(
        RESET_COOKIE,
        subject_hash.to_string(),
        RESET_COOKIE_PATH,
        lifespan,
        server,
    )
}

/// Add a removal of the reset cookie to `jar`.
///
/// The removal is emitted even when the request carried no `rps` cookie.
pub fn clear_reset_cookie(jar: CookieJar, server: &ServerConfig) -> CookieJar {
    let mut cookie = issue(
        RESET_COOKIE,
        String::new(),
        RESET_COOKIE_PATH,
        Duration::ZERO,
        server,
    );
    cookie.make_removal();
    jar.add(cookie)
}

#[cfg(test)]
mod tests {
    use axum::http::header::SET_COOKIE;
    use axum::response::IntoResponse;

    use super::*;

    fn server() -> ServerConfig {
        ServerConfig {
            domain: "dash.example.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_channel_cookie_attributes() {
        let cookie = channel_cookie(&server(), "abc");
        assert_eq!(cookie.name_value(), ("ecid", "abc"));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.domain(), Some("dash.example.com"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(365)));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn test_reset_cookie_is_scoped_to_reset_endpoint() {
        let cookie = reset_cookie(&server(), "hash", Duration::from_secs(900));
        assert_eq!(cookie.name_value(), ("rps", "hash"));
        assert_eq!(cookie.path(), Some(RESET_COOKIE_PATH));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(900)));
        assert_eq!(cookie.same_site(), None);
    }

    #[test]
    fn test_clear_reset_cookie_expires_immediately() {
        let config = ServerConfig {
            secure_cookies: false,
            ..server()
        };
        let response = clear_reset_cookie(CookieJar::new(), &config).into_response();
        let value = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();

        assert!(value.starts_with("rps=;"), "{value}");
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("Path=/api/v1/users/reset-password"));
        assert!(!value.contains("Secure"));
    }
}
