//! Session cookie helpers.
//!
//! The session is the signed credential itself; nothing is stored server
//! side. Issuing sets the `token` cookie and revoking overwrites it with an
//! expired copy carrying the same attributes, so browsers match and drop it.

use actix_web::HttpRequest;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, CookieBuilder};
use actix_web::http::header::AUTHORIZATION;

use crate::domain::SESSION_VALIDITY_DAYS;

use super::session_config::CookieSettings;

/// Name of the cookie carrying the session credential.
pub const SESSION_COOKIE: &str = "token";

const BEARER_PREFIX: &str = "Bearer ";

fn base_cookie(value: String, settings: CookieSettings) -> CookieBuilder<'static> {
    Cookie::build(SESSION_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(settings.same_site)
}

/// Cookie delivering a freshly issued credential.
pub fn session_cookie(token: &str, settings: CookieSettings) -> Cookie<'static> {
    base_cookie(token.to_owned(), settings)
        .max_age(CookieDuration::days(SESSION_VALIDITY_DAYS))
        .finish()
}

/// Cookie instructing the browser to discard the session credential.
pub fn removal_cookie(settings: CookieSettings) -> Cookie<'static> {
    base_cookie(String::new(), settings)
        .max_age(CookieDuration::ZERO)
        .finish()
}

/// Credential presented with the request.
///
/// The cookie wins when both carriers are present; the bearer header serves
/// clients without a cookie jar.
pub fn presented_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_owned());
        }
    }
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}
