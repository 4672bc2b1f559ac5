//! The `access_token` session cookie.

use axum::http::{HeaderMap, header};
use chrono::Duration;
use cookie::{Cookie, SameSite};

/// Name of the cookie that carries the session token.
pub const COOKIE_NAME: &str = "access_token";

/// An HttpOnly cookie holding `token`, kept by the browser for `ttl`.
pub fn session_cookie(token: String, ttl: Duration, secure: bool) -> Cookie<'static> {
  Cookie::build((COOKIE_NAME, token))
    .http_only(true)
    .same_site(SameSite::Lax)
    .path("/")
    .max_age(cookie::time::Duration::seconds(ttl.num_seconds()))
    .secure(secure)
    .build()
}

/// A cookie that clears the session cookie.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
  let mut cookie = Cookie::build((COOKIE_NAME, ""))
    .http_only(true)
    .same_site(SameSite::Lax)
    .path("/")
    .secure(secure)
    .build();
  cookie.make_removal();
  cookie
}

/// The session token from the request's `Cookie` headers. An empty value
/// counts as absent.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|value| value.to_str().ok())
    .flat_map(Cookie::split_parse)
    .filter_map(Result::ok)
    .find(|cookie| cookie.name() == COOKIE_NAME)
    .map(|cookie| cookie.value().to_owned())
    .filter(|value| !value.is_empty())
}
