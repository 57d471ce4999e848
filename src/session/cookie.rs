//! Session cookie helpers.
//!
//! The cookie value is the session token itself. Cookies are built with the
//! `cookie` crate and exchanged through `Cookie` / `Set-Cookie` headers.

use cookie::{Cookie, SameSite as CookieSameSite};
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};

use super::config::{SameSite, SessionConfig};
use crate::AuthError;

/// Builds the session cookie carrying `token`.
///
/// No `Max-Age` or `Expires` is set, so browsers drop it when they close.
pub fn session_cookie(token: &str, config: &SessionConfig) -> Cookie<'static> {
    let same_site = match config.cookie_same_site {
        SameSite::None => CookieSameSite::None,
        SameSite::Lax => CookieSameSite::Lax,
        SameSite::Strict => CookieSameSite::Strict,
    };

    let mut cookie = Cookie::build((config.cookie_name.clone(), token.to_owned()))
        .path(config.cookie_path.clone())
        .secure(config.cookie_secure)
        .http_only(config.cookie_http_only)
        .same_site(same_site)
        .build();

    if let Some(ref domain) = config.cookie_domain {
        cookie.set_domain(domain.clone());
    }

    cookie
}

/// Builds a cookie that makes the client discard the session cookie.
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((config.cookie_name.clone(), String::new()))
        .path(config.cookie_path.clone())
        .build();

    if let Some(ref domain) = config.cookie_domain {
        cookie.set_domain(domain.clone());
    }

    cookie.make_removal();
    cookie
}

/// Reads the value of the cookie called `name` from the request headers.
///
/// Empty values count as absent.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

/// Appends a `Set-Cookie` header to the response headers.
pub fn append_cookie(headers: &mut HeaderMap, cookie: &Cookie<'_>) -> Result<(), AuthError> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AuthError::Internal(format!("invalid Set-Cookie header: {e}")))?;
    headers.append(SET_COOKIE, value);
    Ok(())
}
