//! Remember-token cookie handling.
//!
//! The raw token only ever travels in this cookie. It is `HttpOnly`,
//! `SameSite=Lax`, scoped to `/`, and `Secure` in production.

use axum::http::{HeaderMap, HeaderValue, header};
use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};

use lens_core::RememberToken;

use crate::config::CookieConfig;

/// Read the remember token from the request's `Cookie` headers.
///
/// Empty values are treated as absent. Malformed cookie pairs are skipped.
#[must_use]
pub fn remember_cookie(headers: &HeaderMap, name: &str) -> Option<RememberToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name && !c.value().is_empty())
        .map(|c| RememberToken::new(c.value()))
}

/// Build the cookie that hands a freshly minted token to the browser.
#[must_use]
pub fn remember_cookie_for(token: &RememberToken, config: &CookieConfig) -> Cookie<'static> {
    let mut builder = Cookie::build((config.name.clone(), token.expose().to_owned()))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax);

    if let Some(days) = config.max_age_days {
        builder = builder.max_age(Duration::days(days));
    }

    builder.build()
}

/// Build a cookie that clears the remember token from the browser.
#[must_use]
pub fn expired_remember_cookie(config: &CookieConfig) -> Cookie<'static> {
    Cookie::build((config.name.clone(), ""))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Render a cookie as a `Set-Cookie` header value.
///
/// Returns `None` if the cookie contains bytes not allowed in a header,
/// which cannot happen for base64 tokens and validated cookie names.
#[must_use]
pub fn set_cookie_header(cookie: &Cookie<'_>) -> Option<HeaderValue> {
    HeaderValue::from_str(&cookie.to_string()).ok()
}
