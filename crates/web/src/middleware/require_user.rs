//! Access gate middleware and extractors.
//!
//! The gate reads the [`Identity`] attached by the identity middleware. It
//! never touches the store, so it can be layered any number of times.

use axum::{
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::models::{Identity, User};

/// Where anonymous HTML requests are sent.
pub const LOGIN_PATH: &str = "/login";

/// Returned when a route requires a user but the request is anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl AuthRejection {
    /// Pick the rejection for a request path.
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

fn current_identity(parts: &Parts) -> Option<&User> {
    parts.extensions.get::<Identity>().and_then(Identity::current)
}

/// Middleware that only lets authenticated requests through.
///
/// Apply with `route_layer(axum::middleware::from_fn(require_user))`. An
/// anonymous request is answered here and the inner handler never runs.
pub async fn require_user(request: Request, next: Next) -> Response {
    let authenticated = request
        .extensions()
        .get::<Identity>()
        .is_some_and(Identity::is_authenticated);

    if !authenticated {
        let path = request.uri().path();
        tracing::debug!(path, "anonymous request rejected by access gate");
        return AuthRejection::for_path(path).into_response();
    }

    next.run(request).await
}

/// Extractor that requires an authenticated user.
///
/// If the request is anonymous, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub User);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_identity(parts)
            .cloned()
            .map(Self)
            .ok_or_else(|| AuthRejection::for_path(parts.uri.path()))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireUser`, this does not reject anonymous requests.
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_identity(parts).cloned()))
    }
}
