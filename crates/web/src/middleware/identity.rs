//! Request identity middleware.
//!
//! Resolves the remember-token cookie to a user and attaches an [`Identity`]
//! to every request. Resolution failures never fail the request; they only
//! make it anonymous.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::Span;

use super::cookie::remember_cookie;
use crate::error::set_sentry_user;
use crate::models::Identity;
use crate::state::AppState;

/// Middleware that attaches the request's [`Identity`] as an extension.
///
/// Without a remember cookie the request is anonymous and the store is not
/// consulted. With one, the token is resolved through the auth service; an
/// unknown token or a store error both degrade to anonymous.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match remember_cookie(request.headers(), &state.config().cookie.name) {
        None => Identity::anonymous(),
        Some(token) => match state.auth().resolve_by_token(&token).await {
            Ok(Some(user)) => {
                Span::current().record("user_id", user.id.as_i32());
                set_sentry_user(&user.id);
                Identity::user(user)
            }
            Ok(None) => {
                tracing::debug!("remember token did not resolve");
                Identity::anonymous()
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity resolution failed, continuing anonymous");
                Identity::anonymous()
            }
        },
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}
