//! HTTP route handlers for Lens.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (credential store ping)
//!
//! # Auth
//! GET  /signup                 - Sign-up page
//! POST /signup                 - Sign-up action (sets remember cookie)
//! GET  /login                  - Login page
//! POST /login                  - Login action (rotates remember cookie)
//!
//! # Requires a user
//! POST /logout                 - Logout action (clears remember cookie)
//! GET  /account                - Account overview
//! ```

pub mod account;
pub mod auth;
pub mod health;
pub mod home;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{identity_middleware, request_id_middleware, require_user};
use crate::state::AppState;

/// Routes open to anonymous requests.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Routes behind the access gate.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/account", get(account::index))
        .route("/logout", post(auth::logout))
        .route_layer(from_fn(require_user))
}

/// Build the full application router with its middleware stack.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .layer(from_fn_with_state(state.clone(), identity_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}
