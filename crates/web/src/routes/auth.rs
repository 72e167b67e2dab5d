//! Authentication route handlers.
//!
//! Sign-up and login hand the new remember token to the browser in the
//! remember cookie and redirect to the account page. Logout clears it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use cookie::Cookie;
use serde::Deserialize;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    RequireUser, expired_remember_cookie, remember_cookie_for, set_cookie_header,
};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Where a successful sign-up or login lands.
const AFTER_LOGIN_PATH: &str = "/account";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
#[derive(Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl std::fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
    pub name: String,
    pub email: String,
}

/// Turn a login error code from the query string into a message.
///
/// Unknown codes are dropped rather than echoed.
fn login_error_message(code: &str) -> Option<String> {
    let message = match code {
        "credentials" => "Invalid email or password.",
        "required" => "Please log in to continue.",
        _ => return None,
    };
    Some(message.to_owned())
}

/// Attach a `Set-Cookie` header to a response.
fn with_cookie(response: impl IntoResponse, cookie: &Cookie<'_>) -> Result<Response> {
    let value = set_cookie_header(cookie)
        .ok_or_else(|| AppError::Internal("remember cookie is not a valid header".to_owned()))?;
    let mut response = response.into_response();
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page() -> impl IntoResponse {
    SignupTemplate {
        error: None,
        name: String::new(),
        email: String::new(),
    }
}

/// Handle sign-up form submission.
///
/// Input problems re-render the form with the error status (400 or 409).
pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Result<Response> {
    match state
        .auth()
        .sign_up(&form.name, &form.email, &form.password)
        .await
    {
        Ok((user, token)) => {
            set_sentry_user(&user.id);
            let cookie = remember_cookie_for(&token, &state.config().cookie);
            with_cookie(Redirect::to(AFTER_LOGIN_PATH), &cookie)
        }
        Err(e) if e.is_validation() || matches!(e, AuthError::DuplicateUser) => {
            tracing::info!(error = %e, "sign-up rejected");
            let err = AppError::from(e);
            let page = SignupTemplate {
                error: Some(err.public_message()),
                name: form.name,
                email: form.email,
            };
            Ok((err.status(), page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().and_then(login_error_message),
    }
}

/// Handle login form submission.
///
/// Unknown email, wrong password, and malformed input all redirect back to
/// the login page with the same error code.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Result<Response> {
    match state.auth().login(&form.email, &form.password).await {
        Ok((user, token)) => {
            set_sentry_user(&user.id);
            let cookie = remember_cookie_for(&token, &state.config().cookie);
            with_cookie(Redirect::to(AFTER_LOGIN_PATH), &cookie)
        }
        Err(e) if e.is_validation() || matches!(e, AuthError::InvalidCredentials) => {
            if e.is_validation() {
                tracing::info!(error = %e, "login rejected: malformed input");
            }
            Ok(Redirect::to("/login?error=credentials").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// Invalidates the stored token hash, then expires the cookie.
pub async fn logout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Response> {
    state.auth().logout(&user).await?;
    clear_sentry_user();

    let cookie = expired_remember_cookie(&state.config().cookie);
    with_cookie(Redirect::to("/"), &cookie)
}
