//! End-to-end authentication flow through the full router.
//!
//! Uses the in-memory credential store; no external services needed.

#![allow(clippy::unwrap_used)]

use axum::http::{StatusCode, header};

use lens_core::{Email, RememberTokenHash};
use lens_integration_tests::{TestApp, body_string, location, test_config};
use lens_web::config::CookieConfig;
use lens_web::db::CredentialStore;

// ============================================================================
// Sign-up
// ============================================================================

#[tokio::test]
async fn test_signup_sets_cookie_and_opens_account() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/signup",
            &[
                ("name", "Ada"),
                ("email", "ada@example.com"),
                ("password", "s3cret!"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/account"));

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(!set_cookie.contains("Secure"));

    let token = app.remember_token(&response).unwrap();
    assert_eq!(token.len(), 44);

    let account = app.get("/account", Some(&token)).await;
    assert_eq!(account.status(), StatusCode::OK);
    let body = body_string(account).await;
    assert!(body.contains("Ada"));
    assert!(body.contains("ada@example.com"));
}

#[tokio::test]
async fn test_signup_persists_hash_not_token() {
    let app = TestApp::new();
    let token = app.sign_up("Ada", "ada@example.com", "s3cret!").await;

    let email = Email::parse("ada@example.com").unwrap();
    let user = app.store.find_by_email(&email).await.unwrap().unwrap();
    let stored = user.remember_hash.unwrap();
    assert_ne!(stored.as_str(), token);
    assert_eq!(stored.as_str().len(), 88);
    assert_ne!(user.password_hash, "s3cret!");
}

#[tokio::test]
async fn test_signup_duplicate_email_is_conflict() {
    let app = TestApp::new();
    app.sign_up("Ada", "ada@example.com", "s3cret!").await;

    let response = app
        .post_form(
            "/signup",
            &[
                ("name", "Imposter"),
                ("email", "ADA@example.com"),
                ("password", "another1"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(app.remember_token(&response).is_none());
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_signup_validation_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/signup",
            &[("name", "Ada"), ("email", "not-an-email"), ("password", "s3cret!")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_signup_form_never_echoes_password() {
    let app = TestApp::new();
    let response = app
        .post_form(
            "/signup",
            &[("name", ""), ("email", "ada@example.com"), ("password", "s3cret!")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("ada@example.com"));
    assert!(!body.contains("s3cret!"));
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_rotates_remember_token() {
    let app = TestApp::new();
    let first = app.sign_up("Ada", "ada@example.com", "s3cret!").await;

    let response = app
        .post_form(
            "/login",
            &[("email", "ada@example.com"), ("password", "s3cret!")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/account"));
    let second = app.remember_token(&response).unwrap();
    assert_ne!(first, second);

    let stale = app.get("/account", Some(&first)).await;
    assert_eq!(stale.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&stale), Some("/login"));

    let fresh = app.get("/account", Some(&second)).await;
    assert_eq!(fresh.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let app = TestApp::new();
    app.sign_up("Ada", "ada@example.com", "s3cret!").await;

    let wrong = app
        .post_form(
            "/login",
            &[("email", "ada@example.com"), ("password", "nope")],
            None,
        )
        .await;
    let unknown = app
        .post_form(
            "/login",
            &[("email", "bob@example.com"), ("password", "s3cret!")],
            None,
        )
        .await;

    for response in [&wrong, &unknown] {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(response), Some("/login?error=credentials"));
        assert!(app.remember_token(response).is_none());
    }
}

#[tokio::test]
async fn test_login_page_shows_known_error_only() {
    let app = TestApp::new();

    let body = body_string(app.get("/login?error=credentials", None).await).await;
    assert!(body.contains("Invalid email or password."));

    let body = body_string(app.get("/login?error=%3Cb%3Ehi%3C%2Fb%3E", None).await).await;
    assert!(!body.contains("<b>hi</b>"));
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_expires_cookie_and_token() {
    let app = TestApp::new();
    let token = app.sign_up("Ada", "ada@example.com", "s3cret!").await;

    let response = app.post_form("/logout", &[], Some(&token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("remember_token=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    let email = Email::parse("ada@example.com").unwrap();
    let user = app.store.find_by_email(&email).await.unwrap().unwrap();
    assert!(user.remember_hash.is_none());

    let account = app.get("/account", Some(&token)).await;
    assert_eq!(account.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_logout_requires_user() {
    let app = TestApp::new();
    let response = app.post_form("/logout", &[], None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

// ============================================================================
// Identity and access gate
// ============================================================================

#[tokio::test]
async fn test_anonymous_account_redirects_to_login() {
    let app = TestApp::new();
    let response = app.get("/account", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_forged_token_is_anonymous() {
    let app = TestApp::new();
    let token = app.sign_up("Ada", "ada@example.com", "s3cret!").await;

    // The stored hash itself is not a usable cookie value
    let email = Email::parse("ada@example.com").unwrap();
    let user = app.store.find_by_email(&email).await.unwrap().unwrap();
    let hash: RememberTokenHash = user.remember_hash.unwrap();

    let response = app.get("/account", Some(hash.as_str())).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let mut forged = token.into_bytes();
    forged[0] = if forged[0] == b'A' { b'B' } else { b'A' };
    let forged = String::from_utf8(forged).unwrap();
    let response = app.get("/account", Some(&forged)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_home_greets_signed_in_user() {
    let app = TestApp::new();
    let token = app.sign_up("Ada", "ada@example.com", "s3cret!").await;

    let anonymous = body_string(app.get("/", None).await).await;
    assert!(anonymous.contains("/signup"));

    let signed_in = body_string(app.get("/", Some(&token)).await).await;
    assert!(signed_in.contains("Welcome back, Ada."));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");

    let response = app.get("/health/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_production_cookie_attributes() {
    let mut config = test_config();
    config.cookie = CookieConfig {
        name: "lens_rt".to_owned(),
        secure: true,
        max_age_days: Some(14),
    };
    let app = TestApp::with_config(config);

    let response = app
        .post_form(
            "/signup",
            &[
                ("name", "Ada"),
                ("email", "ada@example.com"),
                ("password", "s3cret!"),
            ],
            None,
        )
        .await;
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("lens_rt="));
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("Max-Age=1209600"));

    let token = app.remember_token(&response).unwrap();
    let account = app.get("/account", Some(&token)).await;
    assert_eq!(account.status(), StatusCode::OK);
}
