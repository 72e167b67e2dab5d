//! Integration tests for Lens.
//!
//! # Running Tests
//!
//! ```bash
//! # Router-level tests (in-memory credential store, no services needed)
//! cargo test -p lens-integration-tests
//!
//! # Include the PostgreSQL store tests
//! LENS_TEST_DATABASE_URL=postgres://localhost/lens_test \
//!     cargo test -p lens-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - sign-up, login, logout and the access gate through the full router
//! - `pg_store` - `PgCredentialStore` against a live database

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use secrecy::SecretString;
use tower::ServiceExt;

use lens_web::config::{AuthConfig, CookieConfig, Environment, LensConfig, PasswordParams};
use lens_web::db::{CredentialStore, MemoryCredentialStore};
use lens_web::routes;
use lens_web::state::AppState;

/// Configuration suitable for tests: fixed secrets, cheap Argon2.
#[must_use]
pub fn test_config() -> LensConfig {
    LensConfig {
        database_url: SecretString::from("postgres://localhost/lens_test"),
        host: [127, 0, 0, 1].into(),
        port: 3000,
        environment: Environment::Development,
        auth: AuthConfig {
            hmac_key: SecretString::from("integration-hmac-key-Jd7#Lw2!Qz9@Rk4"),
            pepper: SecretString::from("integration-pepper-Tb6$Hn3&Vc8^Mx1"),
            password: PasswordParams {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        },
        cookie: CookieConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A router over an in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryCredentialStore>,
    pub cookie_name: String,
}

impl TestApp {
    /// Build with the default test configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Build with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration cannot build an `AppState`.
    #[must_use]
    pub fn with_config(config: LensConfig) -> Self {
        let store = Arc::new(MemoryCredentialStore::new());
        let cookie_name = config.cookie.name.clone();
        let shared: Arc<dyn CredentialStore> = store.clone();
        let state = AppState::new(config, shared).expect("Failed to build test state");

        Self {
            router: routes::app(state),
            store,
            cookie_name,
        }
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router itself fails, which it cannot for axum routers.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// GET a path, optionally presenting a remember token.
    pub async fn get(&self, path: &str, token: Option<&str>) -> Response<Body> {
        self.send(self.request("GET", path, token, None)).await
    }

    /// POST a urlencoded form, optionally presenting a remember token.
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
        token: Option<&str>,
    ) -> Response<Body> {
        let body = encode_form(form);
        self.send(self.request("POST", path, token, Some(body))).await
    }

    /// Sign up through the router and return the issued remember token.
    ///
    /// # Panics
    ///
    /// Panics if sign-up does not set a remember cookie.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/signup",
                &[("name", name), ("email", email), ("password", password)],
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        self.remember_token(&response)
            .expect("sign-up should set a remember cookie")
    }

    /// Extract the remember token from a response's `Set-Cookie` headers.
    #[must_use]
    pub fn remember_token(&self, response: &Response<Body>) -> Option<String> {
        let prefix = format!("{}=", self.cookie_name);
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.strip_prefix(&prefix))
            .filter_map(|rest| rest.split(';').next())
            .find(|value| !value.is_empty())
            .map(str::to_owned)
    }

    fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        form: Option<String>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("{}={token}", self.cookie_name));
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };
        builder.body(body).expect("valid test request")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a response body as UTF-8.
///
/// # Panics
///
/// Panics if the body cannot be read or is not UTF-8.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Location header of a redirect.
#[must_use]
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Encode pairs as an `application/x-www-form-urlencoded` body.
fn encode_form(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
