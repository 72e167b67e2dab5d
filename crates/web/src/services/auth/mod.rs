//! Authentication service.
//!
//! Sign-up, password login, remember-token resolution, and logout.
//!
//! # Remember tokens
//!
//! Sign-up and login mint a 32-byte random token, return it to the caller
//! exactly once, and persist only its keyed hash. Later requests present the
//! raw token; the service re-hashes it and looks the hash up. Each login
//! overwrites the stored hash, so a user has at most one live token.

mod error;
pub mod password;

pub use error::{AuthError, SetupError};
pub use password::PasswordScheme;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lens_core::{Email, RememberToken};

use crate::config::AuthConfig;
use crate::crypto::{RandomSourceError, TokenHasher, random};
use crate::db::{CredentialStore, RepositoryError};
use crate::models::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length, bounding the cost of a single hash.
const MAX_PASSWORD_LENGTH: usize = 1024;

/// Maximum display name length.
const MAX_NAME_LENGTH: usize = 100;

/// Authentication service.
///
/// Holds no per-request state; share it behind an `Arc` or inside `AppState`.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: TokenHasher,
    passwords: PasswordScheme,
    /// Set once the OS random source has failed; no session is issued after.
    entropy_lost: Arc<AtomicBool>,
}

impl AuthService {
    /// Create a new authentication service.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if the HMAC key or password parameters are unusable.
    pub fn new(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Result<Self, SetupError> {
        Ok(Self {
            store,
            tokens: TokenHasher::new(&config.hmac_key)?,
            passwords: PasswordScheme::new(&config.pepper, &config.password)?,
            entropy_lost: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Whether the service has stopped issuing sessions after a random
    /// source failure.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.entropy_lost.load(Ordering::Acquire)
    }

    /// Trip the random-source latch without a real OS failure.
    #[cfg(test)]
    pub(crate) fn mark_degraded(&self) {
        self.entropy_lost.store(true, Ordering::Release);
    }

    /// Run a step that needs fresh randomness, latching on failure.
    fn with_entropy<T>(&self, step: impl FnOnce() -> Result<T, AuthError>) -> Result<T, AuthError> {
        if self.is_degraded() {
            return Err(AuthError::RandomSource(RandomSourceError(
                "random source failed earlier in this process".to_owned(),
            )));
        }
        let result = step();
        if let Err(e) = &result
            && e.is_fatal()
        {
            self.entropy_lost.store(true, Ordering::Release);
            tracing::error!(error = %e, "random source failed, refusing new sessions");
        }
        result
    }

    /// Get a reference to the credential store.
    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Register a new user and mint their first remember token.
    ///
    /// The raw token is returned only here and from [`Self::login`]; the
    /// caller places it in the client cookie.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation`/`InvalidEmail` for bad input (before
    /// any store call), `AuthError::DuplicateUser` if the email is taken,
    /// `AuthError::Store` or `AuthError::RandomSource` otherwise.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, RememberToken), AuthError> {
        let name = validate_name(name)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = self.with_entropy(|| self.passwords.hash(password))?;
        let token = self.with_entropy(|| Ok(random::remember_token()?))?;
        let email_domain = email.domain().to_owned();

        // The store's unique index is the authority on duplicates; there is
        // no separate existence check to race against.
        let user = self
            .store
            .create(NewUser {
                name,
                email,
                password_hash,
                remember_hash: Some(self.tokens.hash(&token)),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    tracing::info!(email_domain = %email_domain, "sign-up rejected: email taken");
                    AuthError::DuplicateUser
                }
                other => AuthError::Store(other),
            })?;

        tracing::info!(user_id = %user.id, "user signed up");
        Ok((user, token))
    }

    /// Login with email and password, rotating the remember token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong (the two cases are indistinguishable).
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, RememberToken), AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("password is required".to_owned()));
        }
        if password.len() > MAX_PASSWORD_LENGTH {
            tracing::warn!(
                email_domain = email.domain(),
                password_bytes = password.len(),
                "login rejected: password over length bound"
            );
            return Err(AuthError::InvalidCredentials);
        }

        let Some(mut user) = self.store.find_by_email(&email).await? else {
            self.passwords.verify_dummy(password);
            tracing::warn!(email_domain = email.domain(), "login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if let Err(e) = self.passwords.verify(password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, error = %e, "login rejected: password mismatch");
            return Err(e);
        }

        let token = self.remember(&mut user).await?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok((user, token))
    }

    /// Mint a new remember token for `user` and persist its hash.
    ///
    /// Any previously issued token stops resolving.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RandomSource` or `AuthError::Store`.
    pub async fn remember(&self, user: &mut User) -> Result<RememberToken, AuthError> {
        let token = self.with_entropy(|| Ok(random::remember_token()?))?;
        user.remember_hash = Some(self.tokens.hash(&token));
        self.store.update(user).await?;
        Ok(token)
    }

    /// Resolve a raw remember token to its user.
    ///
    /// `Ok(None)` is the anonymous case, not an error. Never writes.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the lookup fails.
    pub async fn resolve_by_token(&self, token: &RememberToken) -> Result<Option<User>, AuthError> {
        if token.is_empty() {
            return Ok(None);
        }

        let hash = self.tokens.hash(token);
        Ok(self.store.find_by_remember_hash(&hash).await?)
    }

    /// Invalidate the user's remember token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the update fails.
    pub async fn logout(&self, user: &User) -> Result<(), AuthError> {
        let mut user = user.clone();
        user.remember_hash = None;
        self.store.update(&user).await?;

        tracing::info!(user_id = %user.id, "user logged out");
        Ok(())
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("tokens", &self.tokens)
            .field("passwords", &self.passwords)
            .field("degraded", &self.is_degraded())
            .finish_non_exhaustive()
    }
}

/// Validate and trim a display name.
fn validate_name(name: &str) -> Result<String, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::Validation("name is required".to_owned()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_owned())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("password is required".to_owned()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::PasswordParams;
    use crate::db::MemoryCredentialStore;
    use crate::state::testing::FailingCredentialStore;

    fn config() -> AuthConfig {
        AuthConfig {
            hmac_key: SecretString::from("unit-test-hmac-key-Zq8#vL2!pR5@wT9"),
            pepper: SecretString::from("unit-test-pepper-Kx4$mN7&bQ1^cH3"),
            password: PasswordParams {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        }
    }

    fn service() -> (AuthService, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let auth = AuthService::new(store.clone(), &config()).unwrap();
        (auth, store)
    }

    /// Flip one character of a token while keeping it well-formed.
    fn tamper(token: &RememberToken) -> RememberToken {
        let mut chars: Vec<char> = token.expose().chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        RememberToken::new(chars.into_iter().collect::<String>())
    }

    #[tokio::test]
    async fn test_sign_up_then_login() {
        let (auth, _) = service();
        let (user, _) = auth
            .sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap();

        let (logged_in, _) = auth.login("ada@example.com", "s3cret!").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_sign_up_stores_only_hashes() {
        let (auth, store) = service();
        let (user, token) = auth
            .sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap();

        let stored = store.get(user.id).await.unwrap();
        assert_ne!(stored.password_hash, "s3cret!");
        let hash = stored.remember_hash.unwrap();
        assert_ne!(hash.as_str(), token.expose());
    }

    #[tokio::test]
    async fn test_sign_up_normalizes_email() {
        let (auth, _) = service();
        let (user, _) = auth
            .sign_up("Ada", "  ADA@Example.com ", "s3cret!")
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "ada@example.com");

        assert!(auth.login("ada@EXAMPLE.com", "s3cret!").await.is_ok());
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email() {
        let (auth, _) = service();
        auth.sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap();

        let err = auth
            .sign_up("Other Ada", "Ada@Example.com", "different1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));
    }

    #[tokio::test]
    async fn test_sign_up_validation_happens_before_store() {
        let (auth, store) = service();

        let cases = [
            ("", "ada@example.com", "s3cret!"),
            ("   ", "ada@example.com", "s3cret!"),
            ("Ada", "not-an-email", "s3cret!"),
            ("Ada", "ada@example.com", ""),
            ("Ada", "ada@example.com", "short"),
        ];
        for (name, email, password) in cases {
            let err = auth.sign_up(name, email, password).await.unwrap_err();
            assert!(err.is_validation(), "expected validation error, got {err:?}");
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_wrong_password_matches_unknown_email() {
        let (auth, _) = service();
        auth.sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap();

        let wrong = auth.login("ada@example.com", "wrong").await.unwrap_err();
        let unknown = auth.login("nobody@example.com", "s3cret!").await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_resolve_round_trip_and_tamper() {
        let (auth, _) = service();
        auth.sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap();
        let (user, token) = auth.login("ada@example.com", "s3cret!").await.unwrap();

        let resolved = auth.resolve_by_token(&token).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);

        assert!(auth.resolve_by_token(&tamper(&token)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent_and_read_only() {
        let (auth, store) = service();
        let (user, token) = auth
            .sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap();
        let before = store.get(user.id).await.unwrap();

        let first = auth.resolve_by_token(&token).await.unwrap().unwrap();
        let second = auth.resolve_by_token(&token).await.unwrap().unwrap();
        assert_eq!(first.id, second.id);

        let after = store.get(user.id).await.unwrap();
        assert_eq!(before.remember_hash, after.remember_hash);
        assert_eq!(before.updated_at, after.updated_at);
    }

    #[tokio::test]
    async fn test_resolve_empty_token() {
        let (auth, _) = service();
        let resolved = auth.resolve_by_token(&RememberToken::new("")).await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_login_rotates_token() {
        let (auth, _) = service();
        auth.sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap();

        let (_, t1) = auth.login("ada@example.com", "s3cret!").await.unwrap();
        let (user, t2) = auth.login("ada@example.com", "s3cret!").await.unwrap();
        assert_ne!(t1.expose(), t2.expose());

        assert!(auth.resolve_by_token(&t1).await.unwrap().is_none());
        let resolved = auth.resolve_by_token(&t2).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let (auth, store) = service();
        auth.sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap();
        let (user, token) = auth.login("ada@example.com", "s3cret!").await.unwrap();

        auth.logout(&user).await.unwrap();

        assert!(auth.resolve_by_token(&token).await.unwrap().is_none());
        assert!(!store.get(user.id).await.unwrap().has_remember_token());
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_sign_up() {
        let (auth, store) = service();
        let (a, b) = tokio::join!(
            auth.sign_up("Ada", "ada@example.com", "s3cret!"),
            auth.sign_up("Ada", "ada@example.com", "s3cret!"),
        );

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        let failure = a.err().or(b.err()).unwrap();
        assert!(matches!(failure, AuthError::DuplicateUser));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_example_scenario() {
        let (auth, _) = service();

        let (ada, t0) = auth
            .sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap();
        assert_eq!(ada.id.as_i32(), 1);

        let resolved = auth.resolve_by_token(&t0).await.unwrap().unwrap();
        assert_eq!(resolved.id.as_i32(), 1);

        assert!(matches!(
            auth.login("ada@example.com", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));

        let (again, t1) = auth.login("ada@example.com", "s3cret!").await.unwrap();
        assert_eq!(again.id.as_i32(), 1);
        assert_ne!(t0.expose(), t1.expose());

        assert!(auth.resolve_by_token(&t0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_random_source_failure_stops_new_sessions() {
        let (auth, store) = service();
        let (_, token) = auth
            .sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap();

        auth.mark_degraded();
        assert!(auth.is_degraded());

        let err = auth
            .sign_up("Bob", "bob@example.com", "s3cret!")
            .await
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(store.len().await, 1);

        let err = auth.login("ada@example.com", "s3cret!").await.unwrap_err();
        assert!(err.is_fatal());

        // Existing sessions still resolve
        assert!(auth.resolve_by_token(&token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_rejects_oversized_password_before_lookup() {
        let (auth, _) = service();
        auth.sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap();

        let huge = "p".repeat(MAX_PASSWORD_LENGTH + 1);
        let err = auth.login("ada@example.com", &huge).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        // Never reaches the store, so an outage is not observed either
        let down = AuthService::new(Arc::new(FailingCredentialStore), &config()).unwrap();
        let err = down.login("ada@example.com", &huge).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let auth = AuthService::new(Arc::new(FailingCredentialStore), &config()).unwrap();

        let err = auth
            .sign_up("Ada", "ada@example.com", "s3cret!")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));

        let err = auth.login("ada@example.com", "s3cret!").await.unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));

        let token = RememberToken::new("bm90LWEtcmVhbC10b2tlbg==".to_owned());
        let err = auth.resolve_by_token(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));

        // A store outage is not a random-source failure
        assert!(!auth.is_degraded());
    }

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("  Ada ").unwrap(), "Ada");
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_password_bounds() {
        assert!(validate_password("s3cret!").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password(&"p".repeat(MAX_PASSWORD_LENGTH + 1)).is_err());
    }
}
