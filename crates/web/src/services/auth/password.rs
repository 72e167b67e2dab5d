//! Password scheme: peppered Argon2id.
//!
//! Passwords have little entropy, so they get a slow, salted, memory-hard
//! hash. This is never used for remember tokens (see `crypto::TokenHasher`).

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use secrecy::{ExposeSecret, SecretString};

use super::{AuthError, SetupError};
use crate::config::PasswordParams;
use crate::crypto::random;

/// Salt length in bytes.
const SALT_BYTES: usize = 16;

/// Hashed at startup so unknown-email logins cost the same as real ones.
const DUMMY_PASSWORD: &str = "lens-dummy-password";

/// Argon2id hasher keyed with the server-side pepper.
#[derive(Clone)]
pub struct PasswordScheme {
    pepper: SecretString,
    params: Params,
    dummy_hash: String,
}

impl PasswordScheme {
    /// Build the scheme from configured pepper and cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::PasswordScheme` if the parameters are rejected by
    /// Argon2 or the startup hash cannot be computed.
    pub fn new(pepper: &SecretString, params: &PasswordParams) -> Result<Self, SetupError> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| SetupError::PasswordScheme(e.to_string()))?;

        let mut scheme = Self {
            pepper: pepper.clone(),
            params,
            dummy_hash: String::new(),
        };
        scheme.dummy_hash = scheme
            .hash(DUMMY_PASSWORD)
            .map_err(|e| SetupError::PasswordScheme(e.to_string()))?;

        Ok(scheme)
    }

    fn argon2(&self) -> Result<Argon2<'_>, AuthError> {
        Argon2::new_with_secret(
            self.pepper.expose_secret().as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
        .map_err(|_| AuthError::PasswordHash)
    }

    /// Hash a password with a fresh random salt, returning a PHC string.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RandomSource` if no salt can be generated, or
    /// `AuthError::PasswordHash` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt_bytes = random::bytes(SALT_BYTES)?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|_| AuthError::PasswordHash)?;

        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Verify a password against a stored PHC string in constant time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on mismatch or an unparseable
    /// stored hash.
    pub fn verify(&self, password: &str, phc: &str) -> Result<(), AuthError> {
        let parsed_hash = PasswordHash::new(phc).map_err(|_| AuthError::InvalidCredentials)?;

        self.argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Run a verification whose outcome is discarded.
    ///
    /// Used when the email is unknown so the response time matches a wrong
    /// password for a real account.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}

impl std::fmt::Debug for PasswordScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordScheme")
            .field("algorithm", &"argon2id")
            .field("params", &self.params)
            .field("pepper", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
