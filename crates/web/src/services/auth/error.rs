//! Authentication error types.

use thiserror::Error;

use crate::crypto::RandomSourceError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input failed validation before reaching the store.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] lens_core::EmailError),

    /// A user with this email already exists.
    #[error("user already exists")]
    DuplicateUser,

    /// Wrong email/password combination. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),

    /// The OS could not provide entropy for a new token or salt.
    #[error("random source failure: {0}")]
    RandomSource(#[from] RandomSourceError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the caller can fix this error by correcting their input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidEmail(_))
    }

    /// Whether the process should stop issuing new sessions.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::RandomSource(_))
    }
}

/// Errors raised while building the authentication service from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid token hasher key: {0}")]
    HasherKey(#[from] hmac::digest::InvalidLength),
    #[error("invalid password scheme: {0}")]
    PasswordScheme(String),
}
