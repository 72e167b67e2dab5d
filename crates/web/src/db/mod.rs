//! Credential store for Lens users.
//!
//! # Database: `lens`
//!
//! ## Tables
//!
//! - `lens.user` - identity records with password and remember-token hashes
//!
//! Both `email` and `remember_hash` carry unique indexes; concurrent sign-ups
//! for the same email are serialized by the database, not by application
//! code.
//!
//! # Migrations
//!
//! The schema lives in `crates/web/migrations/` and is applied by the
//! deployment tooling, never on startup.
//!
//! # Implementations
//!
//! - [`PgCredentialStore`] - `PostgreSQL` via sqlx
//! - [`MemoryCredentialStore`] - in-process store for tests and local runs

pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use lens_core::{Email, RememberTokenHash};

use crate::models::{NewUser, User};

pub use memory::MemoryCredentialStore;
pub use users::PgCredentialStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence boundary for user credentials.
///
/// Every method is a single atomic store operation. Lookups distinguish
/// "not found" (`Ok(None)`) from store failure (`Err`).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the user registered under a normalized email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Find the user whose current remember-token hash equals `hash`.
    async fn find_by_remember_hash(
        &self,
        hash: &RememberTokenHash,
    ) -> Result<Option<User>, RepositoryError>;

    /// Insert a new user, assigning its ID and timestamps.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Persist the mutable fields of an existing user.
    ///
    /// Returns `RepositoryError::NotFound` if no user has this ID.
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
