//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use core::fmt;

use chrono::{DateTime, Utc};

use lens_core::{Email, RememberTokenHash, UserId};

/// A Lens user (domain type).
#[derive(Clone)]
pub struct User {
    /// Unique user ID, assigned by the store.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalized, unique email address.
    pub email: Email,
    /// Argon2id PHC string. Never the plaintext password.
    pub password_hash: String,
    /// Hash of the most recently issued remember token, if any.
    pub remember_hash: Option<RememberTokenHash>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether a remember token is currently outstanding for this user.
    #[must_use]
    pub const fn has_remember_token(&self) -> bool {
        self.remember_hash.is_some()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("remember_hash", &self.remember_hash.as_ref().map(|_| "[REDACTED]"))
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// A user that has not been persisted yet.
///
/// The store assigns `id` and the timestamps on insert.
#[derive(Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Normalized email address.
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Hash of the token minted at sign-up.
    pub remember_hash: Option<RememberTokenHash>,
}
