//! In-process credential store.
//!
//! Mirrors the uniqueness guarantees of the `PostgreSQL` schema: every write
//! takes the single write lock, checks the unique keys, and applies the change
//! before releasing it, so two concurrent sign-ups for one email produce
//! exactly one user.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use lens_core::{Email, RememberTokenHash, UserId};

use super::{CredentialStore, RepositoryError};
use crate::models::{NewUser, User};

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    last_id: i32,
}

/// Credential store holding users in memory.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Whether the store holds no users.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Fetch a user by ID, bypassing the credential lookups.
    pub async fn get(&self, id: UserId) -> Option<User> {
        self.inner
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| &u.email == email).cloned())
    }

    async fn find_by_remember_hash(
        &self,
        hash: &RememberTokenHash,
    ) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.remember_hash.as_ref() == Some(hash))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;

        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        if let Some(hash) = &user.remember_hash
            && inner.users.iter().any(|u| u.remember_hash.as_ref() == Some(hash))
        {
            return Err(RepositoryError::Conflict(
                "remember token already exists".to_owned(),
            ));
        }

        inner.last_id += 1;
        let now = Utc::now();
        let created = User {
            id: UserId::new(inner.last_id),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            remember_hash: user.remember_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(created.clone());

        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;

        let position = inner
            .users
            .iter()
            .position(|u| u.id == user.id)
            .ok_or(RepositoryError::NotFound)?;

        let clashes = inner.users.iter().any(|u| {
            u.id != user.id
                && (u.email == user.email
                    || (u.remember_hash.is_some() && u.remember_hash == user.remember_hash))
        });
        if clashes {
            return Err(RepositoryError::Conflict(
                "email or remember token already exists".to_owned(),
            ));
        }

        let Some(stored) = inner.users.get_mut(position) else {
            return Err(RepositoryError::NotFound);
        };

        stored.name.clone_from(&user.name);
        stored.email = user.email.clone();
        stored.password_hash.clone_from(&user.password_hash);
        stored.remember_hash.clone_from(&user.remember_hash);
        stored.updated_at = Utc::now();

        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
