//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::LensConfig;
use crate::db::CredentialStore;
use crate::services::auth::{AuthService, SetupError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and is immutable once built;
/// the credential store behind `AuthService` is the only shared mutable state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: LensConfig,
    auth: AuthService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Lens configuration
    /// * `store` - Credential store backing the auth service
    ///
    /// # Errors
    ///
    /// Returns an error if the HMAC key or password parameters are unusable.
    pub fn new(config: LensConfig, store: Arc<dyn CredentialStore>) -> Result<Self, SetupError> {
        let auth = AuthService::new(store, &config.auth)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, auth }),
        })
    }

    /// Get a reference to the Lens configuration.
    #[must_use]
    pub fn config(&self) -> &LensConfig {
        &self.inner.config
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }
}
