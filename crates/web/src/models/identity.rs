//! Request-scoped identity.

use super::User;

/// The identity resolved for one inbound request.
///
/// Inserted into the request extensions by the identity middleware and read
/// (never mutated) by the access gate, extractors, and handlers. A request
/// without a valid remember token carries `Identity::anonymous()`.
#[derive(Debug, Clone, Default)]
pub struct Identity(Option<User>);

impl Identity {
    /// An unauthenticated request.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(None)
    }

    /// A request authenticated as `user`.
    #[must_use]
    pub const fn user(user: User) -> Self {
        Self(Some(user))
    }

    /// The authenticated user, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// Whether a user was resolved for this request.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    /// Consume the identity, returning the user if any.
    #[must_use]
    pub fn into_user(self) -> Option<User> {
        self.0
    }
}

impl From<Option<User>> for Identity {
    fn from(user: Option<User>) -> Self {
        Self(user)
    }
}
