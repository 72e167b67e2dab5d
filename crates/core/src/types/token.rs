//! Remember-token types.
//!
//! A [`RememberToken`] is the raw bearer credential handed to the browser; a
//! [`RememberTokenHash`] is its keyed fingerprint, the only form the server
//! ever persists. Keeping them as distinct types means a raw token cannot be
//! written to the store, and a stored hash cannot be replayed as a cookie.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Raw remember token, as minted at sign-up/login or read back from a cookie.
///
/// Holding the raw value is equivalent to holding the user's session, so this
/// type deliberately has no `Display`, no `Serialize`, and a redacting
/// `Debug`. The value is only reachable through [`RememberToken::expose`].
#[derive(Clone)]
pub struct RememberToken(String);

impl RememberToken {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw token value.
    ///
    /// Callers must only pass the result to the token hasher or into the
    /// outgoing cookie.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the token carries no value at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RememberToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RememberToken([REDACTED])")
    }
}

/// Keyed hash of a [`RememberToken`], stored alongside its owning user.
///
/// Equal hashes mean equal tokens under the same server key, so the hash is
/// used directly as the lookup key for session resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RememberTokenHash(String);

impl RememberTokenHash {
    /// Wrap an already-computed hash value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the hash and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for RememberTokenHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for RememberTokenHash {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for RememberTokenHash {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for RememberTokenHash {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
