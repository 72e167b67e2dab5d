//! Keyed token hasher.
//!
//! `hash(raw) = base64url(HMAC-SHA512(key, raw))`. The key is loaded once at
//! startup; a leaked table of hashes is useless for forging cookies without
//! it. Rotating the key invalidates every outstanding remember token.

use core::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use hmac::{Hmac, Mac, digest::InvalidLength};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;

use lens_core::{RememberToken, RememberTokenHash};

type HmacSha512 = Hmac<Sha512>;

/// Deterministic, keyed hasher for remember tokens.
///
/// Cloning is cheap: the keyed MAC state is computed once and copied for each
/// hash, so no mutable state is shared between concurrent requests.
#[derive(Clone)]
pub struct TokenHasher {
    mac: HmacSha512,
}

impl TokenHasher {
    /// Create a hasher keyed with the server secret.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLength` if the MAC rejects the key.
    pub fn new(key: &SecretString) -> Result<Self, InvalidLength> {
        let mac = HmacSha512::new_from_slice(key.expose_secret().as_bytes())?;
        Ok(Self { mac })
    }

    /// Hash a raw remember token.
    #[must_use]
    pub fn hash(&self, token: &RememberToken) -> RememberTokenHash {
        RememberTokenHash::new(self.hash_str(token.expose()))
    }

    /// Hash an arbitrary string with the server key.
    #[must_use]
    pub fn hash_str(&self, input: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(input.as_bytes());
        URL_SAFE.encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for TokenHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenHasher")
            .field("algorithm", &"HMAC-SHA512")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
