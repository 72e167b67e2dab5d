//! Secure random source.
//!
//! Every byte comes from the operating system CSPRNG via [`OsRng`]. There is
//! no fallback to a user-space generator: if the OS cannot supply entropy the
//! error is surfaced and the caller must stop issuing sessions.

use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use rand::TryRngCore;
use rand::rngs::OsRng;
use thiserror::Error;

use lens_core::RememberToken;

/// Number of random bytes in a remember token (256 bits).
pub const REMEMBER_TOKEN_BYTES: usize = 32;

/// The operating system could not provide random bytes.
#[derive(Debug, Error)]
#[error("os random source unavailable: {0}")]
pub struct RandomSourceError(pub String);

/// Generate `n` cryptographically secure random bytes.
///
/// # Errors
///
/// Returns `RandomSourceError` if the OS entropy source fails.
pub fn bytes(n: usize) -> Result<Vec<u8>, RandomSourceError> {
    let mut buf = vec![0_u8; n];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| RandomSourceError(e.to_string()))?;
    Ok(buf)
}

/// Generate `n` random bytes and encode them as URL-safe base64.
///
/// # Errors
///
/// Returns `RandomSourceError` if the OS entropy source fails.
pub fn string(n: usize) -> Result<String, RandomSourceError> {
    Ok(URL_SAFE.encode(bytes(n)?))
}

/// Mint a new raw remember token.
///
/// # Errors
///
/// Returns `RandomSourceError` if the OS entropy source fails.
pub fn remember_token() -> Result<RememberToken, RandomSourceError> {
    string(REMEMBER_TOKEN_BYTES).map(RememberToken::new)
}
