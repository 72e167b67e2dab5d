//! Cryptographic primitives behind remember tokens.
//!
//! - [`random`] - OS-backed random bytes and freshly minted tokens
//! - [`token_hasher`] - keyed (HMAC-SHA512) fingerprints of raw tokens
//!
//! Password hashing lives in `services::auth::password` and is intentionally
//! a different algorithm; nothing here is suitable for passwords.

pub mod random;
pub mod token_hasher;

pub use random::{REMEMBER_TOKEN_BYTES, RandomSourceError};
pub use token_hasher::TokenHasher;
