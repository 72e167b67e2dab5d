//! Domain models for the authentication core.

pub mod identity;
pub mod user;

pub use identity::Identity;
pub use user::{NewUser, User};
