//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Sign-up, login, remember-token resolution, and logout

pub mod auth;
