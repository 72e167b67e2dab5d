//! Lens web application library.
//!
//! Authentication core for the Lens photo gallery: password sign-up and
//! login, remember-token sessions, and the HTTP middleware that resolves and
//! gates on the current user. Exposed as a library so the router can be
//! driven end to end in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
