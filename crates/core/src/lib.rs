//! Lens Core - Shared domain types.
//!
//! This crate provides the types shared by every Lens component:
//! - `web` - The gallery web application and its authentication core
//! - `integration-tests` - End-to-end tests against the web router
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for user IDs, emails, and remember tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
