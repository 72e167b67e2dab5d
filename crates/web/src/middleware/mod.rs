//! HTTP middleware stack for Lens.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request span with `request_id` and `user_id` fields)
//! 3. Request ID (add unique ID to each request)
//! 4. Identity (resolve the remember cookie to an [`Identity`](crate::models::Identity))
//! 5. Access gate (`route_layer` on protected routes only)

pub mod cookie;
pub mod identity;
pub mod request_id;
pub mod require_user;

pub use cookie::{expired_remember_cookie, remember_cookie, remember_cookie_for, set_cookie_header};
pub use identity::identity_middleware;
pub use request_id::request_id_middleware;
pub use require_user::{AuthRejection, LOGIN_PATH, MaybeUser, RequireUser, require_user};
