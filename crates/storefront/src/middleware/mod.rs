//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request, log entry and exit)
//! 4. Session layer (tower-sessions visitor session, file-backed)
//! 5. Auth session (resolve the `auth-session` cookie)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    CurrentSession, CurrentUser, OptionalAuth, RequireAuth, auth_session_middleware,
};
pub use request_id::request_id_middleware;
pub use session::{FileSessionStore, Visitor, create_session_layer};
