//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS (only when `LEADDESK_CORS_ORIGIN` is set)
//! 3. `TraceLayer` (request tracing)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. `RequireAdminAuth` extractor on protected routes

pub mod auth;
pub mod session;

pub use auth::{RequireAdminAuth, clear_current_admin, set_current_admin};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
