//! HTTP middleware for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, capture errors)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (correlate logs, Sentry events and responses)
//! 4. CORS
//! 5. Body limit (restaurant forms)
//!
//! Callers are identified per handler with the [`RequireUser`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::RequireUser;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
