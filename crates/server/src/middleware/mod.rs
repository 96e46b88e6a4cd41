//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (propagate or generate `x-request-id`)
//! 4. Rate limiting on `/api/users` and `/api/auth` (governor)
//!
//! [`RequireAuth`] is an extractor rather than a layer: protected handlers
//! take it as an argument.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{RequireAuth, TOKEN_HEADER};
pub use rate_limit::auth_rate_limiter;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
