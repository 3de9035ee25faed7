//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Panic catcher (JSON 500 instead of a dropped connection)
//! 3. `TraceLayer` (request span with a `request_id` field)
//! 4. Request ID (fills the span field, echoes the header)
//! 5. Session layer (signed cookie, cart storage)

pub mod request_id;
pub mod session;

pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, SessionKeyError, with_sessions};
