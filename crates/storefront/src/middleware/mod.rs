//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (`http_request` span with method, uri, status, latency)
//! 3. Request ID (recorded on the span and the Sentry scope)
//! 4. CORS headers (on every response, errors included)

pub mod cors;
pub mod request_id;

pub use cors::cors_middleware;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
