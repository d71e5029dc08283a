//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET     /health           - Health check
//! POST    /api/pix/charge   - Create a PIX charge through the gateway
//! OPTIONS /api/pix/charge   - CORS preflight
//! *       /api/pix/charge   - 405
//! ```

pub mod pix;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the main routes router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health)).route(
        "/api/pix/charge",
        post(pix::create_charge)
            .options(pix::preflight)
            .fallback(pix::method_not_allowed),
    )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not call the gateway.
async fn health() -> &'static str {
    "ok"
}
