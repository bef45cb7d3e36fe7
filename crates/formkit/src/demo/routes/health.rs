//! Health check endpoint.

use axum::Router;
use axum::routing::get;

use crate::demo::AppState;

/// Health check handler. The demo has no backing services, so it is always up.
async fn health_check() -> &'static str {
    "ok"
}

/// Create the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
