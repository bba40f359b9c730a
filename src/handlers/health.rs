//! Liveness endpoint.
//!
//! `GET /health` answers as long as the process can serve requests at all.
//! There are no dependencies to probe, so it never reports degraded.
//!
//! ```json
//! { "status": "ok", "timestamp": "2024-01-15T10:30:00Z" }
//! ```

use axum::response::Response;
use chrono::Utc;
use tracing::instrument;

use super::util::json_response;
use crate::error::AppResult;
use crate::models::HealthResponse;

/// Health check endpoint.
#[instrument(level = "debug")]
pub async fn health() -> AppResult<Response> {
    json_response(&HealthResponse::ok_at(Utc::now()))
}
