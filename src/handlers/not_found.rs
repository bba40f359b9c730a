use axum::http::StatusCode;

/// Catch-all for unmatched paths: 404 with an empty body.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
