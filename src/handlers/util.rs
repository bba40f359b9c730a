//! Shared response helpers for handlers.

use axum::http::HeaderValue;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::AppResult;

/// Serialize `value` into a complete `application/json` response.
///
/// The body is fully encoded before a status is chosen, so a serialization
/// failure becomes a clean 500 (through [`crate::AppError`]) instead of a
/// 200 with a truncated payload.
pub fn json_response<T: Serialize + ?Sized>(value: &T) -> AppResult<Response> {
    let body = serde_json::to_vec(value)?;

    Ok((
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response())
}
