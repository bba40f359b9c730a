//! Body echo endpoint.

use axum::extract::Request;
use axum::http::header::CONTENT_LENGTH;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Echo the request body back unchanged.
///
/// The whole body is buffered before the response is built, so a body that
/// fails mid-read yields a 500 and never a partial echo. There is no size
/// cap: this is a diagnostic tool and limiting what it reflects would hide
/// exactly what a caller is trying to see.
pub async fn echo(request: Request) -> AppResult<Response> {
    let body = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| AppError::BodyRead(e.to_string()))?;

    debug!(bytes = body.len(), "Echoing request body");

    Ok(([(CONTENT_LENGTH, body.len().to_string())], body).into_response())
}
