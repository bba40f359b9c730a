//! Endpoints reporting who the caller appears to be.
//!
//! - `GET /ip` - resolved client IP as plain text
//! - `GET /headers` - request headers as a JSON object
//! - `GET /whoami` - IP, TLS parameters and headers in one JSON object

use axum::extract::Request;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use super::util::json_response;
use crate::error::AppResult;
use crate::inspect::{client_ip, flatten_headers, tls_info};
use crate::models::WhoamiResponse;

/// Report the client IP as `text/plain`.
#[instrument(level = "debug", skip_all)]
pub async fn ip(request: Request) -> Response {
    let ip = client_ip(&request).into_owned();

    (
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (CONTENT_LENGTH, ip.len().to_string()),
        ],
        ip,
    )
        .into_response()
}

/// Report the request headers, repeated values joined with `", "`.
#[instrument(level = "debug", skip_all)]
pub async fn headers(request: Request) -> AppResult<Response> {
    json_response(&flatten_headers(request.headers()))
}

/// Report IP, TLS parameters and headers together.
#[instrument(level = "debug", skip_all)]
pub async fn whoami(request: Request) -> AppResult<Response> {
    let whoami = WhoamiResponse {
        ip: client_ip(&request).into_owned(),
        tls: tls_info(&request),
        headers: flatten_headers(request.headers()),
    };

    json_response(&whoami)
}
