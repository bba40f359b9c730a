use std::io;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Request- and startup-scoped error types.
///
/// Handler failures never leak details to the client: every variant that can
/// reach a response maps to a bare status code with an empty body, so a
/// failure can never leave a half-written payload behind.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// `--help` or `--version` was asked for; not a failure.
    #[error("{0}")]
    DisplayRequested(clap::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");

        let status = match &self {
            AppError::BodyRead(_)
            | AppError::Serialization(_)
            | AppError::ConfigError(_)
            | AppError::DisplayRequested(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        status.into_response()
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Server lifecycle errors, surfaced to the process entrypoint.
///
/// `DrainTimeout` is the forced-shutdown outcome: the cancellation signal was
/// honoured, but connections were still open when the grace period ran out
/// and had to be closed.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Cannot resolve listen address {0}")]
    Resolve(String),

    #[error("Failed to load TLS certificate or key: {0}")]
    Tls(#[source] io::Error),

    #[error("Listener failed: {0}")]
    Listener(#[source] io::Error),

    #[error("Connections still open after {0:?} grace period, forced close")]
    DrainTimeout(Duration),
}

impl ServerError {
    /// Map the error onto a BSD sysexits code for the process exit status.
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            ServerError::Resolve(_) => exitcode::UNAVAILABLE,
            ServerError::Tls(_) => exitcode::IOERR,
            ServerError::Listener(e) if e.kind() == io::ErrorKind::AddrInUse => {
                exitcode::UNAVAILABLE
            }
            ServerError::Listener(_) | ServerError::DrainTimeout(_) => exitcode::SOFTWARE,
        }
    }
}
