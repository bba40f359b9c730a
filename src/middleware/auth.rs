//! Bearer token authentication middleware.
//!
//! # Modes
//!
//! - **Disabled**: the allow-list is empty. Every request passes through
//!   untouched, whatever its `Authorization` header says.
//! - **Enabled**: requests must carry `Authorization: Bearer <token>` with a
//!   token that exactly matches an allow-list entry (case-sensitive).
//!   Anything else gets `401 Unauthorized` and never reaches the handler.
//!
//! # Usage
//!
//! ```bash
//! witness --tokens alpha,beta
//! curl -H "Authorization: Bearer alpha" http://localhost:8443/whoami
//! ```
//!
//! Token comparison runs in constant time over every allow-list entry, so
//! response timing does not reveal how close a guess was.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, Request, Response, StatusCode};
use axum::response::IntoResponse;
use subtle::{Choice, ConstantTimeEq};
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::inspect::client_ip;

/// Scheme prefix required in the `Authorization` header, including the space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Outcome of checking a request's credentials against the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The allow-list is empty; authentication is off.
    Disabled,
    /// A listed bearer token was presented.
    Allowed,
    /// A well-formed bearer token was presented but is not listed.
    InvalidToken,
    /// No `Authorization` header, or not of the form `Bearer <token>`.
    MissingOrMalformed,
}

impl AuthOutcome {
    /// Whether the request may proceed to the handler.
    pub fn is_permitted(self) -> bool {
        matches!(self, AuthOutcome::Disabled | AuthOutcome::Allowed)
    }
}

/// Bearer token authentication layer.
///
/// The allow-list is shared read-only between all connections; cloning the
/// layer or its services only bumps a reference count.
#[derive(Clone)]
pub struct BearerAuth {
    tokens: Arc<[String]>,
}

impl BearerAuth {
    /// Create a new bearer auth layer. An empty list disables authentication.
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens: tokens.into(),
        }
    }

    /// Check if authentication is enabled.
    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }
}

impl<S> Layer<S> for BearerAuth {
    type Service = BearerAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuthService {
            inner,
            tokens: self.tokens.clone(),
        }
    }
}

/// Bearer token authentication service wrapper.
#[derive(Clone)]
pub struct BearerAuthService<S> {
    inner: S,
    tokens: Arc<[String]>,
}

impl<S> Service<Request<Body>> for BearerAuthService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let outcome = check_authorization(req.headers(), &self.tokens);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if outcome.is_permitted() {
                if outcome == AuthOutcome::Allowed {
                    debug!("Bearer token authentication successful");
                }
                return inner.call(req).await;
            }

            let reason = match outcome {
                AuthOutcome::InvalidToken => "Invalid bearer token",
                _ => "Missing or malformed Authorization header",
            };
            warn!(
                path = %req.uri().path(),
                client_ip = %client_ip(&req),
                "{reason}"
            );
            Ok(unauthorized_response())
        })
    }
}

/// Decide whether a header set satisfies the allow-list.
pub fn check_authorization(headers: &HeaderMap, tokens: &[String]) -> AuthOutcome {
    if tokens.is_empty() {
        return AuthOutcome::Disabled;
    }

    match extract_bearer_token(headers) {
        Some(token) if is_listed(token, tokens) => AuthOutcome::Allowed,
        Some(_) => AuthOutcome::InvalidToken,
        None => AuthOutcome::MissingOrMalformed,
    }
}

/// Pull `<token>` out of `Authorization: Bearer <token>`.
///
/// The scheme is matched case-sensitively, as is the single space after it.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

/// Constant-time membership test; every entry is compared.
fn is_listed(candidate: &str, tokens: &[String]) -> bool {
    tokens
        .iter()
        .fold(Choice::from(0), |found, token| {
            found | token.as_bytes().ct_eq(candidate.as_bytes())
        })
        .into()
}

/// Build an unauthorized (401) response.
fn unauthorized_response() -> Response<Body> {
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, "Bearer")],
        "Unauthorized",
    )
        .into_response()
}
