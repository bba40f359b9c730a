//! Permissive CORS middleware.
//!
//! Every response, including 401s and 404s produced further down the chain,
//! carries:
//!
//! ```text
//! Access-Control-Allow-Origin: *
//! Access-Control-Allow-Methods: <configured methods, ", "-joined>
//! Access-Control-Allow-Headers: Content-Type, Authorization
//! ```
//!
//! Any `OPTIONS` request is treated as a preflight and answered here with an
//! empty 200; it never reaches logging, auth or a handler. Unlike
//! `tower_http::cors`, the headers are sent whether or not the request
//! carried an `Origin`, which is what a diagnostic endpoint wants: the
//! caller sees exactly what a browser would be told.

use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::response::IntoResponse;
use tower::{Layer, Service};
use tracing::debug;

/// Value of `Access-Control-Allow-Origin`.
pub const ALLOW_ORIGIN: &str = "*";

/// Value of `Access-Control-Allow-Headers`.
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// CORS layer advertising a fixed set of methods.
#[derive(Clone)]
pub struct CorsLayer {
    allow_methods: HeaderValue,
}

impl CorsLayer {
    /// Create a CORS layer advertising `methods` in the given order.
    pub fn new<I>(methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        let joined = methods
            .into_iter()
            .map(|m| m.as_str().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        // Method names are HTTP tokens, so they always form a valid header value.
        let allow_methods =
            HeaderValue::from_str(&joined).unwrap_or_else(|_| HeaderValue::from_static("GET"));

        Self { allow_methods }
    }

    /// The `Access-Control-Allow-Methods` value this layer sends.
    pub fn allow_methods(&self) -> &HeaderValue {
        &self.allow_methods
    }
}

impl<S> Layer<S> for CorsLayer {
    type Service = CorsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorsService {
            inner,
            allow_methods: self.allow_methods.clone(),
        }
    }
}

/// CORS service wrapper.
#[derive(Clone)]
pub struct CorsService<S> {
    inner: S,
    allow_methods: HeaderValue,
}

impl<S> Service<Request<Body>> for CorsService<S>
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
        let allow_methods = self.allow_methods.clone();

        if req.method() == Method::OPTIONS {
            debug!(path = %req.uri().path(), "Answering CORS preflight");
            let mut response = StatusCode::OK.into_response();
            apply_cors_headers(response.headers_mut(), allow_methods);
            return Box::pin(async move { Ok(response) });
        }

        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            apply_cors_headers(response.headers_mut(), allow_methods);
            Ok(response)
        })
    }
}

fn apply_cors_headers(headers: &mut HeaderMap, allow_methods: HeaderValue) {
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, allow_methods);
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}
