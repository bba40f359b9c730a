//! Access logging middleware.
//!
//! Emits one `info` event per request with its method and path, before the
//! request is handed on. The response is returned exactly as produced
//! downstream, so the service reuses the inner future type instead of
//! boxing.

use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};
use tracing::info;

/// Access log layer for the Tower middleware stack.
#[derive(Clone, Copy, Default)]
pub struct AccessLogLayer;

impl AccessLogLayer {
    /// Create a new access log layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for AccessLogLayer {
    type Service = AccessLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessLogService { inner }
    }
}

/// Access log service wrapper.
#[derive(Clone)]
pub struct AccessLogService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for AccessLogService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        info!(method = %req.method(), path = %req.uri().path(), "request");
        self.inner.call(req)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Response, StatusCode};
    use axum::response::IntoResponse;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_response_is_untouched() {
        let downstream = tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, Infallible>(
                (StatusCode::CREATED, [("x-downstream", "1")], "payload").into_response(),
            )
        });

        let response: Response<Body> = AccessLogLayer::new()
            .layer(downstream)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo?x=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-downstream"], "1");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"payload");
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    #[tokio::test]
    async fn test_one_access_line_per_request() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let downstream = tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, Infallible>(StatusCode::OK.into_response())
        });
        AccessLogLayer::new()
            .layer(downstream)
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/whoami?verbose=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let lines = logs.lines();
        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("request"));
        assert!(lines[0].contains("method=PUT"));
        assert!(lines[0].contains("path=/whoami"));
        assert!(!lines[0].contains("verbose"));
    }
}
