//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (outermost first)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │      CORS        │ ← 200 for OPTIONS, headers on every response
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │   Access Log     │ ← one line per request
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │   Bearer Auth    │ ← 401 if invalid (no-op with no tokens)
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler
//! ```
//!
//! `Router::layer` wraps each route and the fallback individually, so every
//! path gets its own copy of the same fixed chain.
//!
//! # Routes
//!
//! - `/echo`, `/ip`, `/health`, `/headers`, `/whoami`
//! - anything else → 404 through the same chain

use axum::Router;
use axum::http::Method;
use axum::routing::any;
use tracing::info;

use crate::handlers;
use crate::middleware::{AccessLogLayer, BearerAuth, CorsLayer};

/// Build the application router with all routes and middleware configured.
///
/// # Arguments
///
/// * `tokens` - Bearer token allow-list; empty disables authentication
/// * `cors_methods` - Methods advertised in `Access-Control-Allow-Methods`
///
/// Routes are method-agnostic; `OPTIONS` is answered by the CORS layer
/// before routing ever matters.
pub fn build_router(tokens: Vec<String>, cors_methods: Vec<Method>) -> Router {
    let auth = BearerAuth::new(tokens);
    if auth.is_enabled() {
        info!("Bearer token authentication enabled");
    } else {
        info!("Bearer token authentication disabled (no tokens configured)");
    }

    let cors = CorsLayer::new(cors_methods);

    Router::new()
        .route("/echo", any(handlers::echo))
        .route("/ip", any(handlers::ip))
        .route("/health", any(handlers::health))
        .route("/headers", any(handlers::headers))
        .route("/whoami", any(handlers::whoami))
        .fallback(handlers::not_found)
        // Applied innermost first: the last layer added runs first.
        .layer(auth)
        .layer(AccessLogLayer::new())
        .layer(cors)
}
