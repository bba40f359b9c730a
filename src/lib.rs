//! # Witness
//!
//! A small HTTP/HTTPS diagnostic server that reflects back what it sees of
//! each request, featuring:
//!
//! - **Reflection**: request body echo, client IP, headers and TLS parameters
//! - **Security**: optional bearer token allow-list, constant-time matching
//! - **Browser access**: permissive CORS with configurable allowed methods
//! - **Operations**: access logging, health endpoint, bounded graceful drain
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │             axum-server (plaintext or rustls)               │
//! │        TlsInfoAcceptor attaches TlsInfo per connection      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (CORS → Access Log → Bearer Auth)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (echo, ip, health, headers, whoami, not_found)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Inspect (client IP, flattened headers, TLS info)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use witness::{Config, Server, build_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let app = build_router(config.bearer_tokens(), config.cors_methods());
//!
//!     let server = Server::new(config.server_config(), app);
//!     server.run(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Security Configuration
//!
//! Require a bearer token:
//! ```bash
//! WITNESS_TOKENS=alpha,beta cargo run
//! ```
//!
//! Serve HTTPS:
//! ```bash
//! cargo run -- --tls-cert cert.pem --tls-key key.pem
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod inspect;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult, ServerError};
pub use inspect::TlsInfo;
pub use routes::build_router;
pub use server::{Server, ServerConfig, ServerHandle};
