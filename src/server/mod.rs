//! Server lifecycle: bind, serve, drain, stop.
//!
//! # States
//!
//! ```text
//! Idle ──run()──▶ Listening ──cancel──▶ Draining ──drained──▶ Stopped (Ok)
//!                    │                     │
//!                    │                     └──grace expired──▶ Stopped (DrainTimeout)
//!                    └──listener error──▶ Stopped (Listener)
//! ```
//!
//! `run` races a fatal listener error against the cancellation token. Once
//! cancelled, the listener stops accepting and in-flight requests get the
//! configured grace period (30 seconds by default) to finish. Whatever is
//! still open after that is closed and the forced shutdown is reported as
//! [`ServerError::DrainTimeout`] rather than swallowed.

mod tls;

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::ServerError;

pub use tls::{TlsInfoAcceptor, TlsPaths, load_tls_config};

/// Default time in-flight requests get to finish after shutdown is requested.
pub const DEFAULT_SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Everything the lifecycle needs besides the router itself.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port`; the host may be a name that still needs resolving
    pub listen_addr: String,
    /// TLS material; `None` serves plaintext HTTP
    pub tls: Option<TlsPaths>,
    /// How long draining may take before connections are force-closed
    pub shutdown_grace_period: Duration,
}

/// Observer for a [`Server`] that has been moved into `run`.
#[derive(Clone)]
pub struct ServerHandle {
    inner: Handle,
}

impl ServerHandle {
    /// Wait until the server is listening and return its bound address.
    ///
    /// Resolves to `None` if the listener failed to bind.
    pub async fn listening(&self) -> Option<SocketAddr> {
        self.inner.listening().await
    }

    /// Number of connections currently open.
    pub fn connection_count(&self) -> usize {
        self.inner.connection_count()
    }
}

/// An HTTP/HTTPS server around a fully composed router.
pub struct Server {
    config: ServerConfig,
    router: Router,
    handle: Handle,
}

impl Server {
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            router,
            handle: Handle::new(),
        }
    }

    /// A handle for observing the server once `run` owns it.
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            inner: self.handle.clone(),
        }
    }

    /// Serve until `shutdown` is cancelled or the listener fails.
    ///
    /// # Errors
    ///
    /// - [`ServerError::Resolve`] if the listen address does not resolve
    /// - [`ServerError::Tls`] if certificate or key cannot be loaded
    /// - [`ServerError::Listener`] on bind failure or a fatal accept error
    /// - [`ServerError::DrainTimeout`] if connections outlived the grace period
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let Self {
            config,
            router,
            handle,
        } = self;

        let addr = resolve(&config.listen_addr).await?;
        let app = router.into_make_service_with_connect_info::<SocketAddr>();

        let serve = async {
            match &config.tls {
                Some(paths) => {
                    let tls_config = load_tls_config(paths).await.map_err(|e| {
                        error!(
                            error = %e,
                            cert_path = %paths.cert.display(),
                            key_path = %paths.key.display(),
                            "Failed to load TLS certificates"
                        );
                        ServerError::Tls(e)
                    })?;
                    info!(address = %addr, "Starting HTTPS server");
                    axum_server::bind(addr)
                        .acceptor(TlsInfoAcceptor::new(tls_config))
                        .handle(handle.clone())
                        .serve(app)
                        .await
                        .map_err(ServerError::Listener)
                }
                None => {
                    info!(address = %addr, "Starting HTTP server");
                    axum_server::bind(addr)
                        .handle(handle.clone())
                        .serve(app)
                        .await
                        .map_err(ServerError::Listener)
                }
            }
        };
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => {
                // The listener only returns on its own when something broke;
                // a deliberate stop always goes through the branch below.
                if let Err(e) = &result {
                    error!(error = %e, "Server stopped unexpectedly");
                }
                return result;
            }
            _ = shutdown.cancelled() => {
                info!(
                    in_flight = handle.connection_count(),
                    grace_secs = config.shutdown_grace_period.as_secs_f64(),
                    "Shutdown requested, draining connections"
                );
            }
        }

        handle.graceful_shutdown(None);

        match tokio::time::timeout(config.shutdown_grace_period, &mut serve).await {
            Ok(result) => {
                if result.is_ok() {
                    info!("All connections drained, server stopped");
                }
                result
            }
            Err(_) => {
                warn!(
                    remaining = handle.connection_count(),
                    "Grace period expired, closing remaining connections"
                );
                handle.shutdown();
                if let Err(e) = serve.await {
                    error!(error = %e, "Listener error during forced shutdown");
                }
                Err(ServerError::DrainTimeout(config.shutdown_grace_period))
            }
        }
    }
}

/// Resolve `host:port` to a single socket address, preferring IPv4.
///
/// `localhost` commonly resolves to `::1` before `127.0.0.1`; binding only
/// the IPv6 loopback would leave `curl 127.0.0.1:<port>` refused.
async fn resolve(listen_addr: &str) -> Result<SocketAddr, ServerError> {
    let addrs = tokio::net::lookup_host(listen_addr)
        .await
        .map_err(|e| ServerError::Resolve(format!("{listen_addr}: {e}")))?;

    prefer_ipv4(addrs).ok_or_else(|| ServerError::Resolve(listen_addr.to_string()))
}

fn prefer_ipv4(addrs: impl IntoIterator<Item = SocketAddr>) -> Option<SocketAddr> {
    let mut first = None;
    for addr in addrs {
        if addr.is_ipv4() {
            return Some(addr);
        }
        first.get_or_insert(addr);
    }
    first
}
