//! TLS material loading and the per-connection TLS info acceptor.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use axum_server::accept::{Accept, DefaultAcceptor};
use axum_server::tls_rustls::{RustlsAcceptor, RustlsConfig};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::server::TlsStream;
use tower_http::add_extension::AddExtension;
use tracing::debug;

use crate::inspect::TlsInfo;

/// PEM certificate chain and private key locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(paths: &TlsPaths) -> io::Result<RustlsConfig> {
    ensure_exists(&paths.cert, "Certificate")?;
    ensure_exists(&paths.key, "Private key")?;

    RustlsConfig::from_pem_file(&paths.cert, &paths.key).await
}

fn ensure_exists(path: &Path, what: &str) -> io::Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{what} file not found: {}", path.display()),
        ))
    }
}

/// Rustls acceptor that records each connection's negotiated parameters.
///
/// After the handshake the connection's service is wrapped so every request
/// on it carries a [`TlsInfo`] extension for the handlers to read.
#[derive(Clone)]
pub struct TlsInfoAcceptor {
    inner: RustlsAcceptor<DefaultAcceptor>,
}

impl TlsInfoAcceptor {
    pub fn new(config: RustlsConfig) -> Self {
        Self {
            inner: RustlsAcceptor::new(config),
        }
    }
}

impl<I, S> Accept<I, S> for TlsInfoAcceptor
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    S: Send + 'static,
{
    type Stream = TlsStream<I>;
    type Service = AddExtension<S, TlsInfo>;
    type Future = Pin<Box<dyn Future<Output = io::Result<(Self::Stream, Self::Service)>> + Send>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let acceptor = self.inner.clone();

        Box::pin(async move {
            let (stream, service) = acceptor.accept(stream, service).await?;
            let info = TlsInfo::from_connection(stream.get_ref().1);
            debug!(
                version = info.version,
                cipher_suite = info.cipher_suite,
                "TLS handshake complete"
            );
            Ok((stream, AddExtension::new(service, info)))
        })
    }
}
