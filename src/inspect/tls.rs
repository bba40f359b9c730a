//! Negotiated TLS parameters of the connection a request arrived on.

use axum::http::Request;
use rustls::ServerConnection;
use serde::Serialize;

/// Protocol version and cipher suite as their IANA wire codes.
///
/// Both fields are `0` on a plaintext connection. Codes are reported raw
/// (`0x0304` is TLS 1.3, `0x1301` is `TLS_AES_128_GCM_SHA256`); mapping them
/// to names is left to the reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TlsInfo {
    pub version: u16,
    pub cipher_suite: u16,
}

impl TlsInfo {
    /// Read the negotiated parameters from a completed rustls handshake.
    pub fn from_connection(conn: &ServerConnection) -> Self {
        Self {
            version: conn.protocol_version().map(u16::from).unwrap_or_default(),
            cipher_suite: conn
                .negotiated_cipher_suite()
                .map(|suite| u16::from(suite.suite()))
                .unwrap_or_default(),
        }
    }
}

/// TLS summary for a request.
///
/// The TLS listener stores a [`TlsInfo`] extension on every request of an
/// encrypted connection; its absence means plaintext.
pub fn tls_info<B>(req: &Request<B>) -> TlsInfo {
    req.extensions()
        .get::<TlsInfo>()
        .copied()
        .unwrap_or_default()
}
