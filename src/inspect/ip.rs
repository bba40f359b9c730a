//! Client IP resolution from proxy headers and the transport peer address.
//!
//! # Precedence
//!
//! 1. `X-Forwarded-For`: first element of the comma-separated chain, trimmed
//! 2. `X-Real-IP`: returned verbatim
//! 3. The peer address reported by the connection (`ip:port`)
//!
//! A header counts as present whenever it has any bytes; non-ASCII bytes are
//! replaced with U+FFFD rather than skipped.
//!
//! # Spoofing
//!
//! Both headers are client-controlled and trusted as-is. That is the point of
//! a diagnostic endpoint: it reports what the request claims. Nothing here is
//! a validator, and the result is never parsed as an IP address.

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, HeaderValue, Request};

/// Header set by reverse proxies with the chain `client, proxy1, proxy2`.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Single-address header set by nginx-style proxies.
pub const X_REAL_IP: &str = "x-real-ip";

/// Fallback when no header matched and the connection carried no peer address
/// (for example when the router is driven in-process without a socket).
pub const UNKNOWN_IP: &str = "unknown";

/// Where a resolved client IP came from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExtractedIp<'a> {
    /// First element of `X-Forwarded-For`.
    FromXff(Cow<'a, str>),
    /// Value of `X-Real-IP`.
    FromRealIp(Cow<'a, str>),
    /// Neither header present (or both empty).
    NotFound,
}

/// Header bytes as text. Opaque bytes (obs-text) are replaced rather than
/// rejected, so a present header is never mistaken for an absent one.
#[inline]
fn lossy(value: &HeaderValue) -> Cow<'_, str> {
    String::from_utf8_lossy(value.as_bytes())
}

#[inline]
fn first_element(chain: &str) -> &str {
    chain.split(',').next().unwrap_or_default().trim()
}

#[inline]
fn extract_ip_from_headers(headers: &HeaderMap) -> ExtractedIp<'_> {
    if let Some(forwarded) = headers.get(X_FORWARDED_FOR)
        && !forwarded.is_empty()
    {
        let first = match lossy(forwarded) {
            Cow::Borrowed(chain) => Cow::Borrowed(first_element(chain)),
            Cow::Owned(chain) => Cow::Owned(first_element(&chain).to_string()),
        };
        return ExtractedIp::FromXff(first);
    }

    if let Some(real_ip) = headers.get(X_REAL_IP)
        && !real_ip.is_empty()
    {
        return ExtractedIp::FromRealIp(lossy(real_ip));
    }

    ExtractedIp::NotFound
}

/// Resolve the client IP from a header set and an optional peer address.
///
/// Returns `Cow::Borrowed(UNKNOWN_IP)` only when no header matched and
/// `peer` is `None`.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Cow<'static, str> {
    match extract_ip_from_headers(headers) {
        ExtractedIp::FromXff(ip) | ExtractedIp::FromRealIp(ip) => Cow::Owned(ip.into_owned()),
        ExtractedIp::NotFound => match peer {
            Some(addr) => Cow::Owned(addr.to_string()),
            None => Cow::Borrowed(UNKNOWN_IP),
        },
    }
}

/// Resolve the client IP for a request.
///
/// The peer address is read from the [`ConnectInfo`] extension the server
/// attaches to every connection.
#[inline]
pub fn client_ip<B>(req: &Request<B>) -> Cow<'static, str> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    resolve_client_ip(req.headers(), peer)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn peer() -> Option<SocketAddr> {
        Some("198.51.100.7:52814".parse().unwrap())
    }

    #[test]
    fn test_xff_first_element_wins() {
        let req = Request::builder()
            .header("x-forwarded-for", "192.168.1.1, 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_ip(&req), "192.168.1.1");
    }

    #[test]
    fn test_xff_single_address() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.50")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_ip(&req), "203.0.113.50");
    }

    #[test]
    fn test_xff_is_trimmed() {
        let req = Request::builder()
            .header("x-forwarded-for", "  192.168.1.1  , 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_ip(&req), "192.168.1.1");
    }

    #[test]
    fn test_xff_any_chain_length_returns_first() {
        for n in 1..=50 {
            let chain = (0..n)
                .map(|i| format!(" 10.0.{}.{} ", i / 256, i % 256))
                .collect::<Vec<_>>()
                .join(",");
            let mut headers = HeaderMap::new();
            headers.insert(X_FORWARDED_FOR, chain.parse().unwrap());

            assert_eq!(resolve_client_ip(&headers, peer()), "10.0.0.0", "n = {n}");
        }
    }

    #[test]
    fn test_xff_priority_over_real_ip() {
        let req = Request::builder()
            .header("x-forwarded-for", "10.0.0.1")
            .header("x-real-ip", "192.168.1.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_ip(&req), "10.0.0.1");
    }

    #[test]
    fn test_empty_xff_falls_through_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, "".parse().unwrap());
        headers.insert(X_REAL_IP, "192.168.1.1".parse().unwrap());

        assert_eq!(resolve_client_ip(&headers, peer()), "192.168.1.1");
    }

    #[test]
    fn test_real_ip_is_not_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, " 192.168.1.1 ".parse().unwrap());

        assert_eq!(resolve_client_ip(&headers, peer()), " 192.168.1.1 ");
    }

    #[test]
    fn test_real_ip_ipv6() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, "::1".parse().unwrap());

        assert_eq!(resolve_client_ip(&headers, peer()), "::1");
    }

    #[test]
    fn test_empty_real_ip_falls_through_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, "".parse().unwrap());

        assert_eq!(resolve_client_ip(&headers, peer()), "198.51.100.7:52814");
    }

    #[test]
    fn test_peer_address_includes_port() {
        let req = Request::builder()
            .extension(ConnectInfo::<SocketAddr>(
                "127.0.0.1:40000".parse().unwrap(),
            ))
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_ip(&req), "127.0.0.1:40000");
    }

    #[test]
    fn test_unknown_without_peer_is_borrowed() {
        let req = Request::builder().body(Body::empty()).unwrap();

        let ip = client_ip(&req);
        assert_eq!(ip, UNKNOWN_IP);
        assert!(matches!(ip, Cow::Borrowed(_)));
    }

    #[test]
    fn test_xff_with_port_passes_through() {
        let req = Request::builder()
            .header("x-forwarded-for", "192.168.1.1:8080, 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_ip(&req), "192.168.1.1:8080");
    }

    #[test]
    fn test_xff_with_opaque_bytes_still_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_bytes(b"caf\xe9, 10.0.0.1").unwrap(),
        );
        headers.insert(X_REAL_IP, "192.0.2.1".parse().unwrap());

        assert_eq!(resolve_client_ip(&headers, peer()), "caf\u{FFFD}");
    }

    #[test]
    fn test_real_ip_with_opaque_bytes_still_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_bytes(b"\xff10.0.0.9").unwrap());

        assert_eq!(resolve_client_ip(&headers, peer()), "\u{FFFD}10.0.0.9");
    }
}
