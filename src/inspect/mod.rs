//! Pure request introspection used by the diagnostic handlers.
//!
//! - [`ip`]: client IP from `X-Forwarded-For`, `X-Real-IP` or the peer address
//! - [`headers`]: multi-valued headers flattened to one string per name
//! - [`tls`]: negotiated protocol version and cipher suite, zero on plaintext
//!
//! Nothing in here touches shared state or performs I/O.

pub mod headers;
pub mod ip;
pub mod tls;

pub use headers::{FlatHeaders, flatten_headers};
pub use ip::{UNKNOWN_IP, client_ip, resolve_client_ip};
pub use tls::{TlsInfo, tls_info};
