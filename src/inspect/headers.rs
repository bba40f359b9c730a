//! Flattening of multi-valued request headers.

use std::collections::BTreeMap;

use axum::http::HeaderMap;

/// Separator placed between repeated values of the same header.
pub const VALUE_SEPARATOR: &str = ", ";

/// Single-valued view of a request's headers, keyed by header name.
///
/// Names are whatever the transport produced (hyper lowercases them). A
/// `BTreeMap` keeps the JSON output in a stable order.
pub type FlatHeaders = BTreeMap<String, String>;

/// Collapse every header into one string, joining repeats with `", "` in the
/// order they were received.
///
/// Values that are not valid UTF-8 are converted lossily rather than dropped,
/// so the caller still sees that the header was sent.
pub fn flatten_headers(headers: &HeaderMap) -> FlatHeaders {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()))
                .collect::<Vec<_>>()
                .join(VALUE_SEPARATOR);
            (name.as_str().to_string(), joined)
        })
        .collect()
}
