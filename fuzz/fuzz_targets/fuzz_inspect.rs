//! Fuzz testing for request introspection.
//!
//! Feeds arbitrary header names and values to the pieces that read untrusted
//! request headers:
//!
//! - `resolve_client_ip`: `X-Forwarded-For` / `X-Real-IP` parsing
//! - `flatten_headers`: multi-value joining and lossy UTF-8 conversion
//! - `check_authorization`: `Authorization: Bearer` extraction
//!
//! None of them may panic, and flattening never yields more entries than
//! there are distinct header names.
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! cargo +nightly install cargo-fuzz
//! cargo +nightly fuzz run fuzz_inspect -- -max_total_time=60
//! ```

#![no_main]

use std::net::SocketAddr;

use arbitrary::Arbitrary;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use libfuzzer_sys::fuzz_target;
use witness::inspect::{flatten_headers, resolve_client_ip};
use witness::middleware::check_authorization;

#[derive(Debug, Arbitrary)]
struct Input {
    headers: Vec<(String, Vec<u8>)>,
    forwarded_for: Vec<u8>,
    real_ip: Vec<u8>,
    authorization: Vec<u8>,
    peer: Option<([u8; 4], u16)>,
    tokens: Vec<String>,
}

fn insert(map: &mut HeaderMap, name: &'static str, value: &[u8]) {
    if let Ok(value) = HeaderValue::from_bytes(value) {
        map.append(name, value);
    }
}

fuzz_target!(|input: Input| {
    let mut headers = HeaderMap::new();
    for (name, value) in &input.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(value),
        ) {
            headers.append(name, value);
        }
    }
    insert(&mut headers, "x-forwarded-for", &input.forwarded_for);
    insert(&mut headers, "x-real-ip", &input.real_ip);
    insert(&mut headers, "authorization", &input.authorization);

    let peer = input.peer.map(|(ip, port)| SocketAddr::from((ip, port)));

    let _ = resolve_client_ip(&headers, peer);

    let flat = flatten_headers(&headers);
    assert!(flat.len() <= headers.keys_len());

    let _ = check_authorization(&headers, &input.tokens);
});
