use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::inspect::{FlatHeaders, TlsInfo};

/// Liveness report returned by `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process can answer at all
    pub status: &'static str,
    /// Current UTC time, RFC 3339 with second precision
    pub timestamp: String,
}

impl HealthResponse {
    /// Build an `ok` report stamped with `now`.
    pub fn ok_at(now: DateTime<Utc>) -> Self {
        Self {
            status: "ok",
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Combined identity report returned by `GET /whoami`.
#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    /// Resolved client IP (see [`crate::inspect::ip`])
    pub ip: String,
    /// Negotiated TLS parameters, zero on plaintext
    pub tls: TlsInfo,
    /// Request headers, repeated values joined with `", "`
    pub headers: FlatHeaders,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let now = DateTime::parse_from_rfc3339("2024-01-15T10:30:00.250Z")
            .unwrap()
            .with_timezone(&Utc);

        let json = serde_json::to_string(&HealthResponse::ok_at(now))
            .expect("Serialization should succeed");
        assert_eq!(json, r#"{"status":"ok","timestamp":"2024-01-15T10:30:00Z"}"#);
    }

    #[test]
    fn test_health_timestamp_round_trips_as_rfc3339() {
        let response = HealthResponse::ok_at(Utc::now());
        assert!(DateTime::parse_from_rfc3339(&response.timestamp).is_ok());
    }

    #[test]
    fn test_whoami_response_serialization() {
        let mut headers = FlatHeaders::new();
        headers.insert("accept".to_string(), "*/*".to_string());

        let response = WhoamiResponse {
            ip: "203.0.113.9".to_string(),
            tls: TlsInfo::default(),
            headers,
        };

        let json = serde_json::to_value(&response).expect("Serialization should succeed");
        assert_eq!(json["ip"], "203.0.113.9");
        assert_eq!(json["tls"]["version"], 0);
        assert_eq!(json["tls"]["cipher_suite"], 0);
        assert_eq!(json["headers"]["accept"], "*/*");
    }
}
