//! Application configuration from command-line flags and environment variables.
//!
//! # Configuration Hierarchy
//!
//! Flags win over environment variables, which win over defaults. A `.env`
//! file in the working directory is loaded into the environment first.
//!
//! # Server
//!
//! - `--host` / `WITNESS_HOST`: bind host (default: `localhost`)
//! - `--port` / `WITNESS_PORT`: bind port (default: `8443`)
//! - `--shutdown-grace-secs` / `WITNESS_SHUTDOWN_GRACE_SECS`: drain budget (default: 30)
//!
//! # TLS
//!
//! - `--tls-cert` / `WITNESS_TLS_CERT`: PEM certificate chain
//! - `--tls-key` / `WITNESS_TLS_KEY`: PEM private key
//!
//! Both or neither: with neither the server speaks plaintext HTTP.
//!
//! # Security
//!
//! - `--tokens` / `WITNESS_TOKENS`: comma-separated bearer tokens; empty disables auth
//! - `--cors-methods` / `WITNESS_CORS_METHODS`: methods advertised to browsers (default: `GET`)

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use axum::http::Method;
use clap::Parser;
use clap::error::ErrorKind;

use crate::error::{AppError, AppResult};
use crate::server::{DEFAULT_SHUTDOWN_GRACE_PERIOD, ServerConfig, TlsPaths};

/// Application configuration.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "witness",
    version,
    about = "HTTP/HTTPS diagnostic echo server",
    long_about = None
)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host to bind to
    #[arg(long, env = "WITNESS_HOST", default_value = "localhost")]
    pub host: String,

    /// Server listen port
    #[arg(long, env = "WITNESS_PORT", default_value_t = 8443)]
    pub port: u16,

    /// Seconds in-flight requests may take to finish after a shutdown signal
    #[arg(long, env = "WITNESS_SHUTDOWN_GRACE_SECS", default_value_t = 30)]
    pub shutdown_grace_secs: u64,

    // =========================================================================
    // TLS Configuration
    // =========================================================================
    /// Path to TLS certificate file (PEM)
    #[arg(long, env = "WITNESS_TLS_CERT", default_value = "")]
    pub tls_cert: String,

    /// Path to TLS key file (PEM)
    #[arg(long, env = "WITNESS_TLS_KEY", default_value = "")]
    pub tls_key: String,

    // =========================================================================
    // Security Configuration
    // =========================================================================
    /// Bearer tokens (comma-separated, none = no auth)
    #[arg(long, env = "WITNESS_TOKENS", default_value = "", hide_env_values = true)]
    pub tokens: String,

    /// Methods listed in Access-Control-Allow-Methods (comma-separated)
    #[arg(long, env = "WITNESS_CORS_METHODS", default_value = "GET")]
    pub cors_methods: String,
}

impl Config {
    /// Load configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if a flag cannot be parsed or the
    /// combination is invalid (e.g. only one of the TLS paths set).
    ///
    /// `--help` and `--version` print to stdout and exit the process with
    /// status 0, as clap does on its own.
    pub fn load() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        match Self::try_parse_from_args(std::env::args_os()) {
            Err(AppError::DisplayRequested(e)) => e.exit(),
            result => result,
        }
    }

    /// Parse and validate configuration from an explicit argument list.
    ///
    /// The first item is the program name, as with `std::env::args_os`.
    pub fn try_parse_from_args<I, T>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let config = Self::try_parse_from(args).map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => AppError::DisplayRequested(e),
            _ => AppError::ConfigError(e.to_string()),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    fn validate(&self) -> AppResult<()> {
        if self.tls_cert.is_empty() != self.tls_key.is_empty() {
            return Err(AppError::ConfigError(
                "--tls-cert and --tls-key must be given together".to_string(),
            ));
        }

        if self.shutdown_grace_secs == 0 {
            return Err(AppError::ConfigError(
                "--shutdown-grace-secs must be greater than 0".to_string(),
            ));
        }

        self.parse_cors_methods()?;

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if bearer token authentication is enabled.
    pub fn auth_enabled(&self) -> bool {
        !self.bearer_tokens().is_empty()
    }

    /// Check if the server will terminate TLS itself.
    pub fn tls_enabled(&self) -> bool {
        self.tls_paths().is_some()
    }

    /// The bearer token allow-list.
    ///
    /// Entries are trimmed and empty entries dropped, so `"a, b,"` yields
    /// `["a", "b"]` and a stray comma can never admit an empty token.
    pub fn bearer_tokens(&self) -> Vec<String> {
        self.tokens
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Methods to advertise in `Access-Control-Allow-Methods`.
    pub fn cors_methods(&self) -> Vec<Method> {
        self.parse_cors_methods().unwrap_or_else(|_| vec![Method::GET])
    }

    fn parse_cors_methods(&self) -> AppResult<Vec<Method>> {
        self.cors_methods
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Method::from_bytes(s.to_ascii_uppercase().as_bytes())
                    .map_err(|e| AppError::ConfigError(format!("Invalid CORS method {s:?}: {e}")))
            })
            .collect()
    }

    /// TLS material, when both paths are configured.
    pub fn tls_paths(&self) -> Option<TlsPaths> {
        if self.tls_cert.is_empty() || self.tls_key.is_empty() {
            return None;
        }
        Some(TlsPaths {
            cert: PathBuf::from(&self.tls_cert),
            key: PathBuf::from(&self.tls_key),
        })
    }

    /// Drain budget after a shutdown signal.
    pub fn shutdown_grace_period(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Settings consumed by the server lifecycle.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            listen_addr: self.server_addr(),
            tls: self.tls_paths(),
            shutdown_grace_period: self.shutdown_grace_period(),
        }
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::load()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8443,
            shutdown_grace_secs: DEFAULT_SHUTDOWN_GRACE_PERIOD.as_secs(),
            tls_cert: String::new(),
            tls_key: String::new(),
            tokens: String::new(),
            cors_methods: "GET".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8443);
        assert!(!config.auth_enabled());
        assert!(!config.tls_enabled());
        assert_eq!(config.shutdown_grace_period(), DEFAULT_SHUTDOWN_GRACE_PERIOD);
        assert_eq!(config.cors_methods(), vec![Method::GET]);
    }

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            host: "192.168.1.1".to_string(),
            port: 8080,
            ..Config::default()
        };

        assert_eq!(config.server_addr(), "192.168.1.1:8080");
    }

    #[test]
    fn test_parse_flags() {
        let config = Config::try_parse_from_args([
            "witness",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--tokens",
            "alpha,beta",
            "--cors-methods",
            "GET, post",
        ])
        .unwrap();

        assert_eq!(config.server_addr(), "0.0.0.0:9000");
        assert_eq!(config.bearer_tokens(), vec!["alpha", "beta"]);
        assert_eq!(config.cors_methods(), vec![Method::GET, Method::POST]);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let result = Config::try_parse_from_args(["witness", "--port", "not-a-port"]);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_help_and_version_are_not_config_errors() {
        for flag in ["--help", "--version"] {
            match Config::try_parse_from_args(["witness", flag]) {
                Err(AppError::DisplayRequested(e)) => assert_eq!(e.exit_code(), 0),
                other => panic!("{flag}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_help_text_is_flag_summary_only() {
        let err = Config::try_parse_from(["witness", "--help"]).unwrap_err();
        let help = err.to_string();

        assert!(help.contains("--tls-cert"));
        assert!(!help.contains("rust,ignore"));
        assert!(!help.contains("# Example"));
    }

    #[test]
    fn test_bearer_tokens_trimmed_and_filtered() {
        let config = Config {
            tokens: " alpha , ,beta,".to_string(),
            ..Config::default()
        };

        assert_eq!(config.bearer_tokens(), vec!["alpha", "beta"]);
        assert!(config.auth_enabled());
    }

    #[test]
    fn test_empty_tokens_disable_auth() {
        let config = Config {
            tokens: " , ".to_string(),
            ..Config::default()
        };

        assert!(config.bearer_tokens().is_empty());
        assert!(!config.auth_enabled());
    }

    #[test]
    fn test_tls_requires_both_paths() {
        let config = Config {
            tls_cert: "cert.pem".to_string(),
            ..Config::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("--tls-key"));
        assert!(!config.tls_enabled());
    }

    #[test]
    fn test_tls_paths_when_both_set() {
        let config = Config {
            tls_cert: "cert.pem".to_string(),
            tls_key: "key.pem".to_string(),
            ..Config::default()
        };

        assert!(config.validate().is_ok());
        let paths = config.tls_paths().unwrap();
        assert_eq!(paths.cert, PathBuf::from("cert.pem"));
        assert_eq!(paths.key, PathBuf::from("key.pem"));
        assert!(config.server_config().tls.is_some());
    }

    #[test]
    fn test_validate_grace_period_zero() {
        let config = Config {
            shutdown_grace_secs: 0,
            ..Config::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("grace"));
    }

    #[test]
    fn test_validate_bad_cors_method() {
        let config = Config {
            cors_methods: "GET,BAD METHOD".to_string(),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }
}
