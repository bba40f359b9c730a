use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use witness::{Config, Server, build_router, utils};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Witness v{}", env!("CARGO_PKG_VERSION"));

    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the application, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    // Load configuration
    let config = Config::load().map_err(|e| {
        error!("{e}");
        exitcode::CONFIG
    })?;
    info!(
        host = %config.host,
        port = %config.port,
        tls = config.tls_enabled(),
        auth = config.auth_enabled(),
        "Configuration loaded"
    );

    let app = build_router(config.bearer_tokens(), config.cors_methods());
    let server = Server::new(config.server_config(), app);

    // Cancel the server on Ctrl+C or SIGTERM
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        utils::shutdown_signal().await;
        trigger.cancel();
    });

    let scheme = if config.tls_enabled() { "https" } else { "http" };
    let handle = server.handle();
    tokio::spawn(async move {
        if let Some(addr) = handle.listening().await {
            info!("Server listening on {scheme}://{addr}");
            info!("Endpoints:");
            info!("  /echo     - Echo the request body");
            info!("  /ip       - Client IP address");
            info!("  /health   - Health check");
            info!("  /headers  - Request headers as JSON");
            info!("  /whoami   - IP, TLS and headers as JSON");
        }
    });

    server.run(shutdown).await.map_err(|e| {
        error!("Server error: {e}");
        e.exit_code()
    })?;

    info!("Server shutdown complete");
    Ok(())
}
