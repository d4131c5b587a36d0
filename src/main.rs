//! trace-gate
//!
//! Sits in front of an HTTP service and, per endpoint, applies the controls
//! stored in a remote control service: disable, rate limit, and trace.
//!
//! ```text
//!     Client ──▶ TraceLayer ──▶ tracer pipeline ──▶ proxy handler ──▶ Upstream
//!                                 │   │   │
//!                      GET/PUT /control │  POST /logs (background)
//!                                     gate (503 / 429)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use trace_gate::config::load_config;
use trace_gate::observability::{logging, metrics};
use trace_gate::HttpServer;

#[derive(Parser)]
#[command(name = "trace-gate")]
#[command(about = "Per-endpoint gating and request tracing in front of an HTTP service", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!("trace-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        control = %config.remote.base_url,
        cache_ttl_secs = config.cache.ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
