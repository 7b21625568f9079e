//! Storefront backend.
//!
//! ```text
//!     Client ──▶ request id ─▶ trace ─▶ timeout ─▶ headers ─▶ body limit
//!                                                               │
//!                                          write gate (mutating /api/ calls)
//!                                                               │
//!           ┌──────────────────┬──────────────────┬─────────────┴────┐
//!           ▼                  ▼                  ▼                  ▼
//!       catalog            admin pages         media proxy       static files
//!    (JSON documents)   (full/strict gate)   (remote host)       (ServeDir)
//! ```
//!
//! Configuration comes from the TOML file named by the first argument or
//! `STOREFRONT_CONFIG`, then deployment environment variables.

use std::path::PathBuf;

use tokio::net::TcpListener;

use storefront::config::{load_config, schema::PLACEHOLDER_PASSWORD};
use storefront::lifecycle::{wait_for_shutdown_signal, Shutdown};
use storefront::observability::{logging, metrics};
use storefront::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("STOREFRONT_CONFIG").map(PathBuf::from));

    let config = load_config(config_path.as_deref())?;
    logging::init(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "storefront starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        data_dir = %config.storage.data_dir.display(),
        static_dir = %config.storage.static_dir.display(),
        media_enabled = config.media.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.admin.password == PLACEHOLDER_PASSWORD {
        tracing::warn!("Admin password is the placeholder; set ADMIN_PASS before exposing this server");
    }

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

    let shutdown = Shutdown::new();
    let stopped = shutdown.subscribe();
    let mut serving = tokio::spawn(server.run(listener, stopped));

    tokio::select! {
        result = &mut serving => {
            result??;
            return Ok(());
        }
        _ = wait_for_shutdown_signal() => shutdown.trigger(),
    }
    serving.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
