//! Inventory service behind a header-gated authorization pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ api route ──▶ Timed ──▶ GatedHandler
//!                                                               │
//!                                            header phase       ▼
//!                                 TokenGuard ─▶ PermissionGuard ─▶ OwnershipGuard
//!                                       │ deny                       │ allow
//!                                       ▼                            ▼
//!     Client Response ◀──────────── Reply ◀──────────── DeferredBody::consume
//!                                                          (body phase)
//! ```
//!
//! Requests are judged on their headers alone. The body is read only once
//! every guard has allowed, and only in the way the chosen strategy asks.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use header_gate::config::{load_config, GateConfig};
use header_gate::gate::MetricsSink;
use header_gate::lifecycle::{bind_listener, load_directory, Shutdown};
use header_gate::observability::logging::init_logging;
use header_gate::observability::metrics::{init_metrics, PrometheusSink, TracingSink};
use header_gate::HttpServer;

#[derive(Parser, Debug)]
#[command(author, version, about = "Header-gated inventory service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    init_logging(&config.observability);
    tracing::info!("header-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        token_header = %config.auth.token_header,
        lookup_timeout_ms = config.auth.lookup_timeout_ms,
        max_body_size = config.body.max_body_size,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let sink: Arc<dyn MetricsSink> = if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                init_metrics(addr);
                Arc::new(PrometheusSink)
            }
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
                Arc::new(TracingSink)
            }
        }
    } else {
        Arc::new(TracingSink)
    };

    let directory = load_directory(&config)?;
    let listener = bind_listener(&config).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, directory, sink)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
