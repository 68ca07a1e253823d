//! Transparent HTTP edge proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                  EDGE PROXY                  │
//!                        │                                              │
//!     Client Request     │  ┌────────┐   ┌─────────┐   ┌────────────┐   │
//!     ───────────────────┼─▶│  cors  │──▶│ capture │──▶│ forwarding │───┼──▶ Upstream
//!                        │  └────────┘   └─────────┘   │   engine   │   │
//!                        │   OPTIONS→204               │ (403 retry)│   │
//!     Client Response    │                             └─────┬──────┘   │
//!     ◀──────────────────┼──────── relay / JSON error ◀──────┘          │
//!                        └──────────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from an optional TOML file (`--config`) and the
//! `UPSTREAM` / `PORT` environment variables.

use std::path::PathBuf;

use clap::Parser;

use edge_proxy::config::load_config;
use edge_proxy::lifecycle::startup;
use edge_proxy::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "edge-proxy")]
#[command(about = "Transparent HTTP proxy to a single upstream", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address(),
        "edge-proxy starting"
    );

    startup::run(config).await?;
    Ok(())
}
