//! # xfn - composition function server
//!
//! ## Startup
//!
//! 1. **Logging** - `RUST_LOG` filter, `debug` with `--debug`
//! 2. **Configuration** - `--config` file, otherwise environment
//! 3. **Listener** - address, mutual TLS unless `--insecure`
//! 4. **Serve** - until Ctrl+C
//!
//! Any startup failure exits non-zero with the full error chain.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use xfn::cli::Cli;
use xfn::server;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.debug);

    let config = server::load_config(cli.config.as_deref())?;
    let settings = cli.settings()?;

    info!(
        response_ttl_secs = config.response_ttl.as_secs(),
        status_path = %config.status_path,
        "Starting encryption function"
    );

    server::serve(settings, config, wait_for_shutdown()).await?;

    info!("Encryption function stopped");
    Ok(())
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for shutdown signal (Ctrl+C).
async fn wait_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(err) => error!("Failed to listen for shutdown signal: {}", err),
    }
}
