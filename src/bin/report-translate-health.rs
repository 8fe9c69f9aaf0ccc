//! Liveness service for containerised report-translate deployments.
//!
//! Serves `GET /` and `GET /health` until Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Serve the report-translate health endpoints.
#[derive(Parser, Debug)]
#[command(name = "report-translate-health", version)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "REPORT_TRANSLATE_HEALTH_ADDR", default_value = "0.0.0.0:8000")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let listener = TcpListener::bind(&cli.addr)
        .await
        .with_context(|| format!("Failed to bind {}", cli.addr))?;

    report_translate::health::serve(listener, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
    .context("Health service failed")
}
