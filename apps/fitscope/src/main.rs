//! # fitscope - Fit Search Server
//!
//! The main binary for fitscope.
//!
//! This application provides:
//! - HTTP JSON API server (axum-based)
//! - CLI interface for offline queries and ingestion
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │               apps/fitscope (THE BINARY)            │
//! │                                                     │
//! │  ┌─────────────┐    ┌─────────────┐   ┌──────────┐  │
//! │  │   CLI       │    │   HTTP API  │   │ Loaders  │  │
//! │  │  (clap)     │    │   (axum)    │   │ (JSON)   │  │
//! │  └──────┬──────┘    └──────┬──────┘   └────┬─────┘  │
//! │         └──────────────────┼───────────────┘        │
//! │                            ▼                        │
//! │                   ┌────────────────┐                │
//! │                   │ fitscope-core  │                │
//! │                   │  (THE LOGIC)   │                │
//! │                   └────────────────┘                │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! fitscope --catalog catalog.json server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! fitscope status
//! fitscope ingest -f fits.json
//! fitscope search "warp core"
//! fitscope fits --ship 587 --item 2048 --group 55
//! fitscope fit 91234567
//! ```

use clap::Parser;
use fitscope::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // FITSCOPE_LOG_FORMAT=json switches to machine-parseable output.
    let log_format = std::env::var("FITSCOPE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fitscope=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
   __ _ _
  / _(_) |_ ___  ___ ___  _ __   ___
 | |_| | __/ __|/ __/ _ \| '_ \ / _ \
 |  _| | |_\__ \ (_| (_) | |_) |  __/
 |_| |_|\__|___/\___\___/| .__/ \___|
                         |_|
  Fit Search Server v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
