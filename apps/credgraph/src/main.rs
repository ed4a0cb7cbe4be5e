//! # credgraph
//!
//! Command-line entry point.
//!
//! ## Usage
//!
//! ```bash
//! # Validate a project file and create its directory
//! credgraph project --config credgraph.toml
//!
//! # Merge graph artifacts
//! credgraph merge -o merged.json github.json discourse.bin
//!
//! # Top contributors under a prefix
//! credgraph filter --cred cred.json -p sourcecred/github/USERLIKE --top 20
//!
//! # Drop the source cache
//! credgraph clear cache
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // CREDGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CREDGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "credgraph=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
