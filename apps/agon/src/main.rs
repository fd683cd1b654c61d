//! # Agon - Content-Addressed Debate Archive
//!
//! The main binary for the Agon archive.
//!
//! This application provides:
//! - CLI interface for archive operations
//! - HTTP REST API server (axum-based)
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 apps/agon (THE BINARY)               │
//! │                                                      │
//! │  ┌─────────────┐   ┌─────────────┐   ┌────────────┐  │
//! │  │   CLI       │   │   HTTP API  │   │ Authoring  │  │
//! │  │  (clap)     │   │   (axum)    │   │ (records)  │  │
//! │  └──────┬──────┘   └──────┬──────┘   └─────┬──────┘  │
//! │         │                 │                │         │
//! │         └─────────────────┼────────────────┘         │
//! │                           ▼                          │
//! │                   ┌───────────────┐                  │
//! │                   │   agon-core   │                  │
//! │                   │ (THE ARCHIVE) │                  │
//! │                   └───────────────┘                  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! agon serve --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! agon status
//! agon argue --debate 3fa0b21 --author alice --text "..." --kind empirical
//! agon chain 3fa0b21 --depth 10
//! ```

use agon::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — AGON_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("AGON_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agon=info,tower_http=debug".into());

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

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Agon startup banner.
fn print_banner() {
    println!(
        r#"
   █████╗  ██████╗  ██████╗ ███╗   ██╗
  ██╔══██╗██╔════╝ ██╔═══██╗████╗  ██║
  ███████║██║  ███╗██║   ██║██╔██╗ ██║
  ██╔══██║██║   ██║██║   ██║██║╚██╗██║
  ██║  ██║╚██████╔╝╚██████╔╝██║ ╚████║
  ╚═╝  ╚═╝ ╚═════╝  ╚═════╝ ╚═╝  ╚═══╝

  Content-Addressed Debate Archive v{}

  Immutable • Derived • Bounded
"#,
        env!("CARGO_PKG_VERSION")
    );
}
