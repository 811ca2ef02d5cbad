//! # stackdep - Stack Dependency Reconciler
//!
//! Loads a configuration snapshot, applies stack switches and reports how
//! the registries were reconciled.
//!
//! ## Usage
//!
//! ```bash
//! # Summarize a snapshot
//! stackdep status -s cluster.json
//!
//! # Switch to another stack and back, writing the final state
//! stackdep reconcile -s cluster.json --stack hdp-1.3.json --stack hdp-2.0.json -o out.json
//!
//! # List components by capability
//! stackdep capabilities -s cluster.json -c slaves
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // STACKDEP_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("STACKDEP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let cli = stackdep::cli::Cli::parse();

    let default_filter = if cli.verbose {
        "stackdep=debug,stackdep_core=debug"
    } else {
        "stackdep=info,stackdep_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

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

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = stackdep::cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!("stackdep v{} - stack dependency reconciler", env!("CARGO_PKG_VERSION"));
    println!();
}
