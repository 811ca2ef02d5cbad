//! # stackdep CLI Module
//!
//! ## Available Commands
//!
//! - `status` - Summarize a snapshot
//! - `capabilities` - List components by capability
//! - `reconcile` - Reconcile a snapshot, optionally across stack switches
//! - `check` - Report referential problems in a snapshot

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use stackdep_core::StackDepError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// stackdep - Stack Dependency Reconciler
///
/// Keeps service configuration, property and review registries consistent
/// with the components present in the active stack.
#[derive(Parser, Debug)]
#[command(name = "stackdep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration snapshot (JSON)
    #[arg(short = 's', long, global = true, default_value = "cluster.json")]
    pub snapshot: PathBuf,

    /// Path to the TOML configuration file
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize the snapshot
    Status,

    /// List components by capability
    Capabilities {
        /// Show only this capability (e.g. slaves, masters, restartable)
        #[arg(short, long)]
        capability: Option<String>,
    },

    /// Reconcile the snapshot, then switch through each given stack
    Reconcile {
        /// Stack definition to switch to (repeatable, applied in order)
        #[arg(long = "stack")]
        stacks: Vec<PathBuf>,

        /// Write the resulting snapshot to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the snapshot for referential problems
    Check,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), StackDepError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode || config.output.json;
    let options = config.reconciler;

    match cli.command {
        Some(Commands::Status) => cmd_status(&cli.snapshot, options, json_mode),
        Some(Commands::Capabilities { capability }) => {
            cmd_capabilities(&cli.snapshot, capability.as_deref(), json_mode)
        }
        Some(Commands::Reconcile { stacks, output }) => cmd_reconcile(
            &cli.snapshot,
            &stacks,
            output.as_deref(),
            options,
            json_mode,
        )
        .map(|_| ()),
        Some(Commands::Check) => cmd_check(&cli.snapshot, options, json_mode),
        None => {
            // No subcommand - show status by default
            cmd_status(&cli.snapshot, options, json_mode)
        }
    }
}
