//! CLI module
//!
//! Command-line interface definitions and handlers for the triage
//! dispatch engine.
//!
//! # Commands
//!
//! - `run` - Score and dispatch a batch of tickets
//! - `rules` - Inspect the keyword rule catalog (list)
//! - `config` - Configuration utilities (init)
//!
//! # Example
//!
//! ```bash
//! # Dispatch a batch with the default config
//! triage run --input tickets.json
//!
//! # Show the flag catalog
//! triage rules list
//!
//! # Write a starter configuration
//! triage config init
//! ```

pub mod config;
pub mod rules;
pub mod run;

pub use config::handle_config_init;
pub use rules::handle_rules_list;
pub use run::handle_run;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Triage - ticket rank-scoring and dispatch engine
#[derive(Parser, Debug)]
#[command(
    name = "triage",
    version,
    about = "Rule-driven ticket scoring and dispatch engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score and dispatch a batch of tickets
    Run(RunArgs),
    /// Inspect the keyword rule catalog
    #[command(subcommand)]
    Rules(RulesCommands),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "triage.toml")]
    pub config: PathBuf,

    /// Ticket batch input (JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the run report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TRIAGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Treat upstream pipeline stages as having warned
    #[arg(long)]
    pub upstream_warning: bool,
}

#[derive(Subcommand, Debug)]
pub enum RulesCommands {
    /// List the flag slots, their patterns and entry counts
    List(RulesListArgs),
}

#[derive(Args, Debug)]
pub struct RulesListArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "triage.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a starter configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output path for the configuration file
    #[arg(short, long, default_value = "triage.toml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}
