//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Smoke test runner for the prison-to-probation update pipeline.
///
/// Use `smoketest <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "smoketest", version, about, long_about = None)]
pub struct Cli {
    /// Path to the smoketest.toml configuration file.
    ///
    /// When the file does not exist, `run` and `profiles` fall back to the
    /// built-in defaults.
    #[arg(short, long, default_value = "smoketest.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a test profile against the configured downstream systems.
    Run(RunArgs),

    /// List configured test profiles.
    Profiles,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Run one test profile, printing each status as it arrives.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Test profile name (e.g. PTPU_T3).
    pub profile: String,
}

// ---- config ----

/// Manage smoketest configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only one section (general, server, metrics, engine, oauth, downstream, profiles).
        section: Option<String>,
    },
}
