//! CLI argument definitions for smoketest-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use smoketest_core::SmokeTestConfig;

/// Smoke test service.
///
/// Serves the smoke test run endpoint over HTTP, streaming test progress
/// as server-sent events while probing downstream systems.
#[derive(Parser, Debug)]
#[command(name = "smoketest-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to smoketest.toml configuration file.
    #[arg(short, long, default_value = "smoketest.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the HTTP bind address (e.g. 127.0.0.1:8080).
    #[arg(long)]
    pub bind: Option<String>,

    /// Validate configuration file and exit without starting the service.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut SmokeTestConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if let Some(bind) = &self.bind {
            config.server.bind_addr = bind.clone();
        }
    }
}
