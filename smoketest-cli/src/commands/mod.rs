//! Command handlers -- one module per subcommand

pub mod config;
pub mod profiles;
pub mod run;

use std::path::Path;

use tracing::info;

use smoketest_core::{ConfigError, SmokeTestConfig, SmokeTestError};

use crate::error::CliError;

/// Load the effective configuration for commands that can run without a file.
///
/// A missing file falls back to the built-in defaults (with environment
/// overrides applied). Any other load or validation error is returned.
pub async fn load_or_default(config_path: &Path) -> Result<SmokeTestConfig, CliError> {
    match SmokeTestConfig::load(config_path).await {
        Ok(config) => Ok(config),
        Err(SmokeTestError::Config(ConfigError::FileNotFound { path })) => {
            info!(path = %path, "config file not found, using built-in defaults");
            let mut config = SmokeTestConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}
