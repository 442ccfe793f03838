//! `smoketest config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use smoketest_core::SmokeTestConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Placeholder written in place of secrets.
pub const REDACTED: &str = "***REDACTED***";

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file, reporting any error.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (missing file, parse errors, invalid values).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match SmokeTestConfig::load(config_path).await {
        Ok(config) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            profiles: config.profiles.len(),
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            profiles: 0,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Display the effective configuration (file + env overrides + defaults).
///
/// Client secrets are redacted.
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if the section name is unknown.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let mut config = SmokeTestConfig::load(config_path).await?;
    redact_secrets(&mut config);

    let report = ConfigReport {
        source: config_path.display().to_string(),
        config_toml: render_toml(&config, section.as_deref())?,
        section,
    };

    writer.render(&report)?;

    Ok(())
}

/// Replace every non-empty downstream client secret with [`REDACTED`].
pub fn redact_secrets(config: &mut SmokeTestConfig) {
    for downstream in config.downstream.values_mut() {
        if !downstream.client_secret.is_empty() {
            downstream.client_secret = REDACTED.to_owned();
        }
    }
}

/// Serialize the whole configuration, or a single top-level section, as TOML.
pub fn render_toml(config: &SmokeTestConfig, section: Option<&str>) -> Result<String, CliError> {
    let serialization_error = |e: &dyn std::fmt::Display| format!("(serialization error: {})", e);

    let Some(name) = section else {
        return Ok(toml::to_string_pretty(config).unwrap_or_else(|e| serialization_error(&e)));
    };

    let value = match toml::Value::try_from(config) {
        Ok(value) => value,
        Err(e) => return Ok(serialization_error(&e)),
    };
    let Some(table) = value.as_table() else {
        return Ok(serialization_error(&"configuration is not a table"));
    };
    let Some(value) = table.get(name) else {
        let known: Vec<_> = table.keys().map(String::as_str).collect();
        return Err(CliError::Command(format!(
            "unknown section: {} (expected: {})",
            name,
            known.join(", ")
        )));
    };

    let mut selected = toml::Table::new();
    selected.insert(name.to_owned(), value.clone());
    Ok(toml::to_string_pretty(&selected).unwrap_or_else(|e| serialization_error(&e)))
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration (with redacted secrets)
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Number of test profiles (0 if invalid)
    pub profiles: usize,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
            writeln!(w, "  Profiles: {}", self.profiles)?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
