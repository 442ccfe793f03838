//! `smoketest profiles` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use smoketest_core::config::ProfileConfig;

use crate::commands::load_or_default;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `profiles` command.
pub async fn execute(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let config = load_or_default(config_path).await?;
    let report = ProfilesReport::from_profiles(&config.profiles);
    writer.render(&report)?;
    Ok(())
}

/// Configured test profiles.
#[derive(Serialize)]
pub struct ProfilesReport {
    pub profiles: Vec<ProfileSummary>,
}

/// One profile, as listed.
#[derive(Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub timeout_secs: u64,
    pub stages: Vec<String>,
}

impl ProfilesReport {
    pub fn from_profiles(profiles: &[ProfileConfig]) -> Self {
        Self {
            profiles: profiles
                .iter()
                .map(|p| ProfileSummary {
                    name: p.name.clone(),
                    timeout_secs: p.timeout_secs,
                    stages: p.stages.iter().map(|s| s.name.clone()).collect(),
                })
                .collect(),
        }
    }
}

impl Render for ProfilesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{:<16} {:<10} Stages", "Profile", "Timeout")?;
        writeln!(w, "{}", "-".repeat(60))?;
        for profile in &self.profiles {
            writeln!(
                w,
                "{:<16} {:<10} {}",
                profile.name.bold(),
                format!("{}s", profile.timeout_secs),
                profile.stages.join(" -> ")
            )?;
        }
        Ok(())
    }
}
