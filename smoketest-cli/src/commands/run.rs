//! `smoketest run` command handler
//!
//! Runs a profile with an in-process engine and prints each status as soon as
//! the engine emits it. Ctrl-C drops the stream, which cancels the run.

use std::io::Write;
use std::path::Path;

use futures::{Stream, StreamExt};
use tracing::{info, warn};

use smoketest_core::types::{TestProgress, TestStatus};

use crate::cli::RunArgs;
use crate::commands::load_or_default;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// # Errors
///
/// - `CliError::TestFailed`: the run finished with FAIL
/// - `CliError::Interrupted`: Ctrl-C before a result was reported
pub async fn execute(
    args: RunArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_or_default(config_path).await?;
    let engine = smoketest_engine::http_engine(&config)?;

    info!(profile = %args.profile, "starting test run");
    let statuses = engine.run(&args.profile);

    tokio::select! {
        result = report_statuses(statuses, writer) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!(profile = %args.profile, "interrupted, cancelling test run");
            Err(CliError::Interrupted)
        }
    }
}

/// Print statuses until the terminal one and map it to the command result.
pub async fn report_statuses<S>(statuses: S, writer: &OutputWriter) -> Result<(), CliError>
where
    S: Stream<Item = TestStatus>,
{
    futures::pin_mut!(statuses);

    while let Some(status) = statuses.next().await {
        writer.render_line(&status)?;
        match status.progress {
            TestProgress::Success => return Ok(()),
            TestProgress::Fail => return Err(CliError::TestFailed(status.description)),
            TestProgress::Incomplete | TestProgress::Complete => {}
        }
    }

    Err(CliError::Command(
        "status stream ended without a test result".to_owned(),
    ))
}

impl Render for TestStatus {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let label = format!("[{}]", self.progress);
        let label = match self.progress {
            TestProgress::Incomplete => label.yellow(),
            TestProgress::Complete => label.cyan(),
            TestProgress::Success => label.green().bold(),
            TestProgress::Fail => label.red().bold(),
        };
        writeln!(w, "{} {}", label, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[tokio::test]
    async fn test_success_stream_is_ok() {
        let writer = OutputWriter::new(OutputFormat::Json);
        let statuses = futures::stream::iter(vec![
            TestStatus::incomplete("stage1 matched"),
            TestStatus::complete("offender matched"),
            TestStatus::success("test complete"),
        ]);

        let result = report_statuses(statuses, &writer).await;

        assert!(result.is_ok(), "SUCCESS should map to Ok: {:?}", result.err());
    }

    #[tokio::test]
    async fn test_fail_stream_maps_to_test_failed() {
        let writer = OutputWriter::new(OutputFormat::Json);
        let statuses = futures::stream::iter(vec![
            TestStatus::incomplete("stage1 matched"),
            TestStatus::fail("stage2 timed out"),
        ]);

        let err = report_statuses(statuses, &writer)
            .await
            .expect_err("FAIL should be an error");

        assert_eq!(err.exit_code(), 5);
        assert!(err.to_string().contains("stage2 timed out"));
    }

    #[tokio::test]
    async fn test_stream_without_result_is_error() {
        let writer = OutputWriter::new(OutputFormat::Json);
        let statuses = futures::stream::iter(vec![TestStatus::incomplete("stage1 matched")]);

        let err = report_statuses(statuses, &writer)
            .await
            .expect_err("missing result should be an error");

        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_status_render_text() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        TestStatus::fail("Unknown test profile PTPU_T9")
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert_eq!(output, "[FAIL] Unknown test profile PTPU_T9\n");
    }
}
