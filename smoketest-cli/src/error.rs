//! CLI-specific error types and exit code mapping

use smoketest_core::SmokeTestError;
use smoketest_engine::EngineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The test run finished with FAIL.
    #[error("test failed: {0}")]
    TestFailed(String),

    /// The run was interrupted before a result was reported.
    #[error("test run interrupted")]
    Interrupted,

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from smoketest-core.
    #[error("{0}")]
    Core(#[from] SmokeTestError),

    /// Engine construction error.
    #[error("{0}")]
    Engine(#[from] EngineError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                      |
    /// |------|------------------------------|
    /// | 0    | Success                      |
    /// | 1    | General / command error      |
    /// | 2    | Configuration error          |
    /// | 5    | Test run finished with FAIL  |
    /// | 10   | IO error                     |
    /// | 130  | Interrupted                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(SmokeTestError::Config(_)) => 2,
            Self::TestFailed(_) => 5,
            Self::Io(_) | Self::Core(SmokeTestError::Io(_)) => 10,
            Self::Interrupted => 130,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Engine(_) => 1,
        }
    }
}
