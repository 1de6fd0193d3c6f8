//! Error handling for the leafcheck CLI.
//!
//! Library errors convert into [`CliError`] through `#[from]`, and
//! [`cli_error_to_miette`] turns the final error into a report with a hint
//! where one helps.

use leafcheck_browser::BrowserError;
use leafcheck_core::HarnessError;
use miette::Report;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration, probe or assertion failure from the core
    #[error(transparent)]
    Harness(#[from] HarnessError),

    /// Chrome could not be launched or driven
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// At least one scenario failed
    #[error("{failed} of {total} scenarios failed")]
    ScenariosFailed {
        /// Number of failed scenarios
        failed: usize,
        /// Number of scenarios run
        total: usize,
    },
}

/// A specialized Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Converts a CLI error into a miette report.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Harness(HarnessError::Config(message)) => miette::miette!(
            help = "check leafcheck.toml, LEAFCHECK_* variables and command-line flags",
            "Configuration error: {}",
            message
        ),
        CliError::Browser(e @ BrowserError::LaunchFailed { .. }) => miette::miette!(
            help = "install Chrome or Chromium, or set browser.chrome_path",
            "{}",
            e
        ),
        CliError::Browser(e @ BrowserError::StorageState { .. }) => miette::miette!(
            help = "record a fresh session file or drop --storage-state",
            "{}",
            e
        ),
        other => miette::miette!("{}", other),
    }
}
