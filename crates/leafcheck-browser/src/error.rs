//! Error types for the Chrome backend.
//!
//! Variants separate the ways a real browser can let a verification run
//! down: the process never starts, a page cannot load, a wait runs out, a
//! script blows up, or a saved session cannot be restored. Everything folds
//! into [`HarnessError`] at the automation boundary so scenario code sees one
//! error type.

use leafcheck_core::HarnessError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while driving Chrome.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The browser process could not be started.
    ///
    /// Usually Chrome is missing, or the configured executable is not runnable.
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        /// Human-readable reason for the launch failure
        reason: String,
        /// Underlying error, when there is one
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The DevTools connection refused a request.
    #[error("CDP connection failed: {0}")]
    ConnectionFailed(String),

    /// Loading a URL failed.
    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed {
        /// The URL that failed to load
        url: String,
        /// Reason for the navigation failure
        reason: String,
    },

    /// A polled condition did not hold within its budget.
    #[error("wait condition '{condition}' timed out after {timeout:?}")]
    WaitTimeout {
        /// Description of the condition that timed out
        condition: String,
        /// How long we waited before timing out
        timeout: Duration,
    },

    /// A script evaluated in the page threw or returned an unexpected shape.
    #[error("JavaScript execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// No element matched a locator when an operation needed one.
    #[error("no element matches '{0}'")]
    ElementNotFound(String),

    /// A saved storage-state file could not be used.
    #[error("storage state '{path}' is unusable: {reason}")]
    StorageState {
        /// The file that was read
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// An operation was attempted on a closed browser instance.
    #[error("browser instance is already closed")]
    AlreadyClosed,

    /// Wraps errors from the chromiumoxide library.
    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),

    /// File access errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for browser operations.
pub type Result<T> = std::result::Result<T, BrowserError>;

impl From<BrowserError> for HarnessError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::WaitTimeout { condition, timeout } => HarnessError::ProbeTimeout {
                what: condition,
                timeout,
            },
            other => HarnessError::Automation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_timeouts_become_probe_timeouts() {
        let err: HarnessError = BrowserError::WaitTimeout {
            condition: "network idle".to_string(),
            timeout: Duration::from_secs(30),
        }
        .into();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "timed out after 30s waiting for network idle");
    }

    #[test]
    fn other_failures_become_automation_errors() {
        let err: HarnessError = BrowserError::ElementNotFound(".BRfooter".to_string()).into();
        assert!(matches!(err, HarnessError::Automation(ref m) if m.contains(".BRfooter")));
    }
}
