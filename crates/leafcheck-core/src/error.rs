//! Error types for viewer verification.
//!
//! Failures fall into three families: the viewer never reached an observable
//! state in time (`ProbeTimeout`), a captured state broke an invariant
//! (`AssertionViolation`), or a scenario tried to navigate from a position where
//! the action is undefined (`NavigationPreconditionViolation`). Backend and
//! configuration problems are carried alongside so callers deal with one type.

use std::time::Duration;
use thiserror::Error;

/// The main error type for probe, driver and assertion operations.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A required element never became visible, or rendering never quiesced,
    /// within its wait window.
    ///
    /// Not retried: a timeout here means the viewer is broken.
    #[error("timed out after {timeout:?} waiting for {what}")]
    ProbeTimeout {
        /// Description of what was being waited on
        what: String,
        /// The wait window that expired
        timeout: Duration,
    },

    /// A captured state failed an invariant check.
    #[error("{check}: expected {expected}, got {actual}")]
    AssertionViolation {
        /// Name of the invariant that was checked
        check: String,
        /// What the invariant requires
        expected: String,
        /// What was actually observed
        actual: String,
    },

    /// A navigation action was attempted from a position where it is undefined.
    #[error("navigation precondition violated: {0}")]
    NavigationPreconditionViolation(String),

    /// A page state captured before the latest navigation action was used
    /// where a fresh one is required.
    #[error("stale page state: captured at epoch {captured}, session is at epoch {current}")]
    StaleState {
        /// Epoch at which the state was captured
        captured: u64,
        /// Current session epoch
        current: u64,
    },

    /// The automation backend failed for a reason other than a timeout.
    #[error("automation backend error: {0}")]
    Automation(String),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl HarnessError {
    /// Builds an `AssertionViolation` from anything printable.
    pub fn violation(
        check: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::AssertionViolation {
            check: check.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Builds a `ProbeTimeout`.
    pub fn timeout(what: impl Into<String>, timeout: Duration) -> Self {
        Self::ProbeTimeout {
            what: what.into(),
            timeout,
        }
    }

    /// Returns true for `ProbeTimeout`.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ProbeTimeout { .. })
    }

    /// Returns true for `AssertionViolation`.
    #[must_use]
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::AssertionViolation { .. })
    }
}

/// A specialized Result type for verification operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
