//! Outcomes handed to a test-reporting sink.

use crate::suite::Scenario;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub scenario: Scenario,
    pub status: Status,
    /// Failure description; `None` when passed.
    pub message: Option<String>,
    pub duration_ms: u64,
}

impl CheckOutcome {
    #[must_use]
    pub fn passed(scenario: Scenario, elapsed: Duration) -> Self {
        Self {
            scenario,
            status: Status::Passed,
            message: None,
            duration_ms: millis(elapsed),
        }
    }

    #[must_use]
    pub fn failed(scenario: Scenario, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            scenario,
            status: Status::Failed,
            message: Some(message.into()),
            duration_ms: millis(elapsed),
        }
    }

    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.status == Status::Passed
    }
}

/// Outcomes of a run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl SuiteReport {
    pub fn push(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_passed()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// True when every scenario passed. An empty report is not a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.outcomes.is_empty() && self.failed() == 0
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
