//! Polling waits for conditions the DevTools protocol has no event for.
//!
//! Element visibility, document readiness and network quiet are all read by
//! evaluating a script and checking the answer, so every wait here is a poll
//! loop bounded by a timeout.

use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Timeout and poll interval for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Maximum time to wait for the condition.
    pub timeout: Duration,

    /// How often to check if the condition is satisfied.
    pub poll_interval: Duration,
}

impl WaitConfig {
    /// Creates a new wait configuration.
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

/// Polls `condition` until it returns `Ok(true)`.
///
/// Errors from the condition are treated as "not yet": a script run while
/// the viewer swaps its DOM can fail transiently.
///
/// # Errors
///
/// Returns `WaitTimeout` when the condition does not hold within the timeout.
pub async fn wait_for_result<F, Fut>(
    condition: F,
    config: WaitConfig,
    description: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();

    loop {
        if let Ok(true) = condition().await {
            return Ok(());
        }

        if start.elapsed() >= config.timeout {
            return Err(timed_out(description, config));
        }

        sleep(config.poll_interval).await;
    }
}

/// Samples a value until it has not changed for `quiet` and `ready` accepts it.
///
/// Used for network idle: the sample is the count of finished resource loads,
/// and the page is idle once that count stops moving.
///
/// # Errors
///
/// Returns `WaitTimeout` when the value keeps changing for the whole timeout.
pub async fn wait_until_quiet<F, Fut, T>(
    sample: F,
    ready: impl Fn(&T) -> bool,
    quiet: Duration,
    config: WaitConfig,
    description: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    T: PartialEq,
{
    let start = Instant::now();
    let mut last: Option<(T, Instant)> = None;

    loop {
        if let Ok(value) = sample().await {
            last = match last {
                Some((previous, since)) if previous == value => {
                    if ready(&value) && since.elapsed() >= quiet {
                        return Ok(());
                    }
                    Some((value, since))
                }
                _ => Some((value, Instant::now())),
            };
        }

        if start.elapsed() >= config.timeout {
            return Err(timed_out(description, config));
        }

        sleep(config.poll_interval).await;
    }
}

fn timed_out(description: &str, config: WaitConfig) -> BrowserError {
    BrowserError::WaitTimeout {
        condition: description.to_string(),
        timeout: config.timeout,
    }
}
