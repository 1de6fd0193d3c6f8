//! Navigation commands against the viewer's toolbar.
//!
//! The viewer animates every page flip and swaps its images asynchronously,
//! and it emits no "flip finished" signal. After each click the driver waits
//! according to a [`SettleStrategy`] before anyone may probe again:
//!
//! - `Fixed` sleeps for a configured delay. Under slow rendering the delay
//!   can be too short; raise `timeouts.settle_ms` when that happens.
//! - `Stable` samples the displayed images before the click, then polls
//!   until the spread has changed and two consecutive samples agree, bounded
//!   by a timeout. A flip that never changes the images times out.

use crate::automation::Automation;
use crate::config::{HarnessConfig, SettleKind, TimeoutConfig};
use crate::control::{Control, LocatorMap};
use crate::error::{HarnessError, Result};
use crate::probe::DocumentProbe;
use crate::state::ImageId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// A navigation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationAction {
    /// Flip forward one spread.
    Advance,
    /// Flip back one spread.
    Retreat,
}

impl NavigationAction {
    /// The toolbar control that performs this action.
    #[must_use]
    pub fn control(self) -> Control {
        match self {
            NavigationAction::Advance => Control::FlipNext,
            NavigationAction::Retreat => Control::FlipPrev,
        }
    }
}

impl fmt::Display for NavigationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationAction::Advance => f.write_str("advance"),
            NavigationAction::Retreat => f.write_str("retreat"),
        }
    }
}

/// Where the session is relative to where the viewer opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Position {
    /// Nothing has been advanced since load, or every advance was undone.
    #[default]
    Origin,
    /// Net number of advances since load.
    Advanced(NonZeroUsize),
}

impl Position {
    /// Position after `action`.
    ///
    /// # Errors
    ///
    /// Returns `NavigationPreconditionViolation` for a retreat at the origin,
    /// which the viewer leaves undefined.
    pub fn after(self, action: NavigationAction) -> Result<Self> {
        match (self, action) {
            (Position::Origin, NavigationAction::Advance) => {
                Ok(Position::Advanced(NonZeroUsize::MIN))
            }
            (Position::Advanced(n), NavigationAction::Advance) => {
                Ok(Position::Advanced(n.saturating_add(1)))
            }
            (Position::Origin, NavigationAction::Retreat) => {
                Err(HarnessError::NavigationPreconditionViolation(
                    "retreat requires a prior advance; retreating from the first page is undefined"
                        .to_string(),
                ))
            }
            (Position::Advanced(n), NavigationAction::Retreat) => {
                Ok(NonZeroUsize::new(n.get() - 1).map_or(Position::Origin, Position::Advanced))
            }
        }
    }

    /// Net advances since load.
    #[must_use]
    pub fn depth(self) -> usize {
        match self {
            Position::Origin => 0,
            Position::Advanced(n) => n.get(),
        }
    }
}

/// How to wait for a navigation action to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleStrategy {
    /// Sleep for a fixed delay.
    Fixed(Duration),
    /// Poll displayed images until they leave the pre-click spread and two
    /// consecutive samples agree.
    Stable {
        /// Delay between samples
        poll: Duration,
        /// Give up after this long
        timeout: Duration,
    },
}

impl SettleStrategy {
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        match config.settle.strategy {
            SettleKind::Fixed => SettleStrategy::Fixed(config.timeouts.settle()),
            SettleKind::Stable => SettleStrategy::Stable {
                poll: config.timeouts.poll_interval(),
                timeout: Duration::from_millis(config.settle.stable_timeout_ms),
            },
        }
    }
}

impl Default for SettleStrategy {
    fn default() -> Self {
        SettleStrategy::Fixed(Duration::from_secs(1))
    }
}

/// Issues navigation actions and waits for them to settle.
#[derive(Debug)]
pub struct NavigationDriver<'a, A: Automation> {
    automation: &'a A,
    probe: DocumentProbe<'a, A>,
    locators: &'a LocatorMap,
    settle: SettleStrategy,
}

impl<'a, A: Automation> NavigationDriver<'a, A> {
    pub fn new(
        automation: &'a A,
        locators: &'a LocatorMap,
        timeouts: &'a TimeoutConfig,
        settle: SettleStrategy,
    ) -> Self {
        Self {
            automation,
            probe: DocumentProbe::new(automation, locators, timeouts),
            locators,
            settle,
        }
    }

    /// Clicks the control for `action` once it is visible, then settles.
    ///
    /// Returns nothing: callers must probe again for the new state.
    ///
    /// # Errors
    ///
    /// Returns `ProbeTimeout` if the control never becomes visible or the
    /// stable strategy never converges.
    pub async fn perform(&self, action: NavigationAction) -> Result<()> {
        let baseline = self.click(action).await?;
        self.settle(&baseline).await
    }

    /// Clicks the control for `action` once it is visible, without settling.
    ///
    /// Returns the spread shown before the click, which [`settle`](Self::settle)
    /// needs under the stable strategy. It is empty under `Fixed`.
    ///
    /// # Errors
    ///
    /// Returns `ProbeTimeout` if the control never becomes visible, or the
    /// backend's error if the click fails.
    pub async fn click(&self, action: NavigationAction) -> Result<Vec<ImageId>> {
        let control = action.control();
        self.probe.is_control_visible(control).await?;

        let baseline = match self.settle {
            SettleStrategy::Fixed(_) => Vec::new(),
            SettleStrategy::Stable { .. } => self.probe.displayed_image_ids().await?,
        };

        let element = self.automation.locate(&self.locators.control(control)).await?;
        self.automation.click(&element).await?;
        debug!(%action, "clicked");
        Ok(baseline)
    }

    /// Waits out the flip. `baseline` is the spread shown before the click;
    /// the stable strategy only accepts a spread that differs from it.
    ///
    /// # Errors
    ///
    /// Returns `ProbeTimeout` if the stable strategy never converges.
    pub async fn settle(&self, baseline: &[ImageId]) -> Result<()> {
        match self.settle {
            SettleStrategy::Fixed(delay) => {
                sleep(delay).await;
                Ok(())
            }
            SettleStrategy::Stable { poll, timeout } => {
                let start = Instant::now();
                let mut previous: Option<Vec<ImageId>> = None;
                loop {
                    sleep(poll).await;
                    let current = self.probe.displayed_image_ids().await?;
                    if current != baseline {
                        if previous.as_ref() == Some(&current) {
                            debug!(elapsed = ?start.elapsed(), "images stable");
                            return Ok(());
                        }
                        previous = Some(current);
                    }
                    if start.elapsed() >= timeout {
                        return Err(HarnessError::timeout(
                            "displayed images to change and stabilise",
                            timeout,
                        ));
                    }
                }
            }
        }
    }
}
