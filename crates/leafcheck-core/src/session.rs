//! One open viewer, exclusively owned by the scenario using it.
//!
//! Navigation takes `&mut self`, so two actions can never be in flight
//! against the same session. Independent sessions share nothing and may run
//! concurrently.

use crate::automation::Automation;
use crate::config::{HarnessConfig, TimeoutConfig};
use crate::control::LocatorMap;
use crate::driver::{NavigationAction, NavigationDriver, Position, SettleStrategy};
use crate::error::{HarnessError, Result};
use crate::probe::DocumentProbe;
use crate::state::{PageState, UrlMarkers};
use tracing::{debug, info};

/// An open connection to one rendered viewer.
#[derive(Debug)]
pub struct ViewerSession<A: Automation> {
    automation: A,
    url: String,
    locators: LocatorMap,
    timeouts: TimeoutConfig,
    markers: UrlMarkers,
    settle: SettleStrategy,
    position: Position,
    epoch: u64,
}

impl<A: Automation> ViewerSession<A> {
    /// Wraps a backend with the settings from `config`.
    ///
    /// The viewer is not loaded until [`open`](Self::open).
    ///
    /// # Errors
    ///
    /// Returns `Config` when the selector overrides are invalid.
    pub fn new(automation: A, config: &HarnessConfig) -> Result<Self> {
        Ok(Self {
            automation,
            url: config.viewer_url(),
            locators: LocatorMap::from_config(&config.selectors)?,
            timeouts: config.timeouts.clone(),
            markers: config.markers.clone(),
            settle: SettleStrategy::from_config(config),
            position: Position::Origin,
            epoch: 0,
        })
    }

    /// Loads the viewer and resets position tracking.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot load the page.
    pub async fn open(&mut self) -> Result<()> {
        info!(url = %self.url, "opening viewer");
        self.automation.goto(&self.url).await?;
        self.position = Position::Origin;
        self.epoch += 1;
        Ok(())
    }

    /// A probe over this session.
    #[must_use]
    pub fn probe(&self) -> DocumentProbe<'_, A> {
        DocumentProbe::new(&self.automation, &self.locators, &self.timeouts)
    }

    /// Performs a navigation action and waits for it to settle.
    ///
    /// Any state captured before this call is stale afterwards, whether or
    /// not the action succeeded. Once the click has been issued the position
    /// moves, even if settling then fails.
    ///
    /// # Errors
    ///
    /// Returns `NavigationPreconditionViolation` without touching the viewer
    /// when retreating from the origin, or the driver's error otherwise.
    pub async fn perform(&mut self, action: NavigationAction) -> Result<()> {
        let next = self.position.after(action)?;

        self.epoch += 1;
        let driver = NavigationDriver::new(
            &self.automation,
            &self.locators,
            &self.timeouts,
            self.settle,
        );
        let baseline = driver.click(action).await?;
        self.position = next;
        driver.settle(&baseline).await?;

        debug!(%action, depth = next.depth(), epoch = self.epoch, "navigated");
        Ok(())
    }

    /// Captures the current page state.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or images cannot be read.
    pub async fn capture(&self) -> Result<PageState> {
        self.probe().capture(self.epoch, &self.markers).await
    }

    /// Checks that `state` was captured after the latest action.
    ///
    /// # Errors
    ///
    /// Returns `StaleState` otherwise.
    pub fn ensure_fresh(&self, state: &PageState) -> Result<()> {
        if state.epoch() == self.epoch {
            Ok(())
        } else {
            Err(HarnessError::StaleState {
                captured: state.epoch(),
                current: self.epoch,
            })
        }
    }

    /// The viewer URL this session opens.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn markers(&self) -> &UrlMarkers {
        &self.markers
    }

    /// The backend, for operations outside the verification surface.
    #[must_use]
    pub fn automation(&self) -> &A {
        &self.automation
    }
}
