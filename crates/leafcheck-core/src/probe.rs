//! Read-only observation of the live viewer.
//!
//! Every method here reads; nothing clicks or navigates. Waits are bounded by
//! the configured budgets and a timeout is reported as `ProbeTimeout` to the
//! caller, never retried.

use crate::automation::{Automation, BoundingBox, LOCATION_HASH_SCRIPT, LOCATION_HREF_SCRIPT};
use crate::config::TimeoutConfig;
use crate::control::{Control, LocatorMap, Region};
use crate::error::{HarnessError, Result};
use crate::state::{ImageId, PageState, UrlLocation, UrlMarkers};
use serde_json::Value;
use tracing::debug;

/// Reads observable state from one viewer instance.
#[derive(Debug)]
pub struct DocumentProbe<'a, A: Automation> {
    automation: &'a A,
    locators: &'a LocatorMap,
    timeouts: &'a TimeoutConfig,
}

impl<'a, A: Automation> DocumentProbe<'a, A> {
    pub fn new(automation: &'a A, locators: &'a LocatorMap, timeouts: &'a TimeoutConfig) -> Self {
        Self {
            automation,
            locators,
            timeouts,
        }
    }

    /// Reads the active location's fragment and full address.
    ///
    /// # Errors
    ///
    /// Returns `Automation` if either script fails or yields a non-string.
    pub async fn current_url(&self) -> Result<UrlLocation> {
        let hash = self.read_string(LOCATION_HASH_SCRIPT).await?;
        let href = self.read_string(LOCATION_HREF_SCRIPT).await?;
        Ok(UrlLocation { hash, href })
    }

    /// Waits for a control to be rendered and visible.
    ///
    /// # Errors
    ///
    /// Returns `ProbeTimeout` when the control is not visible within the
    /// control-visibility budget.
    pub async fn is_control_visible(&self, control: Control) -> Result<()> {
        let locator = self.locators.control(control);
        let element = self.automation.locate(&locator).await?;
        let timeout = self.timeouts.control_visible();

        self.automation
            .wait_for_visible(&element, timeout)
            .await
            .map_err(|e| match e {
                HarnessError::ProbeTimeout { timeout, .. } => HarnessError::timeout(
                    format!("control '{control}' ({locator}) to be visible"),
                    timeout,
                ),
                other => other,
            })?;

        debug!(%control, "control visible");
        Ok(())
    }

    /// Identifiers of every page image in the image container, in DOM order.
    ///
    /// Images without a `src` are skipped; they have not been assigned a page yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the images cannot be enumerated.
    pub async fn displayed_image_ids(&self) -> Result<Vec<ImageId>> {
        let images = self.automation.locate_all(&self.locators.page_images()).await?;

        let mut ids = Vec::with_capacity(images.len());
        for image in &images {
            if let Some(src) = self.automation.attribute(image, "src").await? {
                ids.push(ImageId::from_src(&src));
            }
        }

        debug!(count = ids.len(), "displayed images");
        Ok(ids)
    }

    /// Waits for rendering to quiesce, then measures a region.
    ///
    /// # Errors
    ///
    /// Returns `ProbeTimeout` if the page never quiesces, or
    /// `AssertionViolation` if the region is not rendered at all.
    pub async fn container_bounding_box(&self, region: Region) -> Result<BoundingBox> {
        self.wait_for_render_quiescence().await?;
        self.measure(region).await
    }

    /// Waits for network activity to stop, bounded by the quiescence budget.
    ///
    /// # Errors
    ///
    /// Returns `ProbeTimeout` if the page never quiesces.
    pub async fn wait_for_render_quiescence(&self) -> Result<()> {
        self.automation
            .wait_for_network_idle(self.timeouts.render_quiescence())
            .await
    }

    /// Measures a region without waiting.
    ///
    /// # Errors
    ///
    /// Returns `AssertionViolation` if the region is not rendered.
    pub async fn measure(&self, region: Region) -> Result<BoundingBox> {
        let locator = self.locators.region(region).first();
        let element = self.automation.locate(&locator).await?;
        let bounds = self.automation.bounding_box(&element).await?.ok_or_else(|| {
            HarnessError::violation(
                format!("{region} rendered"),
                "a bounding box",
                format!("nothing rendered for {locator}"),
            )
        })?;

        debug!(%region, width = bounds.width, height = bounds.height, "measured");
        Ok(bounds)
    }

    /// Captures a complete page state tagged with `epoch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or the images cannot be read.
    pub async fn capture(&self, epoch: u64, markers: &UrlMarkers) -> Result<PageState> {
        let location = self.current_url().await?;
        let images = self.displayed_image_ids().await?;
        Ok(PageState::new(epoch, location, markers.clone(), images))
    }

    async fn read_string(&self, script: &str) -> Result<String> {
        match self.automation.evaluate(script).await? {
            Value::String(s) => Ok(s),
            other => Err(HarnessError::Automation(format!(
                "'{script}' returned {other}, expected a string"
            ))),
        }
    }
}
