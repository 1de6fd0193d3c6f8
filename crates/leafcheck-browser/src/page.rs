//! A Chrome tab that answers leafcheck's automation surface.
//!
//! Element handles are locators. Every operation re-resolves them in the
//! live document, which keeps handles valid across the viewer's page flips.

use crate::error::{BrowserError, Result};
use crate::script;
use crate::storage::StorageState;
use crate::wait::{wait_for_result, wait_until_quiet, WaitConfig};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::page::Page as ChromePage;
use leafcheck_core::config::TimeoutConfig;
use leafcheck_core::{Automation, BoundingBox, Locator, Nth};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

/// Timing knobs for a page, taken from the harness timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSettings {
    /// How often polled conditions are re-checked
    pub poll_interval: Duration,
    /// Budget for the initial document to finish loading
    pub load_timeout: Duration,
    /// How long resource loads must stay flat to count as idle
    pub idle_window: Duration,
}

impl From<&TimeoutConfig> for PageSettings {
    fn from(timeouts: &TimeoutConfig) -> Self {
        Self {
            poll_interval: timeouts.poll_interval(),
            load_timeout: timeouts.render_quiescence(),
            idle_window: timeouts.network_idle_window(),
        }
    }
}

/// A handle to element(s) in a [`Page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    locator: Locator,
}

impl ElementHandle {
    /// The locator this handle resolves.
    #[must_use]
    pub fn locator(&self) -> &Locator {
        &self.locator
    }
}

/// A browser tab.
#[derive(Debug)]
pub struct Page {
    inner: ChromePage,
    settings: PageSettings,
}

impl Page {
    pub(crate) fn new(page: ChromePage, settings: PageSettings) -> Self {
        Self {
            inner: page,
            settings,
        }
    }

    /// Installs saved cookies and local storage.
    ///
    /// Must run before the viewer is loaded; local storage is seeded on every
    /// later document from a matching origin.
    ///
    /// # Errors
    ///
    /// Returns an error if DevTools rejects a cookie or the seeding script.
    pub async fn restore(&self, state: &StorageState) -> Result<()> {
        let cookies = state.cookie_params();
        if !cookies.is_empty() {
            debug!(count = cookies.len(), "restoring cookies");
            self.inner.set_cookies(cookies).await?;
        }
        if let Some(source) = state.local_storage_script()? {
            self.inner
                .evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(source))
                .await?;
        }
        Ok(())
    }

    /// Navigates to an absolute URL and waits for the document to complete.
    ///
    /// # Errors
    ///
    /// Returns `NavigationFailed` if the page fails to load, or `WaitTimeout`
    /// if it does not complete in time.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        wait_for_result(
            move || async move {
                let state: String = self.evaluate_as(script::READY_STATE).await?;
                Ok(state == "complete")
            },
            WaitConfig::new(self.settings.load_timeout, self.settings.poll_interval),
            "document ready",
        )
        .await
    }

    /// Evaluates a script and deserializes its result.
    ///
    /// # Errors
    ///
    /// Returns `ScriptExecutionFailed` if the script throws or the value has
    /// the wrong shape.
    pub async fn evaluate_as<T>(&self, script: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))
    }

    async fn evaluate_value(&self, script: &str) -> Result<Value> {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn run_on<T>(&self, element: &ElementHandle, body: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let source = script::with_matches(&element.locator, body)?;
        self.evaluate_as(source.as_str()).await
    }

    async fn is_visible(&self, element: &ElementHandle) -> Result<bool> {
        self.run_on(element, script::VISIBLE).await
    }

    /// Closes the tab.
    ///
    /// # Errors
    ///
    /// Returns an error if DevTools refuses to close the target.
    pub async fn close_tab(&self) -> Result<()> {
        self.inner.clone().close().await?;
        Ok(())
    }
}

#[async_trait]
impl Automation for Page {
    type Element = ElementHandle;

    async fn goto(&self, url: &str) -> leafcheck_core::Result<()> {
        debug!(url, "navigating");
        Ok(self.navigate(url).await?)
    }

    async fn locate(&self, locator: &Locator) -> leafcheck_core::Result<ElementHandle> {
        Ok(ElementHandle {
            locator: locator.clone(),
        })
    }

    async fn locate_all(&self, locator: &Locator) -> leafcheck_core::Result<Vec<ElementHandle>> {
        let all = ElementHandle {
            locator: locator.clone(),
        };
        let count: usize = self.run_on(&all, script::COUNT).await?;
        trace!(%locator, count, "resolved matches");
        Ok((0..count)
            .map(|i| ElementHandle {
                locator: locator.clone().nth(Nth::Index(i)),
            })
            .collect())
    }

    async fn click(&self, element: &ElementHandle) -> leafcheck_core::Result<()> {
        let clicked: bool = self.run_on(element, script::CLICK).await?;
        if clicked {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(element.locator.to_string()).into())
        }
    }

    async fn wait_for_visible(
        &self,
        element: &ElementHandle,
        timeout: Duration,
    ) -> leafcheck_core::Result<()> {
        let description = format!("{} to be visible", element.locator);
        wait_for_result(
            move || self.is_visible(element),
            WaitConfig::new(timeout, self.settings.poll_interval),
            &description,
        )
        .await?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> leafcheck_core::Result<Value> {
        Ok(self.evaluate_value(script).await?)
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> leafcheck_core::Result<()> {
        wait_until_quiet(
            move || self.evaluate_as::<(String, u64)>(script::NETWORK_ACTIVITY),
            |(state, _)| state == "complete",
            self.settings.idle_window,
            WaitConfig::new(timeout, self.settings.poll_interval),
            "network idle",
        )
        .await?;
        Ok(())
    }

    async fn bounding_box(
        &self,
        element: &ElementHandle,
    ) -> leafcheck_core::Result<Option<BoundingBox>> {
        Ok(self.run_on(element, script::BOUNDING_BOX).await?)
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> leafcheck_core::Result<Option<String>> {
        let source = script::attribute(&element.locator, name)?;
        Ok(self.evaluate_as(source.as_str()).await?)
    }

    async fn close(&self) -> leafcheck_core::Result<()> {
        Ok(self.close_tab().await?)
    }
}
