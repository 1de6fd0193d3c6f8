//! Browser process lifecycle.
//!
//! One Chrome process serves a whole run. Each scenario gets its own tab
//! from [`ViewerBrowser::open_page`], with the saved session restored before
//! the viewer is loaded.
//!
//! # Resource Safety
//!
//! Dropping a `ViewerBrowser` without calling `close()` still kills the
//! Chrome process through chromiumoxide's own Drop, but skips the graceful
//! shutdown.

use crate::error::{BrowserError, Result};
use crate::page::{Page, PageSettings};
use crate::storage::StorageState;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use futures::StreamExt;
use leafcheck_core::config::{BrowserConfig, TimeoutConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Arguments every launch carries.
///
/// `--no-sandbox` is needed in containers without user namespaces. Never
/// point a sandboxless browser at untrusted content.
const BASE_ARGS: [&str; 2] = ["--no-sandbox", "--disable-dev-shm-usage"];

fn launch_config(config: &BrowserConfig) -> Result<ChromeConfig> {
    let mut builder = ChromeConfig::builder();

    if config.headless {
        builder = builder.arg("--headless");
    } else {
        builder = builder.with_head();
    }

    builder = builder.window_size(config.window_width, config.window_height);

    // A fresh profile per launch keeps parallel runs from sharing a
    // ProcessSingleton lock or each other's cookies.
    builder = builder.arg(format!("--user-data-dir={}", profile_dir().display()));

    for arg in BASE_ARGS.iter().map(ToString::to_string).chain(config.args.iter().cloned()) {
        builder = builder.arg(arg);
    }

    if let Some(path) = &config.chrome_path {
        builder = builder.chrome_executable(path.clone());
    }

    builder.build().map_err(|e| BrowserError::LaunchFailed {
        reason: format!("invalid browser configuration: {e}"),
        source: None,
    })
}

fn profile_dir() -> PathBuf {
    std::env::temp_dir().join(format!("leafcheck-profile-{}", uuid::Uuid::new_v4()))
}

/// A running Chrome instance.
pub struct ViewerBrowser {
    inner: Arc<Mutex<Option<Browser>>>,
    settings: PageSettings,
    session: Option<StorageState>,
}

impl ViewerBrowser {
    /// Launches Chrome.
    ///
    /// The storage state, when given, is read once here and restored into
    /// every page opened later.
    ///
    /// # Errors
    ///
    /// Returns `LaunchFailed` if Chrome cannot be started, or `StorageState`
    /// if the saved session cannot be read.
    pub async fn launch(
        config: &BrowserConfig,
        timeouts: &TimeoutConfig,
        storage_state: Option<&std::path::Path>,
    ) -> Result<Self> {
        let session = storage_state.map(StorageState::load).transpose()?;
        debug!(?config, restoring_session = session.is_some(), "launching browser");

        let (browser, mut handler) =
            Browser::launch(launch_config(config)?)
                .await
                .map_err(|e| BrowserError::LaunchFailed {
                    reason: "failed to launch Chrome process".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // chromiumoxide only processes CDP traffic while its handler is polled
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("browser handler error: {}", e);
                }
            }
        });

        info!(headless = config.headless, "browser launched");

        Ok(Self {
            inner: Arc::new(Mutex::new(Some(browser))),
            settings: PageSettings::from(timeouts),
            session,
        })
    }

    /// Opens a blank tab with the saved session restored.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` if the browser has been closed, or an error if
    /// the tab cannot be created or the session cannot be restored.
    pub async fn open_page(&self) -> Result<Page> {
        let guard = self.inner.lock().await;
        let browser = guard.as_ref().ok_or(BrowserError::AlreadyClosed)?;

        let chrome_page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        let page = Page::new(chrome_page, self.settings);
        if let Some(state) = &self.session {
            page.restore(state).await?;
        }
        Ok(page)
    }

    /// Closes the browser.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser fails to close gracefully.
    pub async fn close(self) -> Result<()> {
        let mut guard = self.inner.lock().await;

        if let Some(mut browser) = guard.take() {
            debug!("closing browser");
            browser
                .close()
                .await
                .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
        }

        Ok(())
    }

    /// Returns true once the browser has been closed.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}

impl Drop for ViewerBrowser {
    fn drop(&mut self) {
        if let Ok(guard) = self.inner.try_lock() {
            if guard.is_some() {
                warn!("browser dropped without close(); relying on process kill");
            }
        }
    }
}
