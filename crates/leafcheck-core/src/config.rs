//! Harness configuration.
//!
//! Values are layered with figment, lowest priority first:
//! 1. Built-in defaults
//! 2. `leafcheck.toml` in the working directory, or an explicit file
//! 3. `LEAFCHECK_`-prefixed environment variables, `__` separating sections
//!    (`LEAFCHECK_TIMEOUTS__SETTLE_MS=1500`)
//!
//! Callers with their own overrides (the CLI) merge them onto [`HarnessConfig::figment`]
//! before extracting.
//!
//! The wait budgets default to what the viewer needs on a typical deployment.
//! Nothing relies on the ratio between them.

use crate::error::{HarnessError, Result};
use crate::state::UrlMarkers;
use figment::{
    providers::{Env, Format as _, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "leafcheck.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "LEAFCHECK_";

/// Complete harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Where the viewer lives.
    pub viewer: ViewerConfig,
    /// Wait budgets.
    pub timeouts: TimeoutConfig,
    /// Post-navigation settling.
    pub settle: SettleConfig,
    /// URL markers for page and mode state.
    pub markers: UrlMarkers,
    /// Selector overrides.
    pub selectors: SelectorConfig,
    /// Pre-authenticated session state.
    pub session: SessionConfig,
    /// Browser launch options.
    pub browser: BrowserConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Site root, without trailing slash.
    pub base_url: String,
    /// Path of the book page relative to `base_url`.
    pub book_path: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://archive.org".to_string(),
            book_path: "/details/goodytwoshoes00newyiala".to_string(),
        }
    }
}

/// Wait budgets in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long a control may take to become visible.
    pub control_visible_ms: u64,
    /// How long rendering may take to quiesce.
    pub render_quiescence_ms: u64,
    /// Fixed delay after each navigation action.
    pub settle_ms: u64,
    /// Poll interval for visibility and stability checks.
    pub poll_interval_ms: u64,
    /// Quiet period that counts as network idle.
    pub network_idle_window_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            control_visible_ms: 10_000,
            render_quiescence_ms: 30_000,
            settle_ms: 1_000,
            poll_interval_ms: 100,
            network_idle_window_ms: 500,
        }
    }
}

impl TimeoutConfig {
    #[must_use]
    pub fn control_visible(&self) -> Duration {
        Duration::from_millis(self.control_visible_ms)
    }

    #[must_use]
    pub fn render_quiescence(&self) -> Duration {
        Duration::from_millis(self.render_quiescence_ms)
    }

    #[must_use]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn network_idle_window(&self) -> Duration {
        Duration::from_millis(self.network_idle_window_ms)
    }
}

/// How the driver decides a navigation action has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettleKind {
    /// Sleep for `timeouts.settle_ms`.
    #[default]
    Fixed,
    /// Poll displayed images until two consecutive samples agree.
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    pub strategy: SettleKind,
    /// Upper bound for the `stable` strategy.
    pub stable_timeout_ms: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            strategy: SettleKind::Fixed,
            stable_timeout_ms: 5_000,
        }
    }
}

/// Selector overrides. Unset entries keep the built-in selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub theater: Option<String>,
    pub shell: Option<String>,
    pub container: Option<String>,
    pub footer: Option<String>,
    /// Keyed by control name, e.g. `flip-next`.
    pub controls: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Persisted session-state file written by the login flow.
    pub storage_state: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Chrome executable; auto-detected when unset.
    pub chrome_path: Option<String>,
    /// Extra Chrome arguments.
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            chrome_path: None,
            args: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Builds the layered figment: defaults, config file, environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    ///
    /// # Errors
    ///
    /// Returns `Config` when an explicit config file does not exist.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(HarnessError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extracts and validates a configuration from a figment.
    ///
    /// # Errors
    ///
    /// Returns `Config` for malformed values or failed validation.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| HarnessError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads defaults, config file and environment.
    ///
    /// # Errors
    ///
    /// Returns `Config` when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(&Self::figment(path)?)
    }

    /// Checks values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        let base = self.viewer.base_url.trim();
        if base.is_empty() {
            return Err(HarnessError::Config("viewer.base_url is not set".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(HarnessError::Config(format!(
                "viewer.base_url must be an http(s) URL, got '{base}'"
            )));
        }

        let t = &self.timeouts;
        for (name, value) in [
            ("timeouts.control_visible_ms", t.control_visible_ms),
            ("timeouts.render_quiescence_ms", t.render_quiescence_ms),
            ("timeouts.poll_interval_ms", t.poll_interval_ms),
            ("settle.stable_timeout_ms", self.settle.stable_timeout_ms),
        ] {
            if value == 0 {
                return Err(HarnessError::Config(format!("{name} must be non-zero")));
            }
        }

        if self.markers.page_fragment.is_empty()
            || self.markers.page_path.is_empty()
            || self.markers.mode_prefix.is_empty()
        {
            return Err(HarnessError::Config("URL markers must be non-empty".to_string()));
        }

        Ok(())
    }

    /// Full address of the viewer page.
    #[must_use]
    pub fn viewer_url(&self) -> String {
        let base = self.viewer.base_url.trim_end_matches('/');
        let path = self.viewer.book_path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}
