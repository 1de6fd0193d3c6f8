//! Saved browser sessions.
//!
//! A storage-state file holds the cookies and per-origin `localStorage` of a
//! signed-in browser, in the JSON layout Playwright writes:
//!
//! ```json
//! {
//!   "cookies": [{ "name": "logged-in-sig", "value": "...", "domain": ".archive.org",
//!                 "path": "/", "expires": 1767225600, "httpOnly": true,
//!                 "secure": true, "sameSite": "Lax" }],
//!   "origins": [{ "origin": "https://archive.org",
//!                 "localStorage": [{ "name": "k", "value": "v" }] }]
//! }
//! ```
//!
//! Restoring it before the viewer loads lets scenarios run as a signed-in
//! patron.

use crate::error::{BrowserError, Result};
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, CookieSameSite, TimeSinceEpoch};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Cookies and local storage captured from a browser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageState {
    /// Cookies to install before navigation
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
    /// Local storage entries, grouped by origin
    #[serde(default)]
    pub origins: Vec<StoredOrigin>,
}

/// One saved cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie is scoped to
    pub domain: String,
    /// Path the cookie is scoped to
    #[serde(default = "root_path")]
    pub path: String,
    /// Expiry in seconds since the epoch; `-1` marks a session cookie
    #[serde(default = "session_expiry")]
    pub expires: f64,
    /// Hidden from scripts
    #[serde(default)]
    pub http_only: bool,
    /// Sent only over TLS
    #[serde(default)]
    pub secure: bool,
    /// `Strict`, `Lax` or `None`
    #[serde(default)]
    pub same_site: Option<String>,
}

/// Local storage for one origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOrigin {
    /// Scheme, host and port, e.g. `https://archive.org`
    pub origin: String,
    /// Key/value pairs
    #[serde(default)]
    pub local_storage: Vec<StoredEntry>,
}

/// One local storage entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Storage key
    pub name: String,
    /// Storage value
    pub value: String,
}

fn root_path() -> String {
    "/".to_string()
}

fn session_expiry() -> f64 {
    -1.0
}

impl StorageState {
    /// Reads a storage-state file.
    ///
    /// # Errors
    ///
    /// Returns `StorageState` when the file is missing or not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| BrowserError::StorageState {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| BrowserError::StorageState {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Converts the saved cookies to DevTools cookie parameters.
    #[must_use]
    pub fn cookie_params(&self) -> Vec<CookieParam> {
        self.cookies.iter().map(StoredCookie::to_param).collect()
    }

    /// Builds a script that seeds `localStorage` when a document from one of
    /// the saved origins starts loading. `None` when nothing is saved.
    ///
    /// # Errors
    ///
    /// Returns `ScriptExecutionFailed` if the entries cannot be encoded.
    pub fn local_storage_script(&self) -> Result<Option<String>> {
        let origins: Vec<_> = self
            .origins
            .iter()
            .filter(|o| !o.local_storage.is_empty())
            .collect();
        if origins.is_empty() {
            return Ok(None);
        }
        let saved = serde_json::to_string(&origins)
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
        Ok(Some(format!(
            "(() => {{ for (const o of {saved}) {{ if (o.origin === window.location.origin) {{ \
             for (const e of o.localStorage) window.localStorage.setItem(e.name, e.value); }} }} }})()"
        )))
    }
}

impl StoredCookie {
    fn to_param(&self) -> CookieParam {
        let mut param = CookieParam::new(self.name.clone(), self.value.clone());
        param.domain = Some(self.domain.clone());
        param.path = Some(self.path.clone());
        param.secure = Some(self.secure);
        param.http_only = Some(self.http_only);
        if self.expires > 0.0 {
            param.expires = Some(TimeSinceEpoch::new(self.expires));
        }
        param.same_site = match self.same_site.as_deref() {
            Some("Strict") => Some(CookieSameSite::Strict),
            Some("Lax") => Some(CookieSameSite::Lax),
            Some("None") => Some(CookieSameSite::None),
            _ => None,
        };
        param
    }
}
