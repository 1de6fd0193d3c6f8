//! # leafcheck-browser
//!
//! Chrome backend for leafcheck, built on chromiumoxide.
//!
//! [`ViewerBrowser`] owns the Chrome process. Each [`Page`] is one tab and
//! implements [`leafcheck_core::Automation`], so a `ViewerSession` can drive
//! a real viewer the same way tests drive the in-memory one.
//!
//! ## Example Usage
//!
//! ```ignore
//! use leafcheck_browser::ViewerBrowser;
//! use leafcheck_core::{HarnessConfig, ViewerSession, run_scenario, Scenario};
//!
//! let config = HarnessConfig::load(None)?;
//! let browser = ViewerBrowser::launch(&config.browser, &config.timeouts, None).await?;
//! let mut session = ViewerSession::new(browser.open_page().await?, &config)?;
//! session.open().await?;
//! let outcome = run_scenario(&mut session, Scenario::ControlsVisible).await;
//! browser.close().await?;
//! ```
//!
//! ## Testing Strategy
//!
//! Unit tests cover script building, waits and session parsing without a
//! browser. Tests that launch Chrome are `#[ignore]`d; run them with
//! `cargo test -p leafcheck-browser -- --ignored`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod error;
pub mod page;
pub mod script;
pub mod storage;
pub mod wait;

pub use browser::ViewerBrowser;
pub use error::{BrowserError, Result};
pub use page::{ElementHandle, Page, PageSettings};
pub use storage::StorageState;
pub use wait::WaitConfig;
