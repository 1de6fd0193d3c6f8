//! # leafcheck-core
//!
//! Verification logic for a paginated book viewer embedded in a web page.
//!
//! The viewer renders page images, flips between spreads with an animated,
//! asynchronous transition, and mirrors its position in the page URL. This
//! crate asserts against a live instance that navigation, URL state and
//! layout containment behave, despite the rendering delays.
//!
//! ## Architecture
//!
//! - **Automation**: the capability trait a browser backend implements
//! - **DocumentProbe**: read-only observation (URL, visibility, images, geometry)
//! - **NavigationDriver**: clicks flip controls and waits for them to settle
//! - **PageState**: the semantic state classified from probe output
//! - **suite**: the verification scenarios, composed from the above
//!
//! Control flows one way: a scenario drives the navigation driver, observes
//! through the probe, and checks the classified state. Only the scenarios
//! hold orchestration logic.
//!
//! ## Example Usage
//!
//! ```ignore
//! use leafcheck_core::{run_scenario, HarnessConfig, Scenario, ViewerSession};
//!
//! let config = HarnessConfig::load(None)?;
//! let mut session = ViewerSession::new(page, &config)?;
//! session.open().await?;
//! let outcome = run_scenario(&mut session, Scenario::NavigationUpdatesUrl).await;
//! assert!(outcome.is_passed(), "{:?}", outcome.message);
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod automation;
pub mod config;
pub mod control;
pub mod driver;
pub mod error;
pub mod probe;
pub mod report;
pub mod session;
pub mod state;
pub mod suite;

pub use automation::{Automation, BoundingBox, Locator, Nth, Segment};
pub use config::HarnessConfig;
pub use control::{Control, LocatorMap, Region};
pub use driver::{NavigationAction, NavigationDriver, Position, SettleStrategy};
pub use error::{HarnessError, Result};
pub use probe::DocumentProbe;
pub use report::{CheckOutcome, Status, SuiteReport};
pub use session::ViewerSession;
pub use state::{ImageId, PageState, UrlForm, UrlLocation, UrlMarkers, ViewMode};
pub use suite::{run_isolated, run_scenario, Scenario};
