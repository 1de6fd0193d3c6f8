//! The capability surface consumed from a browser-automation backend.
//!
//! Verification logic never talks to a browser directly. It goes through
//! [`Automation`], so a Chrome DevTools backend, a WebDriver backend or an
//! in-memory simulation are interchangeable.
//!
//! Element handles are lazy: a handle remembers *how* to find the element,
//! and every operation resolves it again against the live document. This
//! matters for a viewer that swaps its page images on every flip.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Script that reads the active location's fragment.
pub const LOCATION_HASH_SCRIPT: &str = "window.location.hash";

/// Script that reads the active location's full address.
pub const LOCATION_HREF_SCRIPT: &str = "window.location.href";

/// Which of the matched elements a locator refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nth {
    /// The first match in DOM order.
    First,
    /// The last match in DOM order.
    Last,
    /// The match at a zero-based index.
    Index(usize),
}

/// One step of a locator: a CSS selector and an optional match selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// CSS selector evaluated inside the previous step's matches
    pub selector: String,
    /// Which matches to keep; `None` keeps all of them
    pub nth: Option<Nth>,
}

/// A scoped chain of CSS selectors.
///
/// Each selector is evaluated inside the matches of the previous one, the
/// same way nested locators work in most automation libraries. A selection
/// applies to the step it was set on, so `container.first().descendant("img")`
/// means every image in the first container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    segments: Vec<Segment>,
}

impl Locator {
    /// Creates a locator from a single CSS selector.
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment {
                selector: selector.into(),
                nth: None,
            }],
        }
    }

    /// Narrows the locator to descendants matching `selector`.
    #[must_use]
    pub fn descendant(&self, selector: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment {
            selector: selector.into(),
            nth: None,
        });
        Self { segments }
    }

    /// Keeps only the first match of the innermost step.
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(Nth::First)
    }

    /// Keeps only the last match of the innermost step.
    #[must_use]
    pub fn last(self) -> Self {
        self.nth(Nth::Last)
    }

    /// Keeps only the selected match of the innermost step.
    #[must_use]
    pub fn nth(mut self, nth: Nth) -> Self {
        if let Some(last) = self.segments.last_mut() {
            last.nth = Some(nth);
        }
        self
    }

    /// The steps, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The selectors, outermost first.
    #[must_use]
    pub fn selectors(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.selector.as_str()).collect()
    }

    /// The innermost selector.
    #[must_use]
    pub fn target(&self) -> &str {
        self.segments.last().map_or("", |s| s.selector.as_str())
    }

    /// The innermost step's selection. `None` means "the first match" for
    /// single-element operations and "every match" for `locate_all`.
    #[must_use]
    pub fn selection(&self) -> Option<Nth> {
        self.segments.last().and_then(|s| s.nth)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            f.write_str(&segment.selector)?;
            match segment.nth {
                Some(Nth::First) => f.write_str(" >> nth=0")?,
                Some(Nth::Last) => f.write_str(" >> nth=-1")?,
                Some(Nth::Index(i)) => write!(f, " >> nth={i}")?,
                None => {}
            }
        }
        Ok(())
    }
}

/// Rendered geometry of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge relative to the viewport
    pub x: f64,
    /// Top edge relative to the viewport
    pub y: f64,
    /// Rendered width
    pub width: f64,
    /// Rendered height
    pub height: f64,
}

impl BoundingBox {
    /// Creates a box anchored at the origin.
    #[must_use]
    pub const fn sized(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }
}

/// Browser-driving primitives the verification core depends on.
///
/// Implementations must be usable from one task at a time per page; the core
/// never issues concurrent operations against the same instance.
#[async_trait]
pub trait Automation: Send + Sync {
    /// A lazily resolved element handle.
    type Element: Send + Sync + fmt::Debug;

    /// Loads `url` and waits for the initial document.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Returns a handle for the element described by `locator`.
    async fn locate(&self, locator: &Locator) -> Result<Self::Element>;

    /// Returns handles for every element currently matching `locator`, in DOM order.
    async fn locate_all(&self, locator: &Locator) -> Result<Vec<Self::Element>>;

    /// Clicks the element.
    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Waits until the element is rendered and visible.
    ///
    /// # Errors
    ///
    /// Returns `ProbeTimeout` when the element is not visible within `timeout`.
    async fn wait_for_visible(&self, element: &Self::Element, timeout: Duration) -> Result<()>;

    /// Evaluates a script in the page and returns its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Waits until no network activity has been observed for a short window.
    ///
    /// # Errors
    ///
    /// Returns `ProbeTimeout` when the page does not quiesce within `timeout`.
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()>;

    /// Returns the rendered geometry, or `None` when the element is not rendered.
    async fn bounding_box(&self, element: &Self::Element) -> Result<Option<BoundingBox>>;

    /// Reads an attribute of the element.
    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Releases the page behind this backend. Called once a session is done.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
