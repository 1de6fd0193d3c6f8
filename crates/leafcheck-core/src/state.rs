//! Semantic page state derived from raw probe output.
//!
//! The viewer writes its position either into the URL fragment
//! (`#page/n4/mode/2up`) or into the path (`/details/id/page/n4/mode/2up`),
//! depending on routing configuration. [`UrlLocation::active_form`] picks
//! which one to read: a non-empty fragment is authoritative, otherwise the
//! full address is consulted. Both forms are never checked together.

use crate::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The active location as read from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlLocation {
    /// `location.hash`, including the leading `#` when present
    pub hash: String,
    /// `location.href`
    pub href: String,
}

/// The URL representation that carries navigation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlForm<'a> {
    /// The fragment is non-empty and authoritative.
    Fragment(&'a str),
    /// The fragment is empty; state lives in the address.
    Path(&'a str),
}

impl UrlLocation {
    /// Creates a location from its two raw parts.
    pub fn new(hash: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            href: href.into(),
        }
    }

    /// Returns the representation that carries navigation state.
    #[must_use]
    pub fn active_form(&self) -> UrlForm<'_> {
        if self.hash.is_empty() {
            UrlForm::Path(&self.href)
        } else {
            UrlForm::Fragment(&self.hash)
        }
    }
}

impl fmt::Display for UrlLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hash.is_empty() || self.href.ends_with(&self.hash) {
            f.write_str(&self.href)
        } else {
            write!(f, "{} (hash {})", self.href, self.hash)
        }
    }
}

/// A viewer display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewMode {
    /// One page at a time.
    #[serde(rename = "1up")]
    OneUp,
    /// Two-page spread.
    #[serde(rename = "2up")]
    TwoUp,
    /// Thumbnail grid.
    #[serde(rename = "thumb")]
    Thumb,
}

impl ViewMode {
    /// Every known mode.
    pub const ALL: [ViewMode; 3] = [ViewMode::OneUp, ViewMode::TwoUp, ViewMode::Thumb];

    /// The tag the viewer writes into the URL.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            ViewMode::OneUp => "1up",
            ViewMode::TwoUp => "2up",
            ViewMode::Thumb => "thumb",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ViewMode {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        ViewMode::ALL
            .into_iter()
            .find(|m| m.tag() == s)
            .ok_or_else(|| HarnessError::Config(format!("unknown view mode '{s}'")))
    }
}

/// URL substrings whose presence signals navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlMarkers {
    /// Page marker when state lives in the fragment.
    pub page_fragment: String,
    /// Page marker when state lives in the path.
    pub page_path: String,
    /// Prefix of the mode marker; the mode tag is appended.
    pub mode_prefix: String,
}

impl Default for UrlMarkers {
    fn default() -> Self {
        Self {
            page_fragment: "#page/".to_string(),
            page_path: "/page/".to_string(),
            mode_prefix: "/mode/".to_string(),
        }
    }
}

impl UrlMarkers {
    /// True iff the active URL form carries the page marker.
    #[must_use]
    pub fn has_page_param(&self, url: &UrlLocation) -> bool {
        match url.active_form() {
            UrlForm::Fragment(hash) => hash.contains(&self.page_fragment),
            UrlForm::Path(href) => href.contains(&self.page_path),
        }
    }

    /// True iff the active URL form carries the marker for `mode`.
    #[must_use]
    pub fn has_mode_param(&self, url: &UrlLocation, mode: ViewMode) -> bool {
        let marker = self.mode_marker(mode);
        match url.active_form() {
            UrlForm::Fragment(hash) => hash.contains(&marker),
            UrlForm::Path(href) => href.contains(&marker),
        }
    }

    /// The full marker for a mode, e.g. `/mode/2up`.
    #[must_use]
    pub fn mode_marker(&self, mode: ViewMode) -> String {
        format!("{}{}", self.mode_prefix, mode.tag())
    }

    /// Describes every way `url` differs from a freshly opened viewer.
    ///
    /// A clean URL has an empty fragment and an address with neither the
    /// page marker nor any mode marker.
    #[must_use]
    pub fn clean_slate_violations(&self, url: &UrlLocation) -> Vec<String> {
        let mut violations = Vec::new();
        if !url.hash.is_empty() {
            violations.push(format!("fragment is '{}'", url.hash));
        }
        if url.href.contains(&self.page_path) {
            violations.push(format!("address contains '{}'", self.page_path));
        }
        if url.href.contains(&self.mode_prefix) {
            violations.push(format!("address contains '{}'", self.mode_prefix));
        }
        violations
    }

    /// True iff `url` is what a freshly opened viewer shows.
    #[must_use]
    pub fn initial_state_is_clean(&self, url: &UrlLocation) -> bool {
        self.clean_slate_violations(url).is_empty()
    }
}

/// Identifier of a displayed page image, derived from its source reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Derives an identifier from an image `src` attribute.
    pub fn from_src(src: &str) -> Self {
        Self(src.trim().to_string())
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Viewer state captured at one point in time.
///
/// A `PageState` is never mutated after capture. Every navigation action
/// advances the session epoch, and states are only compared when the later
/// one was captured at a strictly greater epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageState {
    epoch: u64,
    location: UrlLocation,
    markers: UrlMarkers,
    has_page_param: bool,
    displayed_image_ids: Vec<ImageId>,
}

impl PageState {
    /// Classifies raw probe output.
    #[must_use]
    pub fn new(
        epoch: u64,
        location: UrlLocation,
        markers: UrlMarkers,
        displayed_image_ids: Vec<ImageId>,
    ) -> Self {
        let has_page_param = markers.has_page_param(&location);
        Self {
            epoch,
            location,
            markers,
            has_page_param,
            displayed_image_ids,
        }
    }

    /// Session epoch at capture time.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The location this state was classified from.
    #[must_use]
    pub fn location(&self) -> &UrlLocation {
        &self.location
    }

    /// Whether the URL carries a page locator.
    #[must_use]
    pub fn has_page_param(&self) -> bool {
        self.has_page_param
    }

    /// Whether the URL carries the marker for `mode`.
    #[must_use]
    pub fn has_mode_param(&self, mode: ViewMode) -> bool {
        self.markers.has_mode_param(&self.location, mode)
    }

    /// Displayed page images in DOM order.
    #[must_use]
    pub fn displayed_image_ids(&self) -> &[ImageId] {
        &self.displayed_image_ids
    }

    /// The left and right leaves of the displayed spread.
    ///
    /// # Errors
    ///
    /// Returns `AssertionViolation` when fewer than two images are displayed.
    pub fn spread(&self) -> Result<(&ImageId, &ImageId)> {
        match self.displayed_image_ids.as_slice() {
            [first, .., last] => Ok((first, last)),
            other => Err(HarnessError::violation(
                "two-page spread displayed",
                "at least 2 page images",
                format!("{} image(s)", other.len()),
            )),
        }
    }

    /// Checks that `self` was captured after `before`.
    ///
    /// # Errors
    ///
    /// Returns `StaleState` when `self` is not from a later epoch.
    pub fn ensure_after(&self, before: &PageState) -> Result<()> {
        if self.epoch > before.epoch {
            Ok(())
        } else {
            Err(HarnessError::StaleState {
                captured: self.epoch,
                current: before.epoch + 1,
            })
        }
    }
}
