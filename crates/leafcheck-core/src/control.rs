//! Logical names for the viewer's regions and controls, and where to find them.
//!
//! Assertion code only ever names a [`Region`] or a [`Control`]. The
//! [`LocatorMap`] turns that name into a [`Locator`] once per probe call, so
//! raw selectors live in exactly one place and can be overridden from config.

use crate::automation::Locator;
use crate::config::SelectorConfig;
use crate::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A structural region of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    /// The custom element hosting the viewer.
    Theater,
    /// The viewer's outer shell.
    Shell,
    /// The inner container holding the page images.
    Container,
    /// The footer holding the navigation toolbar.
    Footer,
}

impl Region {
    fn default_selector(self) -> &'static str {
        match self {
            Region::Theater => "ia-book-theater",
            Region::Shell => "#BookReader",
            Region::Container => ".BRcontainer",
            Region::Footer => ".BRfooter",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Theater => "theater",
            Region::Shell => "shell",
            Region::Container => "container",
            Region::Footer => "footer",
        };
        f.write_str(name)
    }
}

/// A toolbar control the viewer must render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Control {
    /// Move one page left.
    Retreat,
    /// Move one page right.
    Advance,
    /// Flip forward one spread.
    FlipNext,
    /// Flip back one spread.
    FlipPrev,
    /// Zoom in.
    ZoomIn,
    /// Zoom out.
    ZoomOut,
    /// Switch to single-page mode.
    #[serde(rename = "mode-1up")]
    Mode1Up,
    /// Switch to two-page spread mode.
    #[serde(rename = "mode-2up")]
    Mode2Up,
    /// Switch to thumbnail mode.
    ModeThumb,
    /// Enter fullscreen.
    ModeFull,
    /// Start read-aloud.
    ModeRead,
}

impl Control {
    /// Every control the viewer must render, in toolbar order.
    pub const ALL: [Control; 11] = [
        Control::Retreat,
        Control::Advance,
        Control::FlipNext,
        Control::FlipPrev,
        Control::ZoomIn,
        Control::ZoomOut,
        Control::Mode1Up,
        Control::Mode2Up,
        Control::ModeThumb,
        Control::ModeFull,
        Control::ModeRead,
    ];

    /// Stable kebab-case name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Control::Retreat => "retreat",
            Control::Advance => "advance",
            Control::FlipNext => "flip-next",
            Control::FlipPrev => "flip-prev",
            Control::ZoomIn => "zoom-in",
            Control::ZoomOut => "zoom-out",
            Control::Mode1Up => "mode-1up",
            Control::Mode2Up => "mode-2up",
            Control::ModeThumb => "mode-thumb",
            Control::ModeFull => "mode-full",
            Control::ModeRead => "mode-read",
        }
    }

    fn default_selector(self) -> &'static str {
        match self {
            Control::Retreat => ".BRicon.book_left",
            Control::Advance => ".BRicon.book_right",
            Control::FlipNext => ".BRicon.book_flip_next",
            Control::FlipPrev => ".BRicon.book_flip_prev",
            Control::ZoomIn => ".BRicon.zoom_in",
            Control::ZoomOut => ".BRicon.zoom_out",
            Control::Mode1Up => ".BRicon.onepg",
            Control::Mode2Up => ".BRicon.twopg",
            Control::ModeThumb => ".BRicon.thumb",
            Control::ModeFull => ".BRicon.full",
            Control::ModeRead => ".BRicon.read",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Control {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Control::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| HarnessError::Config(format!("unknown control '{s}'")))
    }
}

/// Resolves logical regions and controls to locators.
///
/// Nesting follows the viewer's DOM: the shell sits in the theater, the
/// container and footer sit in the shell, and every control sits in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorMap {
    regions: HashMap<Region, String>,
    controls: HashMap<Control, String>,
}

impl LocatorMap {
    /// Applies selector overrides on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Config` when an override names a control that does not exist
    /// or sets an empty selector.
    pub fn from_config(config: &SelectorConfig) -> Result<Self> {
        let mut map = Self::default();

        let region_overrides = [
            (Region::Theater, &config.theater),
            (Region::Shell, &config.shell),
            (Region::Container, &config.container),
            (Region::Footer, &config.footer),
        ];
        for (region, selector) in region_overrides {
            if let Some(selector) = selector {
                map.regions.insert(region, non_empty(selector, &region.to_string())?);
            }
        }

        for (name, selector) in &config.controls {
            let control: Control = name.parse()?;
            map.controls.insert(control, non_empty(selector, name)?);
        }

        Ok(map)
    }

    /// Locator for a region.
    #[must_use]
    pub fn region(&self, region: Region) -> Locator {
        let theater = Locator::css(self.regions[&Region::Theater].clone());
        match region {
            Region::Theater => theater,
            Region::Shell => theater.descendant(self.regions[&Region::Shell].clone()),
            Region::Container | Region::Footer => self
                .region(Region::Shell)
                .descendant(self.regions[&region].clone()),
        }
    }

    /// Locator for a control.
    #[must_use]
    pub fn control(&self, control: Control) -> Locator {
        self.region(Region::Footer)
            .descendant(self.controls[&control].clone())
    }

    /// Locator matching every page image inside the first image container.
    #[must_use]
    pub fn page_images(&self) -> Locator {
        self.region(Region::Container).first().descendant("img")
    }
}

impl Default for LocatorMap {
    fn default() -> Self {
        let regions = [Region::Theater, Region::Shell, Region::Container, Region::Footer]
            .into_iter()
            .map(|r| (r, r.default_selector().to_string()))
            .collect();
        let controls = Control::ALL
            .into_iter()
            .map(|c| (c, c.default_selector().to_string()))
            .collect();
        Self { regions, controls }
    }
}

fn non_empty(selector: &str, what: &str) -> Result<String> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Err(HarnessError::Config(format!(
            "selector override for '{what}' is empty"
        )));
    }
    Ok(trimmed.to_string())
}
