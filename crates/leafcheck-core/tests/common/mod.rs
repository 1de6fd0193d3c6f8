//! An in-memory book viewer that answers the `Automation` surface.
//!
//! It shows a two-page spread, flips by one spread per click and writes its
//! position into the URL like the real viewer. Faults can be switched on to
//! reproduce the regressions the scenarios are meant to catch.

#![allow(dead_code)]

use async_trait::async_trait;
use leafcheck_core::automation::{LOCATION_HASH_SCRIPT, LOCATION_HREF_SCRIPT};
use leafcheck_core::{Automation, BoundingBox, HarnessConfig, HarnessError, Locator, Nth, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const BOOK_URL: &str = "https://example.org/details/goody";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// Both leaves of every spread show the same image.
    DuplicateLeaves,
    /// Flipping back leaves the images untouched.
    StuckOnRetreat,
    /// Flipping back moves by one leaf instead of one spread.
    ShiftsOnRetreat,
    /// Flipping back shows the same image in both leaves.
    DuplicatesOnRetreat,
    /// Returning to the first spread drops the mode from the URL.
    ForgetsModeAtOrigin,
    /// The image container is wider than the shell.
    Overflow,
    /// The viewer opens with a page marker already in the URL.
    DirtyInitialUrl,
    /// Network activity never stops.
    NeverIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlStyle {
    Path,
    Fragment,
}

#[derive(Debug)]
struct ViewerState {
    loaded: bool,
    navigated: bool,
    spread: usize,
    images: [usize; 2],
    pending: Option<(Instant, [usize; 2])>,
}

impl ViewerState {
    fn fresh(loaded: bool) -> Self {
        Self {
            loaded,
            navigated: false,
            spread: 0,
            images: [0, 1],
            pending: None,
        }
    }

    fn shown(&mut self) -> [usize; 2] {
        if let Some((due, images)) = self.pending {
            if Instant::now() >= due {
                self.images = images;
                self.pending = None;
            }
        }
        self.images
    }
}

#[derive(Debug)]
pub struct FakeViewer {
    style: UrlStyle,
    faults: HashSet<Fault>,
    hidden: HashSet<&'static str>,
    flip_delay: Duration,
    state: Mutex<ViewerState>,
    clicks: Mutex<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    target: String,
    nth: Option<Nth>,
}

impl FakeViewer {
    pub fn healthy() -> Self {
        Self {
            style: UrlStyle::Path,
            faults: HashSet::new(),
            hidden: HashSet::new(),
            flip_delay: Duration::ZERO,
            state: Mutex::new(ViewerState::fresh(false)),
            clicks: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.insert(fault);
        self
    }

    pub fn with_url_style(mut self, style: UrlStyle) -> Self {
        self.style = style;
        self
    }

    /// Swaps the images only `delay` after each flip click.
    pub fn with_flip_delay(mut self, delay: Duration) -> Self {
        self.flip_delay = delay;
        self
    }

    /// Hides a control by its selector, e.g. `.BRicon.zoom_in`.
    pub fn hiding(mut self, selector: &'static str) -> Self {
        self.hidden.insert(selector);
        self
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().unwrap().clone()
    }

    fn has(&self, fault: Fault) -> bool {
        self.faults.contains(&fault)
    }

    fn fragment(&self) -> String {
        let state = self.state.lock().unwrap();
        if !state.loaded {
            return String::new();
        }
        if self.style == UrlStyle::Path {
            if self.has(Fault::DirtyInitialUrl) && !state.navigated {
                return "#page/n1".to_string();
            }
            return String::new();
        }
        if !state.navigated {
            return String::new();
        }
        if state.spread == 0 {
            "#view/mode/2up".to_string()
        } else {
            format!("#page/n{}/mode/2up", state.spread * 2)
        }
    }

    fn address(&self) -> String {
        let hash = self.fragment();
        let state = self.state.lock().unwrap();
        match self.style {
            UrlStyle::Fragment => format!("{BOOK_URL}{hash}"),
            UrlStyle::Path if !state.navigated => {
                if self.has(Fault::DirtyInitialUrl) {
                    format!("{BOOK_URL}/page/n1{hash}")
                } else {
                    BOOK_URL.to_string()
                }
            }
            UrlStyle::Path if state.spread == 0 => {
                if self.has(Fault::ForgetsModeAtOrigin) {
                    BOOK_URL.to_string()
                } else {
                    format!("{BOOK_URL}/mode/2up")
                }
            }
            UrlStyle::Path => format!("{BOOK_URL}/page/n{}/mode/2up", state.spread * 2),
        }
    }

    fn flip(&self, forward: bool) {
        let mut state = self.state.lock().unwrap();
        state.navigated = true;
        if forward {
            state.spread += 1;
        } else {
            state.spread = state.spread.saturating_sub(1);
            if self.has(Fault::StuckOnRetreat) {
                return;
            }
        }
        let left = state.spread * 2;
        let images = if forward {
            [left, left + 1]
        } else if self.has(Fault::ShiftsOnRetreat) {
            [left + 1, left + 2]
        } else if self.has(Fault::DuplicatesOnRetreat) {
            [left, left]
        } else {
            [left, left + 1]
        };
        if self.flip_delay.is_zero() {
            state.images = images;
        } else {
            state.pending = Some((Instant::now() + self.flip_delay, images));
        }
    }

    fn src(&self, index: usize) -> String {
        let images = self.state.lock().unwrap().shown();
        let leaf = if self.has(Fault::DuplicateLeaves) {
            images[0]
        } else {
            images[index]
        };
        format!("https://img.example.org/goody/leaf{leaf}.jpg")
    }
}

#[async_trait]
impl Automation for FakeViewer {
    type Element = FakeElement;

    async fn goto(&self, _url: &str) -> Result<()> {
        *self.state.lock().unwrap() = ViewerState::fresh(true);
        Ok(())
    }

    async fn locate(&self, locator: &Locator) -> Result<FakeElement> {
        Ok(FakeElement {
            target: locator.target().to_string(),
            nth: locator.selection(),
        })
    }

    async fn locate_all(&self, locator: &Locator) -> Result<Vec<FakeElement>> {
        let count = if locator.target() == "img" { 2 } else { 1 };
        Ok((0..count)
            .map(|i| FakeElement {
                target: locator.target().to_string(),
                nth: Some(Nth::Index(i)),
            })
            .collect())
    }

    async fn click(&self, element: &FakeElement) -> Result<()> {
        self.clicks.lock().unwrap().push(element.target.clone());
        match element.target.as_str() {
            ".BRicon.book_flip_next" => self.flip(true),
            ".BRicon.book_flip_prev" => self.flip(false),
            _ => {}
        }
        Ok(())
    }

    async fn wait_for_visible(&self, element: &FakeElement, timeout: Duration) -> Result<()> {
        let loaded = self.state.lock().unwrap().loaded;
        let shown = element.target.starts_with(".BRicon")
            && !self.hidden.contains(element.target.as_str());
        if loaded && shown {
            Ok(())
        } else {
            Err(HarnessError::timeout(element.target.clone(), timeout))
        }
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        match script {
            LOCATION_HASH_SCRIPT => Ok(Value::String(self.fragment())),
            LOCATION_HREF_SCRIPT => Ok(Value::String(self.address())),
            other => Err(HarnessError::Automation(format!("unsupported script {other}"))),
        }
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()> {
        if self.has(Fault::NeverIdle) {
            Err(HarnessError::timeout("network idle", timeout))
        } else {
            Ok(())
        }
    }

    async fn bounding_box(&self, element: &FakeElement) -> Result<Option<BoundingBox>> {
        Ok(match element.target.as_str() {
            "#BookReader" => Some(BoundingBox::sized(1200.0, 800.0)),
            ".BRcontainer" if self.has(Fault::Overflow) => Some(BoundingBox::sized(1400.0, 760.0)),
            ".BRcontainer" => Some(BoundingBox::sized(1200.0, 760.0)),
            _ => None,
        })
    }

    async fn attribute(&self, element: &FakeElement, name: &str) -> Result<Option<String>> {
        match (element.target.as_str(), name, element.nth) {
            ("img", "src", Some(Nth::Index(i))) => Ok(Some(self.src(i))),
            _ => Ok(None),
        }
    }
}

/// Config pointed at the fake book with no settle delay.
pub fn test_config() -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.viewer.base_url = "https://example.org".to_string();
    config.viewer.book_path = "/details/goody".to_string();
    config.timeouts.settle_ms = 0;
    config.timeouts.poll_interval_ms = 1;
    config
}
