//! Verification scenarios run against a live viewer.
//!
//! Each `assert_*` procedure is a strictly ordered probe/act/probe sequence
//! over one exclusively borrowed [`ViewerSession`]. A procedure returns the
//! first broken invariant as an error; [`run_scenario`] turns that into a
//! failed [`CheckOutcome`] so one failure never stops later scenarios.

use crate::automation::Automation;
use crate::control::{Control, Region};
use crate::driver::NavigationAction;
use crate::error::{HarnessError, Result};
use crate::report::{CheckOutcome, SuiteReport};
use crate::session::ViewerSession;
use crate::state::{ImageId, PageState, ViewMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

/// A named verification scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    InitialUrlClean,
    LayoutContainment,
    LayoutContainmentAcrossNavigation,
    ControlsVisible,
    PageChangeShowsNewContent,
    NavigationUpdatesUrl,
}

impl Scenario {
    /// Every scenario, in the order a full run executes them.
    pub const ALL: [Scenario; 6] = [
        Scenario::InitialUrlClean,
        Scenario::ControlsVisible,
        Scenario::LayoutContainment,
        Scenario::LayoutContainmentAcrossNavigation,
        Scenario::PageChangeShowsNewContent,
        Scenario::NavigationUpdatesUrl,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Scenario::InitialUrlClean => "initial-url-clean",
            Scenario::LayoutContainment => "layout-containment",
            Scenario::LayoutContainmentAcrossNavigation => "layout-containment-across-navigation",
            Scenario::ControlsVisible => "controls-visible",
            Scenario::PageChangeShowsNewContent => "page-change-shows-new-content",
            Scenario::NavigationUpdatesUrl => "navigation-updates-url",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.name() == s)
            .ok_or_else(|| HarnessError::Config(format!("unknown scenario '{s}'")))
    }
}

/// The URL of a freshly opened viewer carries no navigation state.
///
/// Must run before any navigation on the session.
///
/// # Errors
///
/// Returns `AssertionViolation` listing every marker found.
pub async fn assert_initial_url_clean<A: Automation>(session: &ViewerSession<A>) -> Result<()> {
    let url = session.probe().current_url().await?;
    let violations = session.markers().clean_slate_violations(&url);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::violation(
            "initial URL is clean",
            "empty fragment and no page or mode marker",
            format!("{} ({url})", violations.join("; ")),
        ))
    }
}

/// The page-image container fits inside the viewer shell in both dimensions.
///
/// # Errors
///
/// Returns `ProbeTimeout` if rendering never quiesces, or
/// `AssertionViolation` naming each overflowing dimension.
pub async fn assert_layout_containment<A: Automation>(session: &ViewerSession<A>) -> Result<()> {
    let probe = session.probe();
    let outer = probe.container_bounding_box(Region::Shell).await?;
    let inner = probe.measure(Region::Container).await?;

    let mut overflow = Vec::new();
    if inner.height > outer.height {
        overflow.push(format!("height {} > {}", inner.height, outer.height));
    }
    if inner.width > outer.width {
        overflow.push(format!("width {} > {}", inner.width, outer.width));
    }

    if overflow.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::violation(
            "page images contained in viewer",
            "container no larger than shell",
            overflow.join(", "),
        ))
    }
}

/// Containment holds before and after a navigation action.
///
/// # Errors
///
/// Returns the first containment failure, tagged with when it happened.
pub async fn assert_layout_containment_across_navigation<A: Automation>(
    session: &mut ViewerSession<A>,
) -> Result<()> {
    assert_layout_containment(session)
        .await
        .map_err(|e| tag_violation(e, "before navigation"))?;
    session.perform(NavigationAction::Advance).await?;
    assert_layout_containment(session)
        .await
        .map_err(|e| tag_violation(e, "after advance"))
}

/// Every toolbar control becomes visible within its wait window.
///
/// All controls are probed even after one fails, so the error names every
/// missing control.
///
/// # Errors
///
/// Returns `AssertionViolation` listing each control that failed and why.
pub async fn assert_all_controls_visible<A: Automation>(session: &ViewerSession<A>) -> Result<()> {
    let probe = session.probe();
    let mut missing = Vec::new();

    for control in Control::ALL {
        if let Err(err) = probe.is_control_visible(control).await {
            warn!(%control, error = %err, "control not visible");
            missing.push((control, err));
        }
    }

    if missing.is_empty() {
        return Ok(());
    }

    let names: Vec<&str> = missing.iter().map(|(c, _)| c.name()).collect();
    let details: Vec<String> = missing.iter().map(|(c, e)| format!("{c}: {e}")).collect();
    Err(HarnessError::violation(
        "controls visible",
        format!("all {} controls visible", Control::ALL.len()),
        format!("not visible: {} [{}]", names.join(", "), details.join("; ")),
    ))
}

/// Flipping back shows a genuinely different spread.
///
/// Advances twice so the retreat starts from a mid-document position, then
/// checks that both spreads show two distinct leaves and that no leaf of the
/// earlier spread reappears after the retreat.
///
/// # Errors
///
/// Returns `AssertionViolation` for a repeated leaf or a reused image.
pub async fn assert_page_change_shows_new_content<A: Automation>(
    session: &mut ViewerSession<A>,
) -> Result<()> {
    session.probe().wait_for_render_quiescence().await?;

    session.perform(NavigationAction::Advance).await?;
    session.perform(NavigationAction::Advance).await?;

    let before = session.capture().await?;
    let (a_left, a_right) = before.spread()?;
    ensure_distinct_leaves("spread before retreat", a_left, a_right)?;

    session.perform(NavigationAction::Retreat).await?;

    let after = session.capture().await?;
    after.ensure_after(&before)?;
    session.ensure_fresh(&after)?;
    let (b_left, b_right) = after.spread()?;

    let mut reused = Vec::new();
    for b in [b_left, b_right] {
        for a in [a_left, a_right] {
            if b == a {
                reused.push(b.to_string());
            }
        }
    }
    if !reused.is_empty() {
        return Err(HarnessError::violation(
            "retreat shows new pages",
            format!("no overlap with [{a_left}, {a_right}]"),
            format!("[{b_left}, {b_right}] reuses {}", reused.join(", ")),
        ));
    }

    ensure_distinct_leaves("spread after retreat", b_left, b_right)
}

/// Navigation is reflected in the URL, and the view mode survives a return
/// to the first page.
///
/// # Errors
///
/// Returns `AssertionViolation` naming the marker that was wrong.
pub async fn assert_navigation_updates_url<A: Automation>(
    session: &mut ViewerSession<A>,
) -> Result<()> {
    session.probe().wait_for_render_quiescence().await?;

    session.perform(NavigationAction::Advance).await?;
    let advanced = session.capture().await?;
    ensure_flag("page marker after advance", true, advanced.has_page_param(), &advanced)?;
    ensure_flag(
        "2up mode marker after advance",
        true,
        advanced.has_mode_param(ViewMode::TwoUp),
        &advanced,
    )?;

    session.perform(NavigationAction::Retreat).await?;
    let returned = session.capture().await?;
    returned.ensure_after(&advanced)?;
    ensure_flag("page marker after retreat", false, returned.has_page_param(), &returned)?;
    ensure_flag(
        "2up mode marker after retreat",
        true,
        returned.has_mode_param(ViewMode::TwoUp),
        &returned,
    )
}

/// Runs one scenario on an opened session and records the outcome.
#[instrument(skip(session), fields(url = %session.url()))]
pub async fn run_scenario<A: Automation>(
    session: &mut ViewerSession<A>,
    scenario: Scenario,
) -> CheckOutcome {
    let start = Instant::now();
    info!("running");

    let result = match scenario {
        Scenario::InitialUrlClean => assert_initial_url_clean(session).await,
        Scenario::LayoutContainment => assert_layout_containment(session).await,
        Scenario::LayoutContainmentAcrossNavigation => {
            assert_layout_containment_across_navigation(session).await
        }
        Scenario::ControlsVisible => assert_all_controls_visible(session).await,
        Scenario::PageChangeShowsNewContent => assert_page_change_shows_new_content(session).await,
        Scenario::NavigationUpdatesUrl => assert_navigation_updates_url(session).await,
    };

    let outcome = match result {
        Ok(()) => CheckOutcome::passed(scenario, start.elapsed()),
        Err(err) => CheckOutcome::failed(scenario, err.to_string(), start.elapsed()),
    };
    info!(status = ?outcome.status, "finished");
    outcome
}

/// Runs each scenario on a freshly opened session from `open_session`.
///
/// A session that cannot be created or opened fails only its own scenario.
/// Each session is closed before the next one starts.
pub async fn run_isolated<A, F, Fut>(scenarios: &[Scenario], mut open_session: F) -> SuiteReport
where
    A: Automation,
    F: FnMut(Scenario) -> Fut,
    Fut: Future<Output = Result<ViewerSession<A>>>,
{
    let mut report = SuiteReport::default();

    for &scenario in scenarios {
        let start = Instant::now();
        let mut session = match open_session(scenario).await {
            Ok(session) => session,
            Err(err) => {
                report.push(CheckOutcome::failed(scenario, err.to_string(), start.elapsed()));
                continue;
            }
        };

        if let Err(err) = session.open().await {
            report.push(CheckOutcome::failed(scenario, err.to_string(), start.elapsed()));
        } else {
            report.push(run_scenario(&mut session, scenario).await);
        }

        if let Err(err) = session.automation().close().await {
            warn!(%scenario, error = %err, "failed to close session");
        }
    }

    report
}

fn ensure_distinct_leaves(check: &str, left: &ImageId, right: &ImageId) -> Result<()> {
    if left == right {
        return Err(HarnessError::violation(
            check,
            "two different page images",
            format!("'{left}' in both leaves"),
        ));
    }
    Ok(())
}

fn ensure_flag(
    check: &str,
    expected: bool,
    actual: bool,
    state: &PageState,
) -> Result<()> {
    if expected == actual {
        return Ok(());
    }
    Err(HarnessError::violation(
        check,
        expected.to_string(),
        format!("{actual} (url {})", state.location()),
    ))
}

fn tag_violation(err: HarnessError, when: &str) -> HarnessError {
    match err {
        HarnessError::AssertionViolation {
            check,
            expected,
            actual,
        } => HarnessError::AssertionViolation {
            check: format!("{check} ({when})"),
            expected,
            actual,
        },
        other => other,
    }
}
