//! Scenario tests against the in-memory viewer.

mod common;

use common::{test_config, Fault, FakeViewer, UrlStyle};
use leafcheck_core::config::SettleKind;
use leafcheck_core::suite::{
    assert_all_controls_visible, assert_initial_url_clean, assert_layout_containment,
    assert_navigation_updates_url, assert_page_change_shows_new_content,
};
use leafcheck_core::{
    run_isolated, run_scenario, HarnessConfig, HarnessError, NavigationAction, Position, Scenario,
    Status, ViewMode, ViewerSession,
};
use std::time::Duration;

async fn open(viewer: FakeViewer) -> ViewerSession<FakeViewer> {
    let mut session = ViewerSession::new(viewer, &test_config()).expect("valid config");
    session.open().await.expect("viewer opens");
    session
}

#[tokio::test]
async fn healthy_viewer_passes_every_scenario() {
    let config = test_config();
    let report = run_isolated(&Scenario::ALL, |_| {
        let config = config.clone();
        async move { ViewerSession::new(FakeViewer::healthy(), &config) }
    })
    .await;

    assert_eq!(report.outcomes.len(), Scenario::ALL.len());
    for outcome in &report.outcomes {
        assert_eq!(outcome.status, Status::Passed, "{outcome:?}");
    }
    assert!(report.is_success());
}

#[tokio::test]
async fn fresh_viewer_has_a_clean_url() {
    let session = open(FakeViewer::healthy()).await;
    assert_initial_url_clean(&session).await.unwrap();

    let state = session.capture().await.unwrap();
    assert!(!state.has_page_param());
    for mode in ViewMode::ALL {
        assert!(!state.has_mode_param(mode));
    }
    assert_eq!(state.location().hash, "");
}

#[tokio::test]
async fn dirty_initial_url_is_reported() {
    let session = open(FakeViewer::healthy().with_fault(Fault::DirtyInitialUrl)).await;
    let err = assert_initial_url_clean(&session).await.unwrap_err();
    let message = err.to_string();
    assert!(err.is_violation());
    assert!(message.contains("fragment is '#page/n1'"), "{message}");
}

#[tokio::test]
async fn every_missing_control_is_named() {
    let viewer = FakeViewer::healthy()
        .hiding(".BRicon.zoom_in")
        .hiding(".BRicon.read");
    let session = open(viewer).await;

    let message = assert_all_controls_visible(&session)
        .await
        .unwrap_err()
        .to_string();
    assert!(message.contains("not visible: zoom-in, mode-read"), "{message}");
    assert!(!message.contains("zoom-out:"), "{message}");
}

#[tokio::test]
async fn overflowing_container_fails_containment() {
    let session = open(FakeViewer::healthy().with_fault(Fault::Overflow)).await;
    let message = assert_layout_containment(&session)
        .await
        .unwrap_err()
        .to_string();
    assert!(message.contains("width 1400 > 1200"), "{message}");
    assert!(!message.contains("height"), "{message}");
}

#[tokio::test]
async fn containment_holds_after_navigation() {
    let mut session = open(FakeViewer::healthy()).await;
    assert_layout_containment(&session).await.unwrap();
    session.perform(NavigationAction::Advance).await.unwrap();
    assert_layout_containment(&session).await.unwrap();
}

#[tokio::test]
async fn render_that_never_quiesces_times_out() {
    let session = open(FakeViewer::healthy().with_fault(Fault::NeverIdle)).await;
    let err = assert_layout_containment(&session).await.unwrap_err();
    assert!(err.is_timeout(), "{err}");
}

#[tokio::test]
async fn page_change_shows_disjoint_spreads() {
    let mut session = open(FakeViewer::healthy()).await;
    assert_page_change_shows_new_content(&mut session).await.unwrap();
    assert_eq!(session.position().depth(), 1);
    assert_eq!(
        session.automation().clicks(),
        [
            ".BRicon.book_flip_next",
            ".BRicon.book_flip_next",
            ".BRicon.book_flip_prev"
        ]
    );
}

#[tokio::test]
async fn repeated_leaf_is_caught_before_retreating() {
    let mut session = open(FakeViewer::healthy().with_fault(Fault::DuplicateLeaves)).await;
    let message = assert_page_change_shows_new_content(&mut session)
        .await
        .unwrap_err()
        .to_string();
    assert!(message.starts_with("spread before retreat"), "{message}");
    assert_eq!(session.automation().clicks().len(), 2);
}

#[tokio::test]
async fn retreat_that_keeps_the_images_is_caught() {
    let mut session = open(FakeViewer::healthy().with_fault(Fault::StuckOnRetreat)).await;
    let message = assert_page_change_shows_new_content(&mut session)
        .await
        .unwrap_err()
        .to_string();
    assert!(message.starts_with("retreat shows new pages"), "{message}");
    assert!(message.contains("leaf4.jpg"), "{message}");
    assert!(message.contains("leaf5.jpg"), "{message}");
}

#[tokio::test]
async fn retreat_shifted_by_one_leaf_is_caught() {
    let mut session = open(FakeViewer::healthy().with_fault(Fault::ShiftsOnRetreat)).await;
    let message = assert_page_change_shows_new_content(&mut session)
        .await
        .unwrap_err()
        .to_string();
    assert!(message.starts_with("retreat shows new pages"), "{message}");
    assert!(
        message.ends_with("reuses https://img.example.org/goody/leaf4.jpg"),
        "{message}"
    );
}

#[tokio::test]
async fn repeated_leaf_after_retreat_is_caught() {
    let mut session = open(FakeViewer::healthy().with_fault(Fault::DuplicatesOnRetreat)).await;
    let message = assert_page_change_shows_new_content(&mut session)
        .await
        .unwrap_err()
        .to_string();
    assert!(message.starts_with("spread after retreat"), "{message}");
    assert!(message.contains("leaf2.jpg' in both leaves"), "{message}");
    assert_eq!(session.automation().clicks().len(), 3);
}

#[tokio::test]
async fn navigation_is_mirrored_in_the_path() {
    let mut session = open(FakeViewer::healthy()).await;
    assert_navigation_updates_url(&mut session).await.unwrap();

    let state = session.capture().await.unwrap();
    assert!(!state.has_page_param());
    assert!(state.has_mode_param(ViewMode::TwoUp));
    assert_eq!(session.position(), Position::Origin);
}

#[tokio::test]
async fn navigation_is_mirrored_in_the_fragment() {
    let mut session = open(FakeViewer::healthy().with_url_style(UrlStyle::Fragment)).await;

    session.perform(NavigationAction::Advance).await.unwrap();
    let advanced = session.capture().await.unwrap();
    assert_eq!(advanced.location().hash, "#page/n2/mode/2up");
    assert!(advanced.has_page_param());
    assert!(advanced.has_mode_param(ViewMode::TwoUp));

    session.perform(NavigationAction::Retreat).await.unwrap();
    let returned = session.capture().await.unwrap();
    assert!(!returned.has_page_param());
    assert!(returned.has_mode_param(ViewMode::TwoUp));
}

#[tokio::test]
async fn forgotten_mode_fails_the_url_check() {
    let mut session = open(FakeViewer::healthy().with_fault(Fault::ForgetsModeAtOrigin)).await;
    let message = assert_navigation_updates_url(&mut session)
        .await
        .unwrap_err()
        .to_string();
    assert!(
        message.starts_with("2up mode marker after retreat: expected true, got false"),
        "{message}"
    );
}

#[tokio::test]
async fn retreat_from_the_first_page_is_refused_without_clicking() {
    let mut session = open(FakeViewer::healthy()).await;
    let err = session
        .perform(NavigationAction::Retreat)
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::NavigationPreconditionViolation(_)));
    assert!(session.automation().clicks().is_empty());
    assert_eq!(session.position(), Position::Origin);
}

#[tokio::test]
async fn states_go_stale_across_an_action() {
    let mut session = open(FakeViewer::healthy()).await;
    let before = session.capture().await.unwrap();
    session.ensure_fresh(&before).unwrap();

    session.perform(NavigationAction::Advance).await.unwrap();
    assert!(matches!(
        session.ensure_fresh(&before),
        Err(HarnessError::StaleState { .. })
    ));

    let after = session.capture().await.unwrap();
    assert_eq!(after.epoch(), session.epoch());
    after.ensure_after(&before).unwrap();
    assert_ne!(before.displayed_image_ids(), after.displayed_image_ids());
}

#[tokio::test]
async fn stable_settling_converges_on_an_instant_flip() {
    let mut config = test_config();
    config.settle.strategy = SettleKind::Stable;
    config.settle.stable_timeout_ms = 200;

    let mut session = ViewerSession::new(FakeViewer::healthy(), &config).unwrap();
    session.open().await.unwrap();
    session.perform(NavigationAction::Advance).await.unwrap();
    assert_eq!(session.position().depth(), 1);
}

fn stable_config(stable_timeout_ms: u64) -> HarnessConfig {
    let mut config = test_config();
    config.settle.strategy = SettleKind::Stable;
    config.timeouts.poll_interval_ms = 100;
    config.settle.stable_timeout_ms = stable_timeout_ms;
    config
}

#[tokio::test]
async fn stable_settling_waits_for_a_slow_flip() {
    let viewer = FakeViewer::healthy().with_flip_delay(Duration::from_millis(400));
    let mut session = ViewerSession::new(viewer, &stable_config(3_000)).unwrap();
    session.open().await.unwrap();

    let before = session.capture().await.unwrap();
    session.perform(NavigationAction::Advance).await.unwrap();
    let after = session.capture().await.unwrap();

    assert!(after.displayed_image_ids()[0].as_str().ends_with("leaf2.jpg"));
    assert_ne!(before.displayed_image_ids(), after.displayed_image_ids());
}

#[tokio::test]
async fn slow_viewer_passes_page_change_under_stable_settling() {
    let viewer = FakeViewer::healthy().with_flip_delay(Duration::from_millis(250));
    let mut session = ViewerSession::new(viewer, &stable_config(3_000)).unwrap();
    session.open().await.unwrap();
    assert_page_change_shows_new_content(&mut session).await.unwrap();
}

#[tokio::test]
async fn position_moves_once_the_click_lands_even_if_settling_fails() {
    let viewer = FakeViewer::healthy().with_fault(Fault::StuckOnRetreat);
    let mut session = ViewerSession::new(viewer, &stable_config(300)).unwrap();
    session.open().await.unwrap();

    session.perform(NavigationAction::Advance).await.unwrap();
    let err = session
        .perform(NavigationAction::Retreat)
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "{err}");
    assert_eq!(session.position(), Position::Origin);
    assert!(matches!(
        session.perform(NavigationAction::Retreat).await,
        Err(HarnessError::NavigationPreconditionViolation(_))
    ));
}

#[tokio::test]
async fn failed_scenario_does_not_affect_the_next() {
    let config = test_config();
    let scenarios = [
        Scenario::PageChangeShowsNewContent,
        Scenario::NavigationUpdatesUrl,
    ];
    let report = run_isolated(&scenarios, |scenario| {
        let config = config.clone();
        async move {
            let viewer = match scenario {
                Scenario::PageChangeShowsNewContent => {
                    FakeViewer::healthy().with_fault(Fault::StuckOnRetreat)
                }
                _ => FakeViewer::healthy(),
            };
            ViewerSession::new(viewer, &config)
        }
    })
    .await;

    assert_eq!(report.failed(), 1);
    assert_eq!(report.outcomes[0].status, Status::Failed);
    assert_eq!(report.outcomes[1].status, Status::Passed);
}

#[tokio::test]
async fn session_creation_failure_fails_only_its_scenario() {
    let config = test_config();
    let report = run_isolated(
        &[Scenario::InitialUrlClean, Scenario::ControlsVisible],
        |scenario| {
            let config = config.clone();
            async move {
                if scenario == Scenario::InitialUrlClean {
                    Err(HarnessError::Automation("browser crashed".to_string()))
                } else {
                    ViewerSession::new(FakeViewer::healthy(), &config)
                }
            }
        },
    )
    .await;

    assert_eq!(
        report.outcomes[0].message.as_deref(),
        Some("automation backend error: browser crashed")
    );
    assert!(report.outcomes[1].is_passed());
}

#[tokio::test]
async fn run_scenario_reports_timeouts_as_failures() {
    let mut session = open(FakeViewer::healthy().with_fault(Fault::NeverIdle)).await;
    let outcome = run_scenario(&mut session, Scenario::NavigationUpdatesUrl).await;
    assert_eq!(outcome.status, Status::Failed);
    assert!(outcome
        .message
        .as_deref()
        .is_some_and(|m| m.starts_with("timed out")));
}
