//! Rendering of suite reports.

use super::finish;
use crate::error::Result;
use leafcheck_core::{Scenario, Status, SuiteReport};
use owo_colors::OwoColorize;
use std::fmt::Write as _;
use std::time::Duration;

/// Formats a duration as `50ms`, `1.50s` or `1m 30s`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One line per scenario, failure messages indented below, then a total.
#[must_use]
pub fn render_summary(report: &SuiteReport, color: bool) -> String {
    let mut out = String::new();

    for outcome in &report.outcomes {
        let elapsed = format!("({})", format_duration(Duration::from_millis(outcome.duration_ms)));
        let mark = match outcome.status {
            Status::Passed => "✓".green().bold().to_string(),
            Status::Failed => "✗".red().bold().to_string(),
        };
        let _ = writeln!(out, "{mark} {} {}", outcome.scenario, elapsed.dimmed());
        if let Some(message) = &outcome.message {
            let _ = writeln!(out, "    {}", message.red());
        }
    }

    let total = report.outcomes.len();
    let failed = report.failed();
    let passed = format!("{} passed", report.passed());
    let failed_text = format!("{failed} failed");
    let _ = write!(
        out,
        "{total} scenarios: {}, {}",
        passed.green(),
        if failed == 0 {
            failed_text.dimmed().to_string()
        } else {
            failed_text.red().bold().to_string()
        }
    );

    finish(out, color)
}

/// The report as pretty-printed JSON.
///
/// # Errors
///
/// Returns `Json` if serialization fails.
pub fn render_json(report: &SuiteReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Every scenario name, one per line.
#[must_use]
pub fn render_scenario_list() -> String {
    Scenario::ALL
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafcheck_core::CheckOutcome;

    fn mixed_report() -> SuiteReport {
        let mut report = SuiteReport::default();
        report.push(CheckOutcome::passed(
            Scenario::InitialUrlClean,
            Duration::from_millis(40),
        ));
        report.push(CheckOutcome::failed(
            Scenario::PageChangeShowsNewContent,
            "retreat shows new pages: expected no shared images, got leaf4.jpg",
            Duration::from_millis(2300),
        ));
        report
    }

    #[test]
    fn durations_pick_a_readable_unit() {
        assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
    }

    #[test]
    fn plain_summary_lists_outcomes_and_totals() {
        let text = render_summary(&mixed_report(), false);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "✓ initial-url-clean (40ms)");
        assert_eq!(lines[1], "✗ page-change-shows-new-content (2.30s)");
        assert!(lines[2].starts_with("    retreat shows new pages"));
        assert_eq!(lines[3], "2 scenarios: 1 passed, 1 failed");
    }

    #[test]
    fn json_uses_scenario_names_and_lowercase_status() {
        let json = render_json(&mixed_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outcomes"][0]["scenario"], "initial-url-clean");
        assert_eq!(value["outcomes"][1]["status"], "failed");
        assert_eq!(value["outcomes"][0]["message"], serde_json::Value::Null);
    }

    #[test]
    fn scenario_list_has_every_name() {
        let list = render_scenario_list();
        assert_eq!(list.lines().count(), Scenario::ALL.len());
        assert!(list.contains("layout-containment-across-navigation"));
    }
}
