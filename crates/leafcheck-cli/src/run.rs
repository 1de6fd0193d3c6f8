//! The run: load config, launch Chrome, execute scenarios, report.

use crate::cli::Cli;
use crate::config;
use crate::error::{CliError, Result};
use crate::ui;
use leafcheck_browser::ViewerBrowser;
use leafcheck_core::{run_isolated, HarnessError, SuiteReport, ViewerSession};
use tracing::{debug, warn};

/// Executes the command described by `args`.
///
/// # Errors
///
/// Returns `ScenariosFailed` when any scenario fails, or the configuration
/// or browser error that stopped the run from starting.
pub async fn execute(args: &Cli, color: bool) -> Result<()> {
    if args.list {
        println!("{}", ui::render_scenario_list());
        return Ok(());
    }

    let config = config::load(args)?;
    let scenarios = args.selected_scenarios();
    debug!(?config, "configuration loaded");

    if !args.quiet {
        ui::info(
            &format!(
                "Checking {} scenario(s) against {}",
                scenarios.len(),
                config.viewer_url()
            ),
            color,
        );
    }

    let browser = ViewerBrowser::launch(
        &config.browser,
        &config.timeouts,
        config.session.storage_state.as_deref(),
    )
    .await?;

    let report = {
        let browser = &browser;
        let config = &config;
        run_isolated(&scenarios, move |_| async move {
            let page = browser.open_page().await.map_err(HarnessError::from)?;
            ViewerSession::new(page, config)
        })
        .await
    };

    if let Err(err) = browser.close().await {
        warn!(error = %err, "failed to close browser");
    }

    emit(&report, args, color)?;
    finish(&report, args.quiet, color)
}

fn emit(report: &SuiteReport, args: &Cli, color: bool) -> Result<()> {
    if args.json {
        println!("{}", ui::render_json(report)?);
    } else {
        println!("{}", ui::render_summary(report, color));
    }
    Ok(())
}

fn finish(report: &SuiteReport, quiet: bool, color: bool) -> Result<()> {
    if report.is_success() {
        if !quiet {
            ui::success("Viewer behaves", color);
        }
        return Ok(());
    }
    let err = CliError::ScenariosFailed {
        failed: report.failed(),
        total: report.outcomes.len(),
    };
    if !quiet {
        ui::error(&err.to_string(), color);
    }
    Err(err)
}
