//! Command-line interface definition.
//!
//! A single flat command: every flag either overrides one configuration key
//! or selects what to run and how to report it.

use clap::{Parser, ValueEnum};
use leafcheck_core::config::SettleKind;
use leafcheck_core::Scenario;
use std::path::PathBuf;

/// leafcheck - verify a paginated book viewer in a real browser
#[derive(Parser, Debug)]
#[command(
    name = "leafcheck",
    version,
    about = "Verify navigation, URL state and layout of a paginated book viewer",
    long_about = "leafcheck opens a book in the viewer, drives its toolbar and checks that\n\
                  pages flip, the URL follows the reader and the page images stay inside\n\
                  the viewer. Each scenario runs on a fresh page."
)]
pub struct Cli {
    /// Configuration file (default: ./leafcheck.toml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the site hosting the viewer
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Path of the book page under the base URL
    #[arg(long, value_name = "PATH")]
    pub book: Option<String>,

    /// Saved browser session (cookies and local storage) to restore
    #[arg(long, value_name = "FILE")]
    pub storage_state: Option<PathBuf>,

    /// Scenario to run; repeat to run several (default: all)
    #[arg(short, long = "scenario", value_name = "NAME", value_parser = parse_scenario)]
    pub scenarios: Vec<Scenario>,

    /// How to wait after each page flip
    #[arg(long, value_enum, value_name = "STRATEGY")]
    pub settle: Option<SettleArg>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// List scenario names and exit
    #[arg(long)]
    pub list: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Settle strategy as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SettleArg {
    /// Wait the configured fixed delay
    Fixed,
    /// Wait until the displayed images stop changing
    Stable,
}

impl From<SettleArg> for SettleKind {
    fn from(arg: SettleArg) -> Self {
        match arg {
            SettleArg::Fixed => SettleKind::Fixed,
            SettleArg::Stable => SettleKind::Stable,
        }
    }
}

impl Cli {
    /// The scenarios to run, in order, without repeats.
    #[must_use]
    pub fn selected_scenarios(&self) -> Vec<Scenario> {
        if self.scenarios.is_empty() {
            return Scenario::ALL.to_vec();
        }
        let mut selected = Vec::with_capacity(self.scenarios.len());
        for &scenario in &self.scenarios {
            if !selected.contains(&scenario) {
                selected.push(scenario);
            }
        }
        selected
    }
}

fn parse_scenario(name: &str) -> Result<Scenario, String> {
    name.parse().map_err(|_| {
        let known: Vec<_> = Scenario::ALL.iter().map(|s| s.name()).collect();
        format!("unknown scenario '{name}' (expected one of: {})", known.join(", "))
    })
}
