//! leafcheck CLI.
//!
//! Loads the layered configuration, applies command-line overrides, runs the
//! selected scenarios against the viewer in Chrome and prints a report.
//!
//! - [`cli`] - argument definitions
//! - [`config`] - command-line overrides on top of file and environment
//! - [`run`] - the run itself
//! - [`error`] - error types and miette conversion
//! - [`logger`] - tracing setup
//! - [`ui`] - terminal output

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod run;
pub mod ui;

pub use error::{CliError, Result};
