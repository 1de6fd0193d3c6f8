//! Status lines on stderr.

use super::finish;
use owo_colors::OwoColorize;

/// Prints a success line.
pub fn success(message: &str, color: bool) {
    eprintln!("{}", finish(format!("{} {}", "✓".green().bold(), message), color));
}

/// Prints an informational line.
pub fn info(message: &str, color: bool) {
    eprintln!("{}", finish(format!("{} {}", "ℹ".blue().bold(), message), color));
}

/// Prints an error line.
pub fn error(message: &str, color: bool) {
    eprintln!("{}", finish(format!("{} {}", "✗".red().bold(), message.red()), color));
}
