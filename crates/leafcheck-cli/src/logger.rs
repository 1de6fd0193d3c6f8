//! Logging setup for the leafcheck CLI.
//!
//! Logs go to stderr so `--json` output on stdout stays machine-readable.
//!
//! # Verbosity
//!
//! 1. `--verbose`: DEBUG for the leafcheck crates
//! 2. `--quiet`: ERROR only
//! 3. `RUST_LOG`: custom filter
//! 4. Default: INFO for the leafcheck crates

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "leafcheck_core=debug,leafcheck_browser=debug,leafcheck_cli=debug";
const QUIET_FILTER: &str = "leafcheck_core=error,leafcheck_browser=error,leafcheck_cli=error";
const DEFAULT_FILTER: &str = "leafcheck_core=info,leafcheck_browser=info,leafcheck_cli=info";

/// Chooses the filter for the given flags.
#[must_use]
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Installs the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_wins_over_quiet() {
        assert_eq!(filter_for(true, true).to_string(), EnvFilter::new(VERBOSE_FILTER).to_string());
    }

    #[test]
    fn quiet_keeps_errors_only() {
        let filter = filter_for(false, true).to_string();
        assert!(filter.contains("leafcheck_core=error"), "{filter}");
        assert!(!filter.contains("info"), "{filter}");
    }
}
