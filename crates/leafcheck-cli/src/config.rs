//! Command-line overrides on top of the layered configuration.
//!
//! Priority: CLI flags > environment variables > config file > defaults.
//! Flags are merged key by key, so a flag that was not given never masks a
//! value from the file or the environment.

use crate::cli::Cli;
use crate::error::Result;
use figment::providers::Serialized;
use figment::Figment;
use leafcheck_core::config::SettleKind;
use leafcheck_core::HarnessConfig;

/// Loads the configuration the run will use.
///
/// # Errors
///
/// Returns a configuration error when a file is missing, a value is
/// malformed, or the merged result fails validation.
pub fn load(args: &Cli) -> Result<HarnessConfig> {
    let figment = HarnessConfig::figment(args.config.as_deref())?;
    Ok(HarnessConfig::from_figment(&with_overrides(figment, args))?)
}

fn with_overrides(mut figment: Figment, args: &Cli) -> Figment {
    if let Some(url) = &args.url {
        figment = figment.merge(Serialized::default("viewer.base_url", url));
    }
    if let Some(book) = &args.book {
        figment = figment.merge(Serialized::default("viewer.book_path", book));
    }
    if let Some(path) = &args.storage_state {
        figment = figment.merge(Serialized::default("session.storage_state", path));
    }
    if let Some(settle) = args.settle {
        figment = figment.merge(Serialized::default("settle.strategy", SettleKind::from(settle)));
    }
    if args.headful {
        figment = figment.merge(Serialized::default("browser.headless", false));
    }
    figment
}
