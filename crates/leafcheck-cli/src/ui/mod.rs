//! Terminal output: status lines on stderr, the report on stdout.

mod messages;
mod report;

pub use messages::{error, info, success};
pub use report::{format_duration, render_json, render_scenario_list, render_summary};

/// Decides whether to emit ANSI colors.
///
/// `--no-color` and `NO_COLOR` disable colors, `FORCE_COLOR` forces them,
/// otherwise colors follow whether stdout is a terminal.
#[must_use]
pub fn should_use_color(no_color_flag: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stdout().features().colors_supported()
}

/// Strips color codes when colors are off.
#[must_use]
pub fn finish(text: String, color: bool) -> String {
    if color {
        text
    } else {
        console::strip_ansi_codes(&text).into_owned()
    }
}
