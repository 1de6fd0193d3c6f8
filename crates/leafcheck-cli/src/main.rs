//! leafcheck - verify a paginated book viewer in a real browser.

use clap::Parser;
use leafcheck_cli::{cli, error, logger, run, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let color = ui::should_use_color(args.no_color);
    logger::init_logger(args.verbose, args.quiet, !color);

    run::execute(&args, color)
        .await
        .map_err(error::cli_error_to_miette)
}
