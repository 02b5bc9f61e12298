use clap::Parser;
use std::process::ExitCode;

use spacerkit::cli::{self, Cli};
use spacerkit::{init_logging, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    init_logging(cli.json, level)?;
    tracing::debug!(version = VERSION, build_date = BUILD_DATE, "spacerkit starting");

    cli::run(cli)
}
