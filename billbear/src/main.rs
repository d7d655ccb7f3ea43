#![warn(clippy::uninlined_format_args)]

mod bootstrap;
mod cli;
mod config;
mod svg_renderer;

use clap::Parser;
use std::process;

fn main() {
    let cli = cli::Cli::parse();
    bootstrap::init_logging(cli.verbose);

    if let Err(err) = bootstrap::run(&cli) {
        tracing::error!(error = ?err, "billbear failed");
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
