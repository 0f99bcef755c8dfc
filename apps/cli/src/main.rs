//! Showcase CLI — issue-to-content pipelines for the cohort showcase site.
//!
//! Turns semi-structured issue-form submissions into validated, normalized
//! records in the site's content store, and builds the search corpus the
//! client filter UI consumes.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
