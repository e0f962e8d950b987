//! labelprep CLI: prepare category folders for LLM segment labeling.
//!
//! Merges classified and unclassified segments, normalizes guidance
//! ontologies, and renders classification prompts.

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
