//! Brickgraph CLI Binary
//!
//! Command-line interface for the brickgraph catalog engine.

use anyhow::Context;
use brickgraph::config::ConfigLoader;
use brickgraph::logging::init_logging;
use brickgraph::tooling::cli::{Cli, CliContext};
use clap::Parser;
use std::process;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ConfigLoader::load(&cli.workspace).context("Failed to load configuration")?,
    };

    cli.apply_log_overrides(&mut config.logging);
    init_logging(Some(&config.logging)).context("Failed to initialize logging")?;

    let context = CliContext::with_config(cli.workspace.clone(), config)
        .context("Error initializing workspace")?
        .with_format(cli.format);

    let output = context.execute(&cli.command)?;
    print!("{}", output);
    Ok(())
}
