//! Rakit CLI Binary
//!
//! Command-line interface for resolving, inspecting and validating resource agents.

use anyhow::Context;
use clap::Parser;
use rakit::logging::init_logging;
use rakit::tooling::cli::{Cli, CliContext};
use std::io::IsTerminal;
use std::process;

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Returns whether the command succeeded.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let context = CliContext::new(cli.config.clone(), cli.ocf_root.clone())
        .context("Failed to load configuration")?
        .with_color(std::io::stdout().is_terminal());

    let logging = cli.logging_config(&context.config().logging);
    init_logging(Some(&logging)).context("Failed to initialize logging")?;

    let output = context.execute(&cli.command)?;
    if !output.text.is_empty() {
        println!("{}", output.text);
    }
    Ok(output.success)
}
