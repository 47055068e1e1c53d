//! lintmux CLI
//!
//! Runs many linters concurrently and prints one normalized issue list.
//!
//! Exit status is a bit set: 1 when issues were reported, 2 when any
//! diagnostic (timeout, launch failure, ...) was emitted or the configuration
//! was invalid.

mod cli;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.lint.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Some(Commands::Linters) => commands::linters::run_linters(&cli.lint).map(|_| 0),
        None => commands::lint::run_lint(&cli.lint),
    }
}
