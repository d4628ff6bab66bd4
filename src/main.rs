//! jwt-forge: inspect, verify, and re-sign JSON Web Tokens.
//!
//! Entry point for the application. Parses CLI arguments, sets up
//! logging, and delegates to the appropriate command handler.

#![forbid(unsafe_code)]

mod cli;
mod clipboard;
mod commands;
mod core;
mod display;
mod error;
mod input;
mod terminal;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

/// Environment variable holding a full `tracing` filter directive.
const LOG_ENV: &str = "JWT_FORGE_LOG";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Parse CLI arguments and dispatch to the appropriate command handler.
///
/// Returns `ExitCode` so the caller can exit without `process::exit`,
/// allowing all destructors (including `Zeroizing`) to run.
fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose, !cli.no_color);
    tracing::debug!(command = ?cli.command, "parsed arguments");

    let success = match &cli.command {
        Commands::Decode(args) => {
            commands::decode::execute(args)?;
            true
        }
        Commands::Verify(args) => commands::verify::execute(args)?,
        Commands::Sign(args) => {
            commands::sign::execute(args)?;
            true
        }
        Commands::Modify(args) => commands::modify::execute(args)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(verbose: u8, ansi: bool) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| format!("jwt_forge={default_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(ansi),
        )
        .init();
}
