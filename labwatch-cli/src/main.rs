//! Labwatch CLI
//!
//! Command-line entry point: submits a test job for a published build and,
//! when asked to wait, exits with the job's verdict.

mod commands;
mod config;
mod logging;

use clap::Parser;
use colored::*;
use commands::{Commands, handle_command};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "labwatch")]
#[command(about = "Submit test jobs to a lab scheduler and wait for a verdict", long_about = None)]
struct Cli {
    /// Path to rc file
    #[arg(long, env = "LABWATCH_RC", default_value = config::DEFAULT_RC)]
    rc: PathBuf,

    /// Increase verbosity level (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    match handle_command(cli.command, &cli.rc).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), error_report(&e));
            ExitCode::FAILURE
        }
    }
}

/// One-line rendering of an error and its context chain
fn error_report(error: &anyhow::Error) -> String {
    format!("{:#}", error)
}
