//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod run;

pub use run::RunArgs;

use anyhow::Result;
use clap::Subcommand;
use std::path::Path;

use crate::config::RcFile;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a test job for a published build
    Run(RunArgs),
}

/// Handle a CLI command
///
/// Loads the rc file and routes the command to its handler.
///
/// # Arguments
/// * `command` - The command to execute
/// * `rc_path` - Location of the rc file
///
/// # Returns
/// The process exit code
pub async fn handle_command(command: Commands, rc_path: &Path) -> Result<u8> {
    let rc = RcFile::load(rc_path)?;

    match command {
        Commands::Run(args) => run::handle_run_command(args, rc).await,
    }
}
