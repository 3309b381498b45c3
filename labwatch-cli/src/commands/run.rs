//! Run command handler
//!
//! Merges command-line arguments over the rc file, builds the configured
//! runner and submits the job.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use labwatch_core::domain::job::Verdict;
use labwatch_runner::{RunOutcome, RunnerConfig, RunnerSettings, WaitMode};
use std::time::Duration;
use tracing::debug;

use crate::config::RcFile;

/// Arguments of the `run` command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Runner type and a JSON object of its arguments
    #[arg(short, long, num_args = 2, value_names = ["TYPE", "ARGS"])]
    pub runner: Option<Vec<String>>,

    /// URL of the published build
    #[arg(long)]
    pub buildurl: Option<String>,

    /// Release string of the build
    #[arg(long)]
    pub krelease: Option<String>,

    /// Wait for the job to finish and exit with its verdict
    #[arg(short, long)]
    pub wait: bool,

    /// Seconds between status polls
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Consecutive failed status queries tolerated per recipe
    #[arg(long, value_name = "COUNT")]
    pub max_query_failures: Option<u32>,

    /// Path or name of the `bkr` executable
    #[arg(long, value_name = "PATH")]
    pub bkr: Option<String>,
}

/// Fully resolved settings of one run
#[derive(Debug)]
struct RunConfig {
    runner: RunnerConfig,
    settings: RunnerSettings,
    buildurl: String,
    krelease: String,
    wait: WaitMode,
}

impl RunConfig {
    /// Command-line values win over rc values
    fn resolve(args: RunArgs, rc: RcFile) -> Result<Self> {
        let runner = match args.runner.as_deref() {
            Some([kind, json]) => {
                let runner_args = serde_json::from_str(json)
                    .with_context(|| format!("Runner arguments are not valid JSON: {}", json))?;
                RunnerConfig::from_parts(kind, runner_args)?
            }
            Some(other) => anyhow::bail!("Expected a runner type and arguments, got {:?}", other),
            None => rc
                .runner
                .context("No runner configured; pass -r TYPE ARGS or add a [runner] table")?,
        };

        let buildurl = args
            .buildurl
            .or(rc.config.buildurl)
            .context("No build URL given; pass --buildurl")?;
        let krelease = args
            .krelease
            .or(rc.config.krelease)
            .context("No release given; pass --krelease")?;

        let mut settings = RunnerSettings::default();
        if let Some(secs) = args.poll_interval.or(rc.config.poll_interval) {
            settings = settings.with_poll_interval(Duration::from_secs(secs));
        }
        if let Some(limit) = args.max_query_failures.or(rc.config.max_query_failures) {
            settings = settings.with_max_query_failures(limit);
        }
        if let Some(bkr) = args.bkr.or(rc.config.bkr) {
            settings.bkr_program = bkr;
        }

        let wait = if args.wait || rc.config.wait.unwrap_or(false) {
            WaitMode::UntilComplete
        } else {
            WaitMode::Submit
        };

        Ok(Self {
            runner,
            settings,
            buildurl,
            krelease,
            wait,
        })
    }
}

/// Handle the `run` command
///
/// # Returns
/// The exit code of the run: 0 for a submission or a passing verdict
pub async fn handle_run_command(args: RunArgs, rc: RcFile) -> Result<u8> {
    let config = RunConfig::resolve(args, rc)?;
    debug!("Resolved run configuration: {:?}", config);

    let runner = config.runner.build(&config.settings)?;
    let outcome = runner
        .run(&config.buildurl, &config.krelease, config.wait)
        .await?;

    print_outcome(&outcome);

    Ok(u8::try_from(outcome.exit_code()).unwrap_or(1))
}

fn print_outcome(outcome: &RunOutcome) {
    println!("{} {}", "Submitted".green().bold(), outcome.job_id.as_str().cyan());

    if let Some(summary) = &outcome.summary {
        println!(
            "  {} finished, {} cancelled, {} diagnostic job(s)",
            summary.finished, summary.cancelled, summary.rescheduled
        );
    }

    match outcome.verdict {
        Some(Verdict::Pass) => println!("{} {}", "Verdict:".bold(), "Pass".green().bold()),
        Some(Verdict::Fail) => println!("{} {}", "Verdict:".bold(), "Fail".red().bold()),
        None => {}
    }
}
