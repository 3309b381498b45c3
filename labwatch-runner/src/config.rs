//! Runner configuration
//!
//! Tunables for following a run: how often the scheduler is polled, how many
//! consecutive failed status queries an entry tolerates, and which `bkr`
//! executable to drive.

use std::time::Duration;

/// Runner configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerSettings {
    /// Delay between two passes over the watch set
    pub poll_interval: Duration,

    /// Consecutive failed status queries for one recipe before the run is abandoned
    pub max_query_failures: u32,

    /// Path or name of the `bkr` executable
    pub bkr_program: String,
}

impl RunnerSettings {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
    pub const DEFAULT_MAX_QUERY_FAILURES: u32 = 5;
    pub const DEFAULT_BKR_PROGRAM: &'static str = "bkr";

    /// Overrides the poll interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Overrides the query failure limit
    pub fn with_max_query_failures(mut self, max_query_failures: u32) -> Self {
        self.max_query_failures = max_query_failures;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_query_failures == 0 {
            anyhow::bail!("max_query_failures must be greater than 0");
        }

        if self.bkr_program.trim().is_empty() {
            anyhow::bail!("bkr_program cannot be empty");
        }

        Ok(())
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_query_failures: Self::DEFAULT_MAX_QUERY_FAILURES,
            bkr_program: Self::DEFAULT_BKR_PROGRAM.to_string(),
        }
    }
}
