//! Verdict aggregation
//!
//! Reads the primary job's root-level result once everything has settled.
//! Diagnostic jobs never contribute.

use anyhow::{Context, Result};
use labwatch_client::Scheduler;
use labwatch_core::domain::job::{JobId, Verdict};
use std::sync::Arc;
use tracing::{info, warn};

/// Computes the verdict of a run from its primary job
pub struct ResultAggregator {
    scheduler: Arc<dyn Scheduler>,
}

impl ResultAggregator {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self { scheduler }
    }

    /// Fetches the primary job and classifies its result
    ///
    /// Only an exact `Pass` passes. A document that cannot be parsed counts
    /// as a failure; a scheduler that cannot be reached is an error.
    pub async fn verdict(&self, job_id: &JobId) -> Result<Verdict> {
        let verdict = match self.scheduler.fetch_results(job_id.as_str()).await {
            Ok(document) => Verdict::from_result(document.result()),
            Err(e) if e.is_parse_error() => {
                warn!("Results of {} are unreadable, counting as failure: {}", job_id, e);
                Verdict::Fail
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to fetch results of {}", job_id));
            }
        };

        info!("{} verdict: {}", job_id, verdict);
        Ok(verdict)
    }
}
