//! Run orchestration
//!
//! Renders the job template for a published build, submits it and, when
//! asked to wait, follows the job to a verdict.

use anyhow::{Context, Result};
use labwatch_client::Scheduler;
use labwatch_core::domain::job::{JobId, Verdict};
use labwatch_core::template::correlation_id;
use labwatch_core::{JobTemplate, RenderedJob, Substitutions};
use std::sync::Arc;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::config::RunnerSettings;
use crate::scheduler::{WatchLoop, WatchSummary};
use crate::service::ResultAggregator;

/// Whether a run waits for its job to finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Return as soon as the job is submitted
    Submit,
    /// Follow the job (and any diagnostic retries) to a verdict
    UntilComplete,
}

/// What a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// The primary job
    pub job_id: JobId,
    /// Present only for runs that waited
    pub verdict: Option<Verdict>,
    /// Present only for runs that waited
    pub summary: Option<WatchSummary>,
}

impl RunOutcome {
    /// Process exit status: 0 for a plain submission or a passing verdict
    pub fn exit_code(&self) -> i32 {
        self.verdict.map(|v| v.exit_code()).unwrap_or(0)
    }
}

/// Runner submitting jobs to a Beaker lab
pub struct BeakerRunner {
    template: JobTemplate,
    job_owner: Option<String>,
    scheduler: Arc<dyn Scheduler>,
    settings: RunnerSettings,
}

impl BeakerRunner {
    /// Type tag selecting this runner in configuration
    pub const TYPE: &'static str = "beaker";

    /// Creates a new runner
    ///
    /// # Arguments
    /// * `template` - Job template with `##KVER##`, `##KPKG_URL##` and `##UID##` placeholders
    /// * `job_owner` - User to submit jobs on behalf of
    /// * `scheduler` - Remote scheduler
    /// * `settings` - Watch loop tuning
    pub fn new(
        template: JobTemplate,
        job_owner: Option<String>,
        scheduler: Arc<dyn Scheduler>,
        settings: RunnerSettings,
    ) -> Self {
        info!("runner type: {}", Self::TYPE);
        if let Some(owner) = &job_owner {
            info!("job owner: {}", owner);
        }

        Self {
            template,
            job_owner,
            scheduler,
            settings,
        }
    }

    pub fn job_owner(&self) -> Option<&str> {
        self.job_owner.as_deref()
    }

    /// Renders the job document for a build
    pub fn render(&self, artifact_url: &str, release: &str) -> RenderedJob {
        self.template
            .render(&Substitutions::for_build(artifact_url, release))
    }

    /// Submits a job for a build and optionally waits for its verdict
    ///
    /// # Arguments
    /// * `artifact_url` - Where the lab can fetch the build
    /// * `release` - Release string of the build
    /// * `wait` - Whether to follow the job to completion
    ///
    /// # Returns
    /// The submitted job and, for waited runs, its verdict. A submission that
    /// yields no job id is an error carrying
    /// [`labwatch_client::ClientError::SubmissionFailed`].
    pub async fn run(&self, artifact_url: &str, release: &str, wait: WaitMode) -> Result<RunOutcome> {
        let span = info_span!(
            "run",
            run_id = %Uuid::new_v4(),
            uid = correlation_id(artifact_url)
        );

        self.submit_and_follow(artifact_url, release, wait)
            .instrument(span)
            .await
    }

    async fn submit_and_follow(
        &self,
        artifact_url: &str,
        release: &str,
        wait: WaitMode,
    ) -> Result<RunOutcome> {
        info!("Submitting job for {} ({})", artifact_url, release);
        let job = self.render(artifact_url, release);

        let job_id = self
            .scheduler
            .submit(job.as_str(), self.job_owner.as_deref())
            .await
            .context("Failed to submit job")?;
        info!("Submitted {}", job_id);

        if wait == WaitMode::Submit {
            return Ok(RunOutcome {
                job_id,
                verdict: None,
                summary: None,
            });
        }

        let mut watcher = WatchLoop::new(
            Arc::clone(&self.scheduler),
            &self.settings,
            self.job_owner.clone(),
        );
        watcher.watch_job(job_id.clone(), true);
        let summary = watcher
            .run()
            .await
            .with_context(|| format!("Failed to follow {}", job_id))?;

        let verdict = ResultAggregator::new(Arc::clone(&self.scheduler))
            .verdict(&job_id)
            .await?;

        Ok(RunOutcome {
            job_id,
            verdict: Some(verdict),
            summary: Some(summary),
        })
    }
}
