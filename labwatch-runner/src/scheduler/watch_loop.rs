//! Watch loop
//!
//! Follows every watched recipe until it reaches a terminal state. The loop
//! is a single sequential consumer over a set that can grow while it runs:
//! failed recipes that are eligible for rescheduling spawn two diagnostic
//! jobs whose recipes join the set, never eligible themselves. A submitted
//! job whose recipes cannot be listed yet stays pending and is expanded on a
//! later pass. The loop ends exactly when the set and the pending jobs are
//! both empty.

use anyhow::{Context, Result};
use labwatch_client::Scheduler;
use labwatch_core::domain::job::{JobId, Status, Verdict};
use labwatch_core::domain::results::{RecipeResults, ResultsDocument};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::RunnerSettings;
use crate::diagnostic::DiagnosticJob;
use crate::scheduler::watch_set::{WatchEntry, WatchSet};

/// What happened to the recipes a loop followed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    /// Recipes that reached `Completed` or `Aborted`
    pub finished: usize,
    /// Recipes that reached `Cancelled`
    pub cancelled: usize,
    /// Diagnostic jobs submitted
    pub rescheduled: usize,
    /// Passes made over the watch set
    pub iterations: u64,
}

/// A submitted job whose recipes are not known yet
#[derive(Debug, Clone)]
struct PendingJob {
    job_id: JobId,
    reschedule: bool,
    query_failures: u32,
}

/// Drain-to-empty poller over a [`WatchSet`]
pub struct WatchLoop {
    scheduler: Arc<dyn Scheduler>,
    poll_interval: Duration,
    max_query_failures: u32,
    job_owner: Option<String>,
    watch_set: WatchSet,
    pending: Vec<PendingJob>,
    /// Whiteboard of the first job registered, reused for diagnostic jobs
    whiteboard: Option<String>,
    summary: WatchSummary,
}

impl WatchLoop {
    /// Creates an empty loop
    ///
    /// # Arguments
    /// * `scheduler` - Remote scheduler to poll and resubmit to
    /// * `settings` - Poll interval and query failure tolerance
    /// * `job_owner` - Owner diagnostic jobs are submitted for
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        settings: &RunnerSettings,
        job_owner: Option<String>,
    ) -> Self {
        Self {
            scheduler,
            poll_interval: settings.poll_interval,
            max_query_failures: settings.max_query_failures,
            job_owner,
            watch_set: WatchSet::new(),
            pending: Vec::new(),
            whiteboard: None,
            summary: WatchSummary::default(),
        }
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }

    /// Submitted jobs still waiting for their recipes to be listed
    pub fn pending_jobs(&self) -> impl Iterator<Item = &JobId> {
        self.pending.iter().map(|pending| &pending.job_id)
    }

    pub fn whiteboard(&self) -> Option<&str> {
        self.whiteboard.as_deref()
    }

    pub fn summary(&self) -> WatchSummary {
        self.summary
    }

    /// Queues a submitted job; its recipes are listed on the next pass
    ///
    /// A failed listing keeps the job pending until `max_query_failures`
    /// consecutive attempts have failed.
    pub fn watch_job(&mut self, job_id: JobId, reschedule: bool) {
        let queued = self
            .pending
            .iter()
            .any(|pending| pending.job_id == job_id && pending.reschedule == reschedule);
        if !queued {
            self.pending.push(PendingJob {
                job_id,
                reschedule,
                query_failures: 0,
            });
        }
    }

    /// Starts watching every recipe of a job right away
    ///
    /// The first job registered also supplies the whiteboard used to label
    /// diagnostic jobs.
    ///
    /// # Returns
    /// The number of new watch entries
    pub async fn register_job(&mut self, job_id: &JobId, reschedule: bool) -> Result<usize> {
        let document = self
            .scheduler
            .fetch_results(job_id.as_str())
            .await
            .with_context(|| format!("Failed to fetch results of {}", job_id))?;

        let recipes = match &document {
            ResultsDocument::Job(job) => {
                if self.whiteboard.is_none() {
                    self.whiteboard = job.whiteboard.clone();
                }
                job.recipes.iter().collect::<Vec<_>>()
            }
            ResultsDocument::Recipe(recipe) => vec![recipe],
        };

        let mut added = 0;
        for recipe in recipes {
            if self
                .watch_set
                .insert(WatchEntry::new(recipe.id.clone(), reschedule))
            {
                debug!("watching {} (reschedule: {})", recipe.id, reschedule);
                added += 1;
            }
        }

        if added == 0 {
            warn!("{} has no recipes to watch", job_id);
        } else {
            info!("watching {} recipe(s) of {}", added, job_id);
        }

        Ok(added)
    }

    /// Polls until every watched recipe is terminal
    ///
    /// The first pass polls immediately; later passes wait one poll interval.
    pub async fn run(&mut self) -> Result<WatchSummary> {
        info!(
            "Watching {} recipe(s) and {} pending job(s) (interval: {:?})",
            self.watch_set.len(),
            self.pending.len(),
            self.poll_interval
        );

        let mut first = true;
        while !self.watch_set.is_empty() || !self.pending.is_empty() {
            if !first {
                tokio::time::sleep(self.poll_interval).await;
            }
            first = false;

            self.poll_iteration().await?;
        }

        info!(
            "All recipes settled: {} finished, {} cancelled, {} diagnostic job(s)",
            self.summary.finished, self.summary.cancelled, self.summary.rescheduled
        );

        Ok(self.summary)
    }

    /// Performs one pass: expands pending jobs, then polls a snapshot of the
    /// watch set
    ///
    /// Entries added while polling are first polled on the next pass.
    pub async fn poll_iteration(&mut self) -> Result<()> {
        self.summary.iterations += 1;
        self.expand_pending().await?;

        debug!(
            "Poll pass {} over {} recipe(s)",
            self.summary.iterations,
            self.watch_set.len()
        );

        for entry in self.watch_set.snapshot() {
            self.poll_entry(&entry).await?;
        }

        Ok(())
    }

    async fn expand_pending(&mut self) -> Result<()> {
        for mut pending in std::mem::take(&mut self.pending) {
            let Err(e) = self.register_job(&pending.job_id, pending.reschedule).await else {
                continue;
            };

            pending.query_failures += 1;
            warn!(
                "Listing recipes of {} failed ({}/{}): {:#}",
                pending.job_id, pending.query_failures, self.max_query_failures, e
            );

            if pending.query_failures >= self.max_query_failures {
                anyhow::bail!(
                    "Giving up on {} after {} consecutive failed status queries: {:#}",
                    pending.job_id,
                    pending.query_failures,
                    e
                );
            }
            self.pending.push(pending);
        }

        Ok(())
    }

    async fn poll_entry(&mut self, entry: &WatchEntry) -> Result<()> {
        let document = match self.scheduler.fetch_results(entry.recipe_id.as_str()).await {
            Ok(document) => document,
            Err(e) => return self.query_failed(entry, &e.to_string()),
        };

        let Some(recipe) = document.find_recipe(&entry.recipe_id) else {
            return self.query_failed(entry, "results do not describe the recipe");
        };
        self.watch_set.reset_query_failures(entry);

        if !recipe.status.is_terminal() {
            debug!("{} is {}", entry.recipe_id, recipe.status);
            return Ok(());
        }

        let watched = self.watch_set.remove(entry);
        info!(
            "{} status changed to '{}' (result: {}, watched {}s)",
            entry.recipe_id,
            recipe.status,
            recipe.result.as_deref().unwrap_or("none"),
            watched.map(|d| d.num_seconds()).unwrap_or_default()
        );

        if recipe.status == Status::Cancelled {
            self.summary.cancelled += 1;
            return Ok(());
        }
        self.summary.finished += 1;

        if entry.reschedule && Verdict::from_result(recipe.result.as_deref()) != Verdict::Pass {
            self.reschedule(recipe).await;
        }

        Ok(())
    }

    /// Records a failed or unusable status query; the entry stays watched
    fn query_failed(&mut self, entry: &WatchEntry, reason: &str) -> Result<()> {
        let failures = self.watch_set.record_query_failure(entry);
        warn!(
            "Status query for {} failed ({}/{}): {}",
            entry.recipe_id, failures, self.max_query_failures, reason
        );

        if failures >= self.max_query_failures {
            anyhow::bail!(
                "Giving up on {} after {} consecutive failed status queries: {}",
                entry.recipe_id,
                failures,
                reason
            );
        }

        Ok(())
    }

    /// Submits the same-host and fresh-host diagnostic jobs for a failed recipe
    ///
    /// Submission problems are logged and never abort the loop.
    async fn reschedule(&mut self, recipe: &RecipeResults) {
        let whiteboard = self.whiteboard.clone().unwrap_or_default();
        let mut jobs = Vec::with_capacity(2);

        match DiagnosticJob::same_host(recipe, &whiteboard) {
            Some(job) => jobs.push(job),
            None => warn!(
                "{} does not name its host, skipping the same-host retry",
                recipe.id
            ),
        }
        jobs.push(DiagnosticJob::fresh_host(recipe, &whiteboard));

        for job in jobs {
            info!("{} failed, submitting {} retry", recipe.id, job.placement());

            let job_id = match self
                .scheduler
                .submit(&job.to_xml(), self.job_owner.as_deref())
                .await
            {
                Ok(job_id) => job_id,
                Err(e) => {
                    warn!(
                        "Failed to submit {} retry of {}: {}",
                        job.placement(),
                        recipe.id,
                        e
                    );
                    continue;
                }
            };

            self.summary.rescheduled += 1;

            if let Err(e) = self.register_job(&job_id, false).await {
                warn!("Recipes of retry job {} not listed yet: {:#}", job_id, e);
                self.pending.push(PendingJob {
                    job_id,
                    reschedule: false,
                    query_failures: 1,
                });
            }
        }
    }
}
