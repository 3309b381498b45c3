//! Labwatch scheduler client
//!
//! Talks to the remote lab scheduler. The scheduler is poll-only: work is
//! submitted as a job document and its progress is observed by querying
//! results documents until everything reaches a terminal state.
//!
//! [`Scheduler`] is the seam the runner depends on; [`BeakerClient`] is the
//! production implementation driving the `bkr` command-line tool.
//!
//! # Example
//!
//! ```no_run
//! use labwatch_client::{BeakerClient, Scheduler};
//!
//! #[tokio::main]
//! async fn main() -> labwatch_client::Result<()> {
//!     let client = BeakerClient::new();
//!     let job_id = client.submit("<job>...</job>", None).await?;
//!     let results = client.fetch_results(job_id.as_str()).await?;
//!     println!("{} is {}", job_id, results.status());
//!     Ok(())
//! }
//! ```

mod beaker;
pub mod error;
pub mod results;
pub mod submission;

pub use beaker::BeakerClient;
pub use error::{ClientError, Result};

use async_trait::async_trait;
use labwatch_core::domain::job::JobId;
use labwatch_core::domain::results::ResultsDocument;

/// Abstract remote scheduler
///
/// Calls are issued one at a time and are not cancellable once started.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Submits a job document, optionally on behalf of another owner
    ///
    /// # Returns
    /// The job id announced by the scheduler, or
    /// [`ClientError::SubmissionFailed`] if the acknowledgment carried none
    async fn submit(&self, document: &str, owner: Option<&str>) -> Result<JobId>;

    /// Queries the current results document of a job (`J:..`) or recipe (`R:..`)
    async fn fetch_results(&self, id: &str) -> Result<ResultsDocument>;
}
