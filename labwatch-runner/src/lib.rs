//! Labwatch Runner
//!
//! Submits test jobs to the remote lab scheduler and follows them to a
//! verdict without any push notification from the scheduler.
//!
//! Architecture:
//! - Configuration: poll cadence and failure tolerance ([`RunnerSettings`]),
//!   runner selection by type tag ([`RunnerConfig`])
//! - Scheduler: the watch set and the drain-to-empty watch loop, including
//!   diagnostic resubmission of failed recipes
//! - Services: verdict aggregation and the top-level run orchestration

pub mod config;
pub mod diagnostic;
pub mod registry;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::RunnerSettings;
pub use registry::{BeakerConfig, Runner, RunnerConfig};
pub use scheduler::{WatchEntry, WatchLoop, WatchSet, WatchSummary};
pub use service::{BeakerRunner, ResultAggregator, RunOutcome, WaitMode};
