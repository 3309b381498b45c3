//! Service layer
//!
//! Services contain the run-level logic: rendering and submitting the
//! primary job, following it through the watch loop and turning its final
//! state into a verdict.

mod aggregator;
mod orchestrator;

pub use aggregator::ResultAggregator;
pub use orchestrator::{BeakerRunner, RunOutcome, WaitMode};
