//! Scheduler layer for the runner
//!
//! This layer follows submitted work on the remote scheduler: it tracks the
//! recipes of a run, polls them on a fixed cadence and queues diagnostic
//! resubmissions for failures until nothing is left to watch.

pub mod watch_loop;
pub mod watch_set;

pub use watch_loop::{WatchLoop, WatchSummary};
pub use watch_set::{WatchEntry, WatchSet};
