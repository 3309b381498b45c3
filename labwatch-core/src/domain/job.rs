//! Job and recipe domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque job handle returned by the scheduler on submission (e.g. `J:45`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds a job handle from the bare numeric id found in results documents
    pub fn from_numeric(id: &str) -> Self {
        Self(format!("J:{}", id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite recipe identifier, always of the form `R:<numeric id>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(String);

impl RecipeId {
    const PREFIX: &'static str = "R:";

    /// Builds a recipe id from the bare numeric id found in results documents
    pub fn from_numeric(id: &str) -> Self {
        Self(format!("{}{}", Self::PREFIX, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state reported by the scheduler for a job or recipe
///
/// Only `Completed`, `Aborted` and `Cancelled` are terminal. Anything the
/// scheduler reports that is not recognized maps to `Unknown`, which is
/// treated as still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    New,
    Processed,
    Queued,
    Scheduled,
    Waiting,
    Installing,
    Running,
    Reserved,
    Completed,
    Aborted,
    Cancelled,
    Unknown,
}

impl Status {
    /// Parses a status attribute value; unrecognized or missing values are `Unknown`
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("New") => Status::New,
            Some("Processed") => Status::Processed,
            Some("Queued") => Status::Queued,
            Some("Scheduled") => Status::Scheduled,
            Some("Waiting") => Status::Waiting,
            Some("Installing") => Status::Installing,
            Some("Running") => Status::Running,
            Some("Reserved") => Status::Reserved,
            Some("Completed") => Status::Completed,
            Some("Aborted") => Status::Aborted,
            Some("Cancelled") => Status::Cancelled,
            _ => Status::Unknown,
        }
    }

    /// Whether no further transition can occur from this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Aborted | Status::Cancelled)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::New => "New",
            Status::Processed => "Processed",
            Status::Queued => "Queued",
            Status::Scheduled => "Scheduled",
            Status::Waiting => "Waiting",
            Status::Installing => "Installing",
            Status::Running => "Running",
            Status::Reserved => "Reserved",
            Status::Completed => "Completed",
            Status::Aborted => "Aborted",
            Status::Cancelled => "Cancelled",
            Status::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Final classification of a run
///
/// Binary on purpose: only an exact `Pass` result string passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Classifies a raw result attribute
    pub fn from_result(result: Option<&str>) -> Self {
        match result {
            Some("Pass") => Verdict::Pass,
            _ => Verdict::Fail,
        }
    }

    /// Process exit status for this verdict
    pub fn exit_code(&self) -> i32 {
        match self {
            Verdict::Pass => 0,
            Verdict::Fail => 1,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "Pass"),
            Verdict::Fail => write!(f, "Fail"),
        }
    }
}
