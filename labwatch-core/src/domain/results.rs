//! Parsed results documents
//!
//! The scheduler answers a status query with a tree-shaped document whose root
//! is either a whole job or a single recipe, depending on which id was
//! queried. [`ResultsDocument`] keeps both shapes and lets callers pick the
//! accessor they need.

use serde::{Deserialize, Serialize};

use super::job::{JobId, RecipeId, Status};

/// Result of a status query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultsDocument {
    Job(JobResults),
    Recipe(RecipeResults),
}

impl ResultsDocument {
    /// Root-level status
    pub fn status(&self) -> Status {
        match self {
            ResultsDocument::Job(job) => job.status,
            ResultsDocument::Recipe(recipe) => recipe.status,
        }
    }

    /// Root-level result attribute, if any
    pub fn result(&self) -> Option<&str> {
        match self {
            ResultsDocument::Job(job) => job.result.as_deref(),
            ResultsDocument::Recipe(recipe) => recipe.result.as_deref(),
        }
    }

    pub fn as_job(&self) -> Option<&JobResults> {
        match self {
            ResultsDocument::Job(job) => Some(job),
            ResultsDocument::Recipe(_) => None,
        }
    }

    pub fn as_recipe(&self) -> Option<&RecipeResults> {
        match self {
            ResultsDocument::Recipe(recipe) => Some(recipe),
            ResultsDocument::Job(_) => None,
        }
    }

    /// Finds a recipe either at the root or among the job's recipe-sets
    pub fn find_recipe(&self, id: &RecipeId) -> Option<&RecipeResults> {
        match self {
            ResultsDocument::Recipe(recipe) if &recipe.id == id => Some(recipe),
            ResultsDocument::Recipe(_) => None,
            ResultsDocument::Job(job) => job.recipes.iter().find(|r| &r.id == id),
        }
    }
}

/// A job-rooted results document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResults {
    pub id: Option<JobId>,
    pub status: Status,
    pub result: Option<String>,
    /// Free-text label attached to the job
    pub whiteboard: Option<String>,
    /// Recipes under every recipe-set, in document order
    pub recipes: Vec<RecipeResults>,
}

/// A single recipe, either at the root or nested under a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeResults {
    pub id: RecipeId,
    pub status: Status,
    pub result: Option<String>,
    /// Host the recipe ran on
    pub system: Option<String>,
    /// What is needed to submit this recipe again
    pub request: RecipeRequest,
}

/// The request-defining parts of a recipe
///
/// Child elements are kept as raw markup exactly as the scheduler returned
/// them, so they can be embedded in a new job without re-encoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeRequest {
    /// Recipe attributes that shape the request (kernel options, role, ...)
    pub attributes: Vec<(String, String)>,
    /// Raw `<hostRequires>` element, if the recipe had one
    pub host_requires: Option<String>,
    /// Raw markup of every other child element, in document order
    pub elements: Vec<String>,
}
