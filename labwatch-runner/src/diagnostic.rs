//! Diagnostic follow-up jobs
//!
//! When a watched recipe fails, two new single-recipe jobs are built from it:
//! one pinned to the host it failed on, one free to land anywhere. Comparing
//! the two tells host flakiness apart from a regression in the build.
//!
//! The new job is assembled from the fields it needs (recipe id, host,
//! request body, whiteboard) rather than by editing the results document.

use labwatch_core::domain::job::RecipeId;
use labwatch_core::domain::results::{RecipeRequest, RecipeResults};
use quick_xml::escape::escape;
use std::fmt;

/// Where a diagnostic job may run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Pinned to the host the original recipe ran on
    SameHost(String),
    /// Any host satisfying the original requirements
    AnyHost,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::SameHost(host) => write!(f, "same-host ({})", host),
            Placement::AnyHost => write!(f, "fresh-host"),
        }
    }
}

/// A single-recipe job re-running a failed recipe
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticJob {
    origin: RecipeId,
    placement: Placement,
    whiteboard: String,
    request: RecipeRequest,
}

impl DiagnosticJob {
    /// Retention tag applied to every diagnostic job
    pub const RETENTION_TAG: &'static str = "audit";

    /// Builds the host-pinned variant
    ///
    /// Returns `None` when the recipe does not say which host it ran on.
    pub fn same_host(recipe: &RecipeResults, whiteboard: &str) -> Option<Self> {
        let host = recipe.system.clone()?;
        Some(Self {
            origin: recipe.id.clone(),
            whiteboard: format!("{} ({})", label(whiteboard, &recipe.id), host),
            placement: Placement::SameHost(host),
            request: recipe.request.clone(),
        })
    }

    /// Builds the unpinned variant
    pub fn fresh_host(recipe: &RecipeResults, whiteboard: &str) -> Self {
        Self {
            origin: recipe.id.clone(),
            whiteboard: label(whiteboard, &recipe.id),
            placement: Placement::AnyHost,
            request: recipe.request.clone(),
        }
    }

    pub fn origin(&self) -> &RecipeId {
        &self.origin
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn whiteboard(&self) -> &str {
        &self.whiteboard
    }

    /// Serializes the job document to submit
    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<job retention_tag="{}"><whiteboard>{}</whiteboard><recipeSet><recipe"#,
            Self::RETENTION_TAG,
            escape(self.whiteboard.as_str())
        );

        for (name, value) in &self.request.attributes {
            xml.push_str(&format!(r#" {}="{}""#, name, escape(value.as_str())));
        }
        xml.push('>');

        match &self.placement {
            Placement::SameHost(host) => xml.push_str(&format!(
                r#"<hostRequires><hostname op="=" value="{}"/></hostRequires>"#,
                escape(host.as_str())
            )),
            Placement::AnyHost => {
                if let Some(host_requires) = &self.request.host_requires {
                    xml.push_str(host_requires);
                }
            }
        }

        for element in &self.request.elements {
            xml.push_str(element);
        }

        xml.push_str("</recipe></recipeSet></job>");
        xml
    }
}

/// `<whiteboard> [R:<id>]`, or just the bracketed id when there is no whiteboard
fn label(whiteboard: &str, origin: &RecipeId) -> String {
    let whiteboard = whiteboard.trim();
    if whiteboard.is_empty() {
        format!("[{}]", origin)
    } else {
        format!("{} [{}]", whiteboard, origin)
    }
}
