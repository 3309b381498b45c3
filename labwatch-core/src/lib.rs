//! Labwatch Core
//!
//! Core types and abstractions for the labwatch test-job coordinator.
//!
//! This crate contains:
//! - Domain types: identifiers, lifecycle states and parsed results documents
//! - Templates: job-description templates and placeholder substitution

pub mod domain;
pub mod template;

pub use template::{JobTemplate, RenderedJob, Substitutions};
