//! Core domain types
//!
//! These types describe what the remote lab scheduler reports back about
//! submitted work. They are shared between the client adapter (which parses
//! them) and the runner (which acts on them).

pub mod job;
pub mod results;
