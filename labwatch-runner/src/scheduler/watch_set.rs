//! Watch set
//!
//! The recipes a run is currently following. An entry exists from the moment
//! its recipe is registered until the recipe is seen in a terminal state.

use chrono::{DateTime, Utc};
use labwatch_core::domain::job::RecipeId;
use std::collections::BTreeMap;

/// A followed recipe and whether it may be rescheduled on failure
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchEntry {
    pub recipe_id: RecipeId,
    pub reschedule: bool,
}

impl WatchEntry {
    pub fn new(recipe_id: RecipeId, reschedule: bool) -> Self {
        Self {
            recipe_id,
            reschedule,
        }
    }
}

#[derive(Debug, Clone)]
struct EntryState {
    added_at: DateTime<Utc>,
    query_failures: u32,
}

/// Unique collection of watch entries
#[derive(Debug, Default)]
pub struct WatchSet {
    entries: BTreeMap<WatchEntry, EntryState>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry; returns `false` if it was already watched
    pub fn insert(&mut self, entry: WatchEntry) -> bool {
        if self.entries.contains_key(&entry) {
            return false;
        }

        self.entries.insert(
            entry,
            EntryState {
                added_at: Utc::now(),
                query_failures: 0,
            },
        );
        true
    }

    /// Removes an entry, returning how long it was watched
    pub fn remove(&mut self, entry: &WatchEntry) -> Option<chrono::Duration> {
        self.entries
            .remove(entry)
            .map(|state| Utc::now().signed_duration_since(state.added_at))
    }

    pub fn contains(&self, entry: &WatchEntry) -> bool {
        self.entries.contains_key(entry)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Copy of the current entries, safe to iterate while the set changes
    pub fn snapshot(&self) -> Vec<WatchEntry> {
        self.entries.keys().cloned().collect()
    }

    /// Counts a failed status query; returns the consecutive failure count
    pub fn record_query_failure(&mut self, entry: &WatchEntry) -> u32 {
        match self.entries.get_mut(entry) {
            Some(state) => {
                state.query_failures += 1;
                state.query_failures
            }
            None => 0,
        }
    }

    pub fn reset_query_failures(&mut self, entry: &WatchEntry) {
        if let Some(state) = self.entries.get_mut(entry) {
            state.query_failures = 0;
        }
    }
}
