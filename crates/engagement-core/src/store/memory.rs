//! In-memory [`EventStore`] holding one session's events.
//!
//! Owned by the top-level application context and passed to whatever needs
//! it. There is a single writer, so no locking.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{DedupKey, EngagementEvent};

use super::{EventFilter, EventStore, MergeReport};

#[derive(Debug, Default)]
pub struct SessionStore {
    events: Vec<EngagementEvent>,
    seen: HashSet<DedupKey>,
    sources: Vec<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of everything stored, in insertion order.
    pub fn events(&self) -> &[EngagementEvent] {
        &self.events
    }
}

impl EventStore for SessionStore {
    fn merge(&mut self, events: Vec<EngagementEvent>) -> MergeReport {
        let mut report = MergeReport::default();
        for event in events {
            if !event.is_valid() {
                report.rejected += 1;
                continue;
            }
            if self.seen.insert(event.dedup_key()) {
                self.events.push(event);
                report.added += 1;
            } else {
                report.duplicates += 1;
            }
        }
        debug!(
            added = report.added,
            duplicates = report.duplicates,
            rejected = report.rejected,
            total = self.events.len(),
            "merged batch"
        );
        report
    }

    fn query(&self, filter: &EventFilter) -> Vec<EngagementEvent> {
        let platform_matches: Vec<&EngagementEvent> = self
            .events
            .iter()
            .filter(|e| filter.platform.is_none() || e.platform == filter.platform)
            .collect();

        let anchor = platform_matches.iter().filter_map(|e| e.date).max();
        let Some(anchor) = anchor else {
            return Vec::new();
        };

        platform_matches
            .into_iter()
            .filter(|e| e.date.is_some_and(|d| filter.range.contains(anchor, d)))
            .cloned()
            .collect()
    }

    fn reset(&mut self) {
        self.events.clear();
        self.seen.clear();
        self.sources.clear();
    }

    fn record_source(&mut self, name: &str) {
        if !self.sources.iter().any(|s| s == name) {
            self.sources.push(name.to_string());
        }
    }

    fn sources(&self) -> Vec<String> {
        self.sources.clone()
    }

    fn len(&self) -> usize {
        self.events.len()
    }
}
