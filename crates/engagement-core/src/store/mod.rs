//! Session storage abstraction.
//!
//! The [`EventStore`] trait is the only way events accumulate across
//! uploads. Writes go through [`merge`](EventStore::merge) and
//! [`reset`](EventStore::reset); reads return owned snapshots, so a caller
//! can never mutate stored events in place.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`merge`](EventStore::merge) | Append a validated batch, skipping already-seen events |
//! | [`query`](EventStore::query) | Snapshot filtered by platform and date range |
//! | [`reset`](EventStore::reset) | Drop everything (explicit session reset) |
//! | [`record_source`](EventStore::record_source) | Remember a contributing file name |

pub mod memory;

use serde::Serialize;

use crate::models::{parse_platform_filter, EngagementEvent, Platform};
use crate::range::DateRange;

/// Platform and date-range filter for [`EventStore::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFilter {
    /// `None` keeps every platform.
    pub platform: Option<Platform>,
    pub range: DateRange,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            platform: None,
            range: DateRange::All,
        }
    }
}

impl EventFilter {
    pub fn new(platform: Option<Platform>, range: DateRange) -> Self {
        Self { platform, range }
    }

    /// Builds a filter from the labels a presentation layer holds, where an
    /// absent value or `All` means unbounded.
    pub fn from_labels(platform: Option<&str>, range: Option<&str>) -> Result<Self, String> {
        Ok(Self {
            platform: platform.map(parse_platform_filter).transpose()?.flatten(),
            range: range
                .map(str::parse::<DateRange>)
                .transpose()?
                .unwrap_or(DateRange::All),
        })
    }
}

/// What a [`EventStore::merge`] call did with its batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub added: usize,
    /// Events whose dedup key was already present (first-seen wins).
    pub duplicates: usize,
    /// Undated events refused at the store boundary.
    pub rejected: usize,
}

/// Accumulator of engagement events for one session.
pub trait EventStore {
    /// Append a batch, deduplicating on [`EngagementEvent::dedup_key`].
    fn merge(&mut self, events: Vec<EngagementEvent>) -> MergeReport;

    /// Events matching `filter`, in insertion order.
    ///
    /// The date window is anchored at the latest date among events that
    /// pass the platform filter.
    fn query(&self, filter: &EventFilter) -> Vec<EngagementEvent>;

    /// Remove every event and recorded source.
    fn reset(&mut self);

    /// Remember the display name of a file that contributed events.
    /// Names are kept once, in first-seen order.
    fn record_source(&mut self, name: &str);

    fn sources(&self) -> Vec<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
