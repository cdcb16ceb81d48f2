//! Derived views over a store snapshot.
//!
//! Each function takes an already-filtered slice (usually the output of
//! [`EventStore::query`](crate::store::EventStore::query)) and computes the
//! aggregate one dashboard panel shows. None of them know about source
//! formats. A metric the event does not carry counts as `0`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{EngagementEvent, Metric, Platform, ReportVariant};

/// Headline numbers for the overview card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total_engagements: u64,
    /// Rounded to the nearest integer; `0` when there are no events.
    pub avg_engagements: u64,
    pub total_events: usize,
}

pub fn overview(events: &[EngagementEvent]) -> Overview {
    let total_engagements = events
        .iter()
        .map(|e| e.engagements.unwrap_or(0))
        .fold(0, u64::saturating_add);
    let avg_engagements = if events.is_empty() {
        0
    } else {
        (total_engagements as f64 / events.len() as f64).round() as u64
    };
    Overview {
        total_engagements,
        avg_engagements,
        total_events: events.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformShare {
    pub platform: Platform,
    pub engagements: u64,
    /// Share of all engagements in the slice, `0.0..=100.0`.
    pub percent: f64,
}

/// Engagements per platform, in order of first appearance.
pub fn platform_breakdown(events: &[EngagementEvent]) -> Vec<PlatformShare> {
    let mut shares: Vec<PlatformShare> = Vec::new();
    for event in events {
        let Some(platform) = event.platform else {
            continue;
        };
        let value = event.engagements.unwrap_or(0);
        match shares.iter_mut().find(|s| s.platform == platform) {
            Some(share) => share.engagements = share.engagements.saturating_add(value),
            None => shares.push(PlatformShare {
                platform,
                engagements: value,
                percent: 0.0,
            }),
        }
    }
    let total = shares
        .iter()
        .map(|s| s.engagements)
        .fold(0, u64::saturating_add);
    if total > 0 {
        for share in &mut shares {
            share.percent = share.engagements as f64 * 100.0 / total as f64;
        }
    }
    shares
}

/// One calendar cell: a metric summed per platform for a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub per_platform: BTreeMap<Platform, u64>,
    pub total: u64,
}

/// Metric totals per date, dates ascending. Dates with no events are absent.
pub fn daily_totals(events: &[EngagementEvent], metric: Metric) -> Vec<DailyTotal> {
    let mut by_date: BTreeMap<NaiveDate, BTreeMap<Platform, u64>> = BTreeMap::new();
    for event in events {
        let (Some(date), Some(platform)) = (event.date, event.platform) else {
            continue;
        };
        let cell = by_date
            .entry(date)
            .or_default()
            .entry(platform)
            .or_insert(0);
        *cell = cell.saturating_add(event.metric(metric).unwrap_or(0));
    }
    by_date
        .into_iter()
        .map(|(date, per_platform)| DailyTotal {
            date,
            total: per_platform.values().copied().fold(0, u64::saturating_add),
            per_platform,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayValue {
    pub date: NaiveDate,
    pub value: u64,
    /// Events that contributed to `value`.
    pub posts: usize,
}

/// Strongest and weakest days for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiDays {
    pub platform: Platform,
    pub best: Vec<DayValue>,
    pub worst: Vec<DayValue>,
}

/// Per platform (first-appearance order), the `n` highest and `n` lowest
/// days by summed metric. Ties go to the more recent date.
pub fn best_and_worst_days(events: &[EngagementEvent], metric: Metric, n: usize) -> Vec<KpiDays> {
    let mut platforms: Vec<Platform> = Vec::new();
    for p in events.iter().filter_map(|e| e.platform) {
        if !platforms.contains(&p) {
            platforms.push(p);
        }
    }

    platforms
        .into_iter()
        .map(|platform| {
            let mut days: BTreeMap<NaiveDate, DayValue> = BTreeMap::new();
            for event in events.iter().filter(|e| e.platform == Some(platform)) {
                let Some(date) = event.date else {
                    continue;
                };
                let day = days.entry(date).or_insert(DayValue {
                    date,
                    value: 0,
                    posts: 0,
                });
                day.value = day.value.saturating_add(event.metric(metric).unwrap_or(0));
                day.posts += 1;
            }
            // most recent first, so stable sorts break ties toward recent days
            let recent_first: Vec<DayValue> = days.into_values().rev().collect();

            let mut best = recent_first.clone();
            best.sort_by(|a, b| b.value.cmp(&a.value));
            best.truncate(n);

            let mut worst = recent_first;
            worst.sort_by(|a, b| a.value.cmp(&b.value));
            worst.truncate(n);

            KpiDays {
                platform,
                best,
                worst,
            }
        })
        .collect()
}

/// Events by engagements, highest first. Equal scores keep input order.
pub fn top_content(events: &[EngagementEvent], limit: usize) -> Vec<EngagementEvent> {
    let mut ranked: Vec<EngagementEvent> = events.to_vec();
    ranked.sort_by(|a, b| b.engagements.unwrap_or(0).cmp(&a.engagements.unwrap_or(0)));
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowerPoint {
    pub date: NaiveDate,
    pub followers: u64,
}

/// Follower counts from LinkedIn follower reports, oldest first.
/// Rows reporting zero followers are skipped.
pub fn follower_series(events: &[EngagementEvent]) -> Vec<FollowerPoint> {
    let mut points: Vec<FollowerPoint> = events
        .iter()
        .filter(|e| e.source_type == ReportVariant::LinkedInFollowers)
        .filter_map(|e| match (e.date, e.followers) {
            (Some(date), Some(followers)) if followers > 0 => Some(FollowerPoint { date, followers }),
            _ => None,
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}
