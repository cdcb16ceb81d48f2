//! Row normalization into the canonical [`EngagementEvent`] schema.
//!
//! Every record produces exactly one event. Records that cannot be dated
//! (or whose variant is `Unknown`) come out with `date: None`; dropping them
//! is the pipeline's job, not this module's.
//!
//! # Field resolution
//!
//! Export tools name the same logical field differently across report
//! versions, so each field has an ordered list of candidate columns. The
//! first candidate with a non-blank value wins. Display fields fall back to
//! [`NO_DATA`]; numeric fields the variant does not carry stay `None`.
//!
//! # Numeric coercion
//!
//! Cells feeding a numeric field go through [`coerce_number`]: blank,
//! non-numeric or negative input becomes `0`. This conflates "reported zero"
//! with "not reported" for metrics the variant does carry.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{EngagementEvent, RawRecord, ReportVariant, NO_DATA};

const DATE_COLUMN: &str = "Date";

const LINKEDIN_TITLE_COLUMNS: [&str; 4] = ["Content", "Post text", "Text", "Title"];
const LINKEDIN_ID_COLUMNS: [&str; 4] = ["Post ID", "ID", "Content ID", "id"];
const LINKEDIN_LINK_COLUMNS: [&str; 3] = ["Link", "URL", "Post URL"];

const X_TITLE_COLUMNS: [&str; 3] = ["Text", "Tweet text", "Content"];
const X_ID_COLUMNS: [&str; 3] = ["Tweet ID", "ID", "id"];
const X_LINK_COLUMNS: [&str; 2] = ["Link", "URL"];

const VISITOR_VIEW_COLUMNS: [&str; 2] = ["Page views", "Unique visitors"];
const FOLLOWER_COLUMNS: [&str; 2] = ["Total followers", "Followers"];

/// A date layout an export tool is known to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// `01/15/2024`
    MonthDayYear,
    /// `15/01/2024`
    DayMonthYear,
    /// `2024-01-15`
    Iso,
    /// `Mon, Jan 15, 2024`. The weekday is not checked against the date.
    WeekdayMonthDayYear,
}

/// Patterns tried for LinkedIn exports, in order.
pub const LINKEDIN_DATE_PATTERNS: [DatePattern; 3] = [
    DatePattern::MonthDayYear,
    DatePattern::DayMonthYear,
    DatePattern::Iso,
];

/// Patterns tried for X exports, in order.
pub const X_DATE_PATTERNS: [DatePattern; 2] = [DatePattern::WeekdayMonthDayYear, DatePattern::Iso];

impl DatePattern {
    fn parse(&self, raw: &str) -> Option<NaiveDate> {
        match self {
            DatePattern::MonthDayYear => parse_numeric(raw, "%m/%d/%Y"),
            DatePattern::DayMonthYear => parse_numeric(raw, "%d/%m/%Y"),
            DatePattern::Iso => parse_numeric(raw, "%Y-%m-%d"),
            DatePattern::WeekdayMonthDayYear => {
                let rest = strip_weekday(raw).unwrap_or(raw);
                NaiveDate::parse_from_str(rest.trim(), "%b %d, %Y").ok()
            }
        }
    }
}

/// Parses a numeric layout, retrying on the leading token so a trailing
/// time (`2024-01-15T08:00:00`, `01/15/2024 08:00`) does not reject the row.
fn parse_numeric(raw: &str, fmt: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, fmt).ok().or_else(|| {
        let head = raw.split(['T', ' ']).next()?;
        NaiveDate::parse_from_str(head, fmt).ok()
    })
}

fn strip_weekday(raw: &str) -> Option<&str> {
    let (head, rest) = raw.split_once(',')?;
    let head = head.trim();
    if !head.is_empty() && head.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(rest)
    } else {
        None
    }
}

/// Tries each pattern in order and returns the first successful parse.
pub fn parse_date(raw: &str, patterns: &[DatePattern]) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    patterns.iter().find_map(|p| p.parse(raw))
}

/// Permissive string-to-count conversion. Thousands separators are
/// dropped, fractions round, anything else becomes `0`.
pub fn coerce_number(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return 0;
    }
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => n.round() as u64,
        _ => 0,
    }
}

/// First candidate column holding a non-blank value.
fn first_non_empty<'a>(record: &'a RawRecord, columns: &[&str]) -> Option<&'a str> {
    columns
        .iter()
        .filter_map(|c| record.get(c))
        .map(str::trim)
        .find(|v| !v.is_empty())
}

fn display_field(record: &RawRecord, columns: &[&str]) -> String {
    first_non_empty(record, columns)
        .unwrap_or(NO_DATA)
        .to_string()
}

fn number(record: &RawRecord, column: &str) -> u64 {
    coerce_number(record.get(column))
}

fn event_date(record: &RawRecord, patterns: &[DatePattern]) -> Option<NaiveDate> {
    let raw = record.get(DATE_COLUMN).unwrap_or("");
    let parsed = parse_date(raw, patterns);
    if parsed.is_none() {
        debug!(raw_date = raw, "unparseable date");
    }
    parsed
}

/// Maps one raw record of a known variant into the canonical schema.
pub fn normalize(record: &RawRecord, variant: ReportVariant) -> EngagementEvent {
    let mut event = EngagementEvent::empty(variant);
    match variant {
        ReportVariant::LinkedInContent => {
            event.date = event_date(record, &LINKEDIN_DATE_PATTERNS);
            let title = display_field(record, &LINKEDIN_TITLE_COLUMNS);
            event.content = Some(title.clone());
            event.title = Some(title);
            event.id = Some(display_field(record, &LINKEDIN_ID_COLUMNS));
            event.link = Some(display_field(record, &LINKEDIN_LINK_COLUMNS));

            let clicks = number(record, "Clicks (total)");
            let reactions = number(record, "Reactions (total)");
            let comments = number(record, "Comments (total)");
            let reposts = number(record, "Reposts (total)");
            event.engagements = Some(
                clicks
                    .saturating_add(reactions)
                    .saturating_add(comments)
                    .saturating_add(reposts),
            );
            event.likes = Some(reactions);
            event.comments = Some(comments);
            event.shares = Some(reposts);
            event.views = Some(number(record, "Impressions (total)"));
            event.clicks = Some(clicks);
        }
        ReportVariant::LinkedInVisitors => {
            event.date = event_date(record, &LINKEDIN_DATE_PATTERNS);
            event.views = Some(coerce_number(first_non_empty(record, &VISITOR_VIEW_COLUMNS)));
        }
        ReportVariant::LinkedInFollowers => {
            event.date = event_date(record, &LINKEDIN_DATE_PATTERNS);
            event.followers = Some(coerce_number(first_non_empty(record, &FOLLOWER_COLUMNS)));
        }
        ReportVariant::X => {
            event.date = event_date(record, &X_DATE_PATTERNS);
            let title = display_field(record, &X_TITLE_COLUMNS);
            event.content = Some(title.clone());
            event.title = Some(title);
            event.id = Some(display_field(record, &X_ID_COLUMNS));
            event.link = Some(display_field(record, &X_LINK_COLUMNS));

            event.engagements = Some(number(record, "Engagements"));
            event.likes = Some(number(record, "Likes"));
            event.comments = Some(number(record, "Replies"));
            let shares = number(record, "Shares");
            event.shares = Some(shares.saturating_add(number(record, "Reposts")));
            event.views = Some(number(record, "Impressions"));
            event.clicks = Some(number(record, "Clicks"));
        }
        ReportVariant::Unknown => {
            event.title = Some(NO_DATA.to_string());
            event.id = Some(NO_DATA.to_string());
            event.link = Some(NO_DATA.to_string());
            event.content = Some(String::new());
        }
    }
    event
}
