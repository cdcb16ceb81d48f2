//! Core data models used throughout Engagement Harness.
//!
//! These types represent the records and events that flow through the
//! ingestion pipeline: a [`RawRecord`] comes out of the decoder, gets a
//! [`ReportVariant`] from the classifier, and is turned into one
//! [`EngagementEvent`] by the normalizer.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Sentinel for display fields the source report does not carry.
pub const NO_DATA: &str = "no data";

/// Canonical serialized date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One decoded data row, keyed by the literal column names of the file.
///
/// Column order follows the header row. Names are kept exactly as they
/// appear in the source (surrounding whitespace included); lookups compare
/// trimmed names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.push((column.into(), value.into()));
    }

    /// Value of the first column whose trimmed name equals `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        let wanted = column.trim();
        self.fields
            .iter()
            .find(|(name, _)| name.trim() == wanted)
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed column names, in header order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.trim())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().any(|name| name == column)
    }

    /// True when every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Source-report variant a record was exported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ReportVariant {
    LinkedInContent,
    LinkedInVisitors,
    LinkedInFollowers,
    X,
    Unknown,
}

impl ReportVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportVariant::LinkedInContent => "LinkedInContent",
            ReportVariant::LinkedInVisitors => "LinkedInVisitors",
            ReportVariant::LinkedInFollowers => "LinkedInFollowers",
            ReportVariant::X => "X",
            ReportVariant::Unknown => "Unknown",
        }
    }

    /// Platform the variant's export tool belongs to.
    pub fn platform(&self) -> Option<Platform> {
        match self {
            ReportVariant::LinkedInContent
            | ReportVariant::LinkedInVisitors
            | ReportVariant::LinkedInFollowers => Some(Platform::LinkedIn),
            ReportVariant::X => Some(Platform::X),
            ReportVariant::Unknown => None,
        }
    }
}

impl fmt::Display for ReportVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Social platform an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Platform {
    LinkedIn,
    X,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "LinkedIn",
            Platform::X => "X",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Ok(Platform::LinkedIn),
            "x" | "twitter" => Ok(Platform::X),
            other => Err(format!(
                "unknown platform: '{}'. Must be LinkedIn or X",
                other
            )),
        }
    }
}

/// Parses a platform filter where `All` (or empty) means no filter.
pub fn parse_platform_filter(s: &str) -> Result<Option<Platform>, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

/// Numeric metric carried by an [`EngagementEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Engagements,
    Likes,
    Comments,
    Shares,
    Views,
    Clicks,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Engagements,
        Metric::Likes,
        Metric::Comments,
        Metric::Shares,
        Metric::Views,
        Metric::Clicks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Engagements => "engagements",
            Metric::Likes => "likes",
            Metric::Comments => "comments",
            Metric::Shares => "shares",
            Metric::Views => "views",
            Metric::Clicks => "clicks",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        // "impressions" is what the export tools call views
        if wanted == "impressions" {
            return Ok(Metric::Views);
        }
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown metric: '{}'. Must be one of engagements, likes, comments, shares, views, clicks",
                    s.trim()
                )
            })
    }
}

/// Canonical, platform-agnostic unit of one post's (or one day's) metrics.
///
/// Numeric fields are `None` when the report variant does not carry that
/// metric, and `Some(0)` when it does but the source cell was blank.
/// Display fields are `None` when the variant has no such concept and
/// [`NO_DATA`] when the variant has it but the file did not.
///
/// `date` is `None` only for records the normalizer could not date; the
/// pipeline drops those before anything reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementEvent {
    #[serde(serialize_with = "serialize_date")]
    pub date: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_platform")]
    pub platform: Option<Platform>,
    pub source_type: ReportVariant,
    pub title: Option<String>,
    pub content: Option<String>,
    pub id: Option<String>,
    pub link: Option<String>,
    pub engagements: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub shares: Option<u64>,
    pub views: Option<u64>,
    pub clicks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
}

/// Composite identity used by the session store to drop re-uploaded rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    pub date: Option<NaiveDate>,
    pub platform: Option<Platform>,
    pub source_type: ReportVariant,
    pub label: String,
}

impl EngagementEvent {
    /// An event with only identity fields set; every optional field is `None`.
    pub fn empty(source_type: ReportVariant) -> Self {
        Self {
            date: None,
            platform: source_type.platform(),
            source_type,
            title: None,
            content: None,
            id: None,
            link: None,
            engagements: None,
            likes: None,
            comments: None,
            shares: None,
            views: None,
            clicks: None,
            followers: None,
        }
    }

    /// True when the event carries a date and may enter a store.
    pub fn is_valid(&self) -> bool {
        self.date.is_some()
    }

    /// Canonical `YYYY-MM-DD` date, or the empty string for invalid events.
    pub fn date_string(&self) -> String {
        self.date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    pub fn metric(&self, metric: Metric) -> Option<u64> {
        match metric {
            Metric::Engagements => self.engagements,
            Metric::Likes => self.likes,
            Metric::Comments => self.comments,
            Metric::Shares => self.shares,
            Metric::Views => self.views,
            Metric::Clicks => self.clicks,
        }
    }

    /// Title, falling back to content, falling back to the empty string.
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.content.as_deref())
            .unwrap_or("")
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            date: self.date,
            platform: self.platform,
            source_type: self.source_type,
            label: self.label().to_string(),
        }
    }
}

fn serialize_date<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => s.collect_str(&d.format(DATE_FORMAT)),
        None => s.serialize_str(""),
    }
}

fn serialize_platform<S: Serializer>(platform: &Option<Platform>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(platform.map(|p| p.as_str()).unwrap_or(""))
}
