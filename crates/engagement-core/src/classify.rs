//! Report type classification.
//!
//! Looks only at a record's column names. Checks run in a fixed order and
//! the first match wins: LinkedIn content exports also carry generic
//! columns, so they must be recognised before the X rule sees them.
//! Names compare exactly (case-sensitive) against the export tools' literal
//! header text, after trimming.

use crate::models::{RawRecord, ReportVariant};

const LINKEDIN_CONTENT_COLUMNS: [&str; 2] = ["Impressions (total)", "Clicks (total)"];
const LINKEDIN_VISITOR_COLUMNS: [&str; 2] = ["Unique visitors", "Page views"];
const LINKEDIN_FOLLOWER_COLUMNS: [&str; 2] = ["Follower gain", "Total followers"];
const X_COLUMNS: [&str; 3] = ["Impressions", "Likes", "Engagements"];

pub fn classify(record: &RawRecord) -> ReportVariant {
    let has_any = |names: &[&str]| names.iter().any(|n| record.has_column(n));

    if has_any(&LINKEDIN_CONTENT_COLUMNS) {
        ReportVariant::LinkedInContent
    } else if has_any(&LINKEDIN_VISITOR_COLUMNS) {
        ReportVariant::LinkedInVisitors
    } else if has_any(&LINKEDIN_FOLLOWER_COLUMNS) {
        ReportVariant::LinkedInFollowers
    } else if X_COLUMNS.iter().all(|n| record.has_column(n)) {
        ReportVariant::X
    } else {
        ReportVariant::Unknown
    }
}
