//! Date-range labels and the window they select.
//!
//! A window always ends at the most recent event date (the anchor), never at
//! the wall clock, so historical exports stay fully visible. The start bound
//! is exclusive and the anchor inclusive: "1 week" covers the anchor and the
//! six days before it.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateRange {
    OneWeek,
    TwoWeeks,
    OneMonth,
    ThreeMonths,
    SixMonths,
    NineMonths,
    OneYear,
    TwoYears,
    /// No date bound.
    All,
}

enum Span {
    Days(u64),
    Months(u32),
    Unbounded,
}

impl DateRange {
    pub const LABELED: [DateRange; 8] = [
        DateRange::OneWeek,
        DateRange::TwoWeeks,
        DateRange::OneMonth,
        DateRange::ThreeMonths,
        DateRange::SixMonths,
        DateRange::NineMonths,
        DateRange::OneYear,
        DateRange::TwoYears,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::OneWeek => "1 week",
            DateRange::TwoWeeks => "2 weeks",
            DateRange::OneMonth => "1 month",
            DateRange::ThreeMonths => "3 months",
            DateRange::SixMonths => "6 months",
            DateRange::NineMonths => "9 months",
            DateRange::OneYear => "1 year",
            DateRange::TwoYears => "2 years",
            DateRange::All => "All",
        }
    }

    fn span(&self) -> Span {
        match self {
            DateRange::OneWeek => Span::Days(7),
            DateRange::TwoWeeks => Span::Days(14),
            DateRange::OneMonth => Span::Months(1),
            DateRange::ThreeMonths => Span::Months(3),
            DateRange::SixMonths => Span::Months(6),
            DateRange::NineMonths => Span::Months(9),
            DateRange::OneYear => Span::Months(12),
            DateRange::TwoYears => Span::Months(24),
            DateRange::All => Span::Unbounded,
        }
    }

    /// Exclusive lower bound of the window ending at `anchor`, or `None`
    /// when the range is unbounded.
    pub fn start(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self.span() {
            Span::Days(n) => anchor.checked_sub_days(Days::new(n)),
            Span::Months(n) => anchor.checked_sub_months(Months::new(n)),
            Span::Unbounded => None,
        }
    }

    /// Whether `date` falls inside the window anchored at `anchor`.
    pub fn contains(&self, anchor: NaiveDate, date: NaiveDate) -> bool {
        if date > anchor {
            return false;
        }
        match self.start(anchor) {
            Some(start) => date > start,
            None => true,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.is_empty() || wanted.eq_ignore_ascii_case("all") {
            return Ok(DateRange::All);
        }
        DateRange::LABELED
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "unknown date range: '{}'. Must be All or one of: {}",
                    wanted,
                    DateRange::LABELED
                        .iter()
                        .map(|r| r.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}
