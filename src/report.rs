//! Text and JSON renderings of the derived views.
//!
//! Every `render_*` function returns the full output as a string so the
//! CLI can print it in one go. Table layouts are fixed-width and meant for a
//! terminal; JSON output is pretty-printed and stable for scripts.

use anyhow::Result;
use engagement_core::models::{EngagementEvent, Metric, Platform};
use engagement_core::views::{
    best_and_worst_days, daily_totals, follower_series, overview, platform_breakdown,
    top_content, DayValue,
};
use serde::Serialize;
use std::fmt::Write;

use crate::config::OutputFormat;
use crate::ingest::{FileStatus, RunSummary};
use crate::progress::format_number;

const TITLE_WIDTH: usize = 48;

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Per-file outcomes and run totals for `engage ingest`.
pub fn render_run(summary: &RunSummary, stored: usize, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(&serde_json::json!({
            "files": summary.files,
            "failed": summary.failed(),
            "stored": stored,
            "duplicates": summary.duplicates(),
        }));
    }

    let mut out = String::new();
    for file in &summary.files {
        writeln!(out, "ingest {}", file.name)?;
        match &file.status {
            FileStatus::Ingested {
                rows_read,
                rows_dropped,
                events,
                variants,
                added,
                duplicates,
            } => {
                writeln!(out, "  rows read: {}", rows_read)?;
                if *rows_dropped > 0 {
                    writeln!(out, "  rows dropped: {}", rows_dropped)?;
                }
                writeln!(out, "  valid events: {}", events)?;
                for (variant, count) in variants {
                    writeln!(out, "    {:<18} {}", variant.to_string(), count)?;
                }
                writeln!(out, "  added: {}", added)?;
                writeln!(out, "  duplicates skipped: {}", duplicates)?;
            }
            FileStatus::NoValidRows { rows_read } => {
                writeln!(out, "  rows read: {}", rows_read)?;
                writeln!(out, "  no valid data found")?;
            }
            FileStatus::Failed { error } => {
                writeln!(out, "  failed: {}", error)?;
            }
        }
    }
    writeln!(
        out,
        "files: {} ({} failed)",
        summary.files.len(),
        summary.failed()
    )?;
    writeln!(out, "events stored: {}", format_number(stored as u64))?;
    writeln!(
        out,
        "duplicates skipped: {}",
        format_number(summary.duplicates() as u64)
    )?;
    writeln!(out, "ok")?;
    Ok(out)
}

pub fn render_events(events: &[EngagementEvent], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(events);
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:<10}  {:<8}  {:<18}  {:>11}  {:>8}  {}",
        "DATE", "PLATFORM", "SOURCE", "ENGAGEMENTS", "VIEWS", "TITLE"
    )?;
    writeln!(out, "{}", "-".repeat(92))?;
    for e in events {
        writeln!(
            out,
            "{:<10}  {:<8}  {:<18}  {:>11}  {:>8}  {}",
            e.date_string(),
            platform_cell(e.platform),
            e.source_type.as_str(),
            metric_cell(e.engagements),
            metric_cell(e.views),
            truncate(e.label(), TITLE_WIDTH)
        )?;
    }
    writeln!(out, "{} events", events.len())?;
    Ok(out)
}

/// Overview card, platform split, and contributing files.
pub fn render_summary(
    events: &[EngagementEvent],
    sources: &[String],
    format: OutputFormat,
) -> Result<String> {
    let totals = overview(events);
    let shares = platform_breakdown(events);

    if format == OutputFormat::Json {
        return to_json(&serde_json::json!({
            "overview": totals,
            "platforms": shares,
            "sources": sources,
        }));
    }

    let mut out = String::new();
    writeln!(out, "Engagement Summary")?;
    writeln!(out, "==================")?;
    writeln!(out)?;
    writeln!(
        out,
        "  Total engagements:  {}",
        format_number(totals.total_engagements)
    )?;
    writeln!(
        out,
        "  Avg per event:      {}",
        format_number(totals.avg_engagements)
    )?;
    writeln!(
        out,
        "  Events:             {}",
        format_number(totals.total_events as u64)
    )?;

    if !shares.is_empty() {
        writeln!(out)?;
        writeln!(out, "  By platform:")?;
        writeln!(out, "  {:<10} {:>12} {:>8}", "PLATFORM", "ENGAGEMENTS", "SHARE")?;
        writeln!(out, "  {}", "-".repeat(32))?;
        for s in &shares {
            writeln!(
                out,
                "  {:<10} {:>12} {:>7.1}%",
                s.platform.as_str(),
                format_number(s.engagements),
                s.percent
            )?;
        }
    }

    if !sources.is_empty() {
        writeln!(out)?;
        writeln!(out, "  Source files:")?;
        for name in sources {
            writeln!(out, "    {}", name)?;
        }
    }
    Ok(out)
}

pub fn render_top(events: &[EngagementEvent], limit: usize, format: OutputFormat) -> Result<String> {
    let ranked = top_content(events, limit);
    if format == OutputFormat::Json {
        return to_json(&ranked);
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:>4}  {:<10}  {:<8}  {:>11}  {}",
        "#", "DATE", "PLATFORM", "ENGAGEMENTS", "TITLE"
    )?;
    for (i, e) in ranked.iter().enumerate() {
        writeln!(
            out,
            "{:>4}  {:<10}  {:<8}  {:>11}  {}",
            i + 1,
            e.date_string(),
            platform_cell(e.platform),
            metric_cell(e.engagements),
            truncate(e.label(), TITLE_WIDTH)
        )?;
    }
    Ok(out)
}

pub fn render_kpi(
    events: &[EngagementEvent],
    metric: Metric,
    days: usize,
    format: OutputFormat,
) -> Result<String> {
    let kpis = best_and_worst_days(events, metric, days);
    if format == OutputFormat::Json {
        return to_json(&serde_json::json!({
            "metric": metric,
            "platforms": kpis,
        }));
    }

    let mut out = String::new();
    if kpis.is_empty() {
        writeln!(out, "no events in range")?;
        return Ok(out);
    }
    for kpi in &kpis {
        writeln!(out, "{} ({})", kpi.platform, metric)?;
        write_days(&mut out, "best", &kpi.best)?;
        write_days(&mut out, "worst", &kpi.worst)?;
    }
    Ok(out)
}

fn write_days(out: &mut String, heading: &str, days: &[DayValue]) -> std::fmt::Result {
    writeln!(out, "  {}:", heading)?;
    for d in days {
        writeln!(
            out,
            "    {}  {:>10}  ({} post{})",
            d.date.format(engagement_core::models::DATE_FORMAT),
            format_number(d.value),
            d.posts,
            if d.posts == 1 { "" } else { "s" }
        )?;
    }
    Ok(())
}

pub fn render_calendar(
    events: &[EngagementEvent],
    metric: Metric,
    format: OutputFormat,
) -> Result<String> {
    let days = daily_totals(events, metric);
    if format == OutputFormat::Json {
        return to_json(&days);
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:<10}  {:>10}  {:>10}  {:>10}",
        "DATE", "LinkedIn", "X", "TOTAL"
    )?;
    for day in &days {
        let cell = |p: Platform| day.per_platform.get(&p).copied().unwrap_or(0);
        writeln!(
            out,
            "{:<10}  {:>10}  {:>10}  {:>10}",
            day.date.format(engagement_core::models::DATE_FORMAT),
            format_number(cell(Platform::LinkedIn)),
            format_number(cell(Platform::X)),
            format_number(day.total)
        )?;
    }
    Ok(out)
}

pub fn render_followers(events: &[EngagementEvent], format: OutputFormat) -> Result<String> {
    let series = follower_series(events);
    if format == OutputFormat::Json {
        return to_json(&series);
    }

    let mut out = String::new();
    writeln!(out, "{:<10}  {:>10}", "DATE", "FOLLOWERS")?;
    for point in &series {
        writeln!(
            out,
            "{:<10}  {:>10}",
            point.date.format(engagement_core::models::DATE_FORMAT),
            format_number(point.followers)
        )?;
    }
    Ok(out)
}

fn platform_cell(platform: Option<Platform>) -> &'static str {
    platform.map(|p| p.as_str()).unwrap_or("-")
}

fn metric_cell(value: Option<u64>) -> String {
    value.map(format_number).unwrap_or_else(|| "-".to_string())
}

fn truncate(text: &str, width: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= width {
        flat
    } else {
        let cut: String = flat.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
