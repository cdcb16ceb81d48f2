//! Export the filtered session as JSON.
//!
//! Produces one document holding the contributing source files and every
//! event that passed the active platform and date-range filter, with the
//! same camelCase field names the events serialize with everywhere else.

use anyhow::{Context, Result};
use engagement_core::models::EngagementEvent;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ExportData<'a> {
    sources: &'a [String],
    events: &'a [EngagementEvent],
}

/// Export `events` as JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(
    events: &[EngagementEvent],
    sources: &[String],
    output: Option<&Path>,
) -> Result<()> {
    let json = export_json(events, sources)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            tokio::fs::write(path, &json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported {} events to {}", events.len(), path.display());
        }
        None => {
            println!("{}", json);
        }
    }
    Ok(())
}

pub fn export_json(events: &[EngagementEvent], sources: &[String]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ExportData { sources, events })?)
}
