//! Multi-file ingest orchestration.
//!
//! Coordinates one `engage` run: discover files → read each one → core
//! pipeline → merge into the session store. Files are handled strictly one
//! after another, each fully merged before the next is read, so dedup
//! decisions are deterministic across files. A failing file leaves the
//! store untouched and the run carries on.

use anyhow::{Context, Result};
use engagement_core::decode::DecodeOptions;
use engagement_core::models::ReportVariant;
use engagement_core::pipeline::{ingest_with_options, IngestOutcome};
use engagement_core::store::memory::SessionStore;
use engagement_core::store::EventStore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::discover::{discover_files, SourceFile};
use crate::progress::{IngestProgressEvent, IngestProgressReporter};

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Ingested {
        rows_read: usize,
        /// Rows of an unknown report type or without a parseable date.
        rows_dropped: usize,
        events: usize,
        /// Valid events per report type.
        variants: BTreeMap<ReportVariant, usize>,
        added: usize,
        duplicates: usize,
    },
    /// Decoded fine but nothing had a usable date.
    NoValidRows { rows_read: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub name: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Per-file results of a run, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Failed { .. }))
            .count()
    }

    pub fn duplicates(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.status {
                FileStatus::Ingested { duplicates, .. } => duplicates,
                _ => 0,
            })
            .sum()
    }
}

/// A populated store plus the report of how it was filled.
pub struct Session {
    pub store: SessionStore,
    pub summary: RunSummary,
}

/// Discovers and ingests every input into a fresh session.
pub async fn load_session(
    paths: &[PathBuf],
    config: &IngestConfig,
    progress: &dyn IngestProgressReporter,
) -> Result<Session> {
    let files = discover_files(paths, config, progress)?;
    let mut store = SessionStore::new();
    let summary = ingest_files(&mut store, &files, config, progress).await;
    Ok(Session { store, summary })
}

/// Ingests `files` in order into `store`.
pub async fn ingest_files<S: EventStore>(
    store: &mut S,
    files: &[SourceFile],
    config: &IngestConfig,
    progress: &dyn IngestProgressReporter,
) -> RunSummary {
    let total = files.len() as u64;
    let mut summary = RunSummary::default();

    for (i, file) in files.iter().enumerate() {
        progress.report(IngestProgressEvent::Ingesting {
            file: file.name.clone(),
            n: i as u64 + 1,
            total,
        });
        let status = ingest_file(store, file, config).await;
        if let FileStatus::Failed { error } = &status {
            warn!(file = %file.name, %error, "ingest failed");
        }
        summary.files.push(FileReport {
            name: file.name.clone(),
            status,
        });
    }

    info!(
        files = summary.files.len(),
        failed = summary.failed(),
        events = store.len(),
        "run complete"
    );
    summary
}

/// Reads one file and merges its events. Never returns an error: failures
/// are folded into [`FileStatus::Failed`].
pub async fn ingest_file<S: EventStore>(
    store: &mut S,
    file: &SourceFile,
    config: &IngestConfig,
) -> FileStatus {
    let content = match read_limited(file, config.max_file_bytes).await {
        Ok(content) => content,
        Err(e) => {
            return FileStatus::Failed {
                error: format!("{:#}", e),
            }
        }
    };

    let options = DecodeOptions {
        header_scan_columns: config.header_scan_columns,
    };
    // the extension comes from the display name, which ends in the file name
    match ingest_with_options(&content, &file.name, &options) {
        Ok(IngestOutcome::Events(batch)) => {
            let events = batch.events.len();
            let merged = store.merge(batch.events);
            store.record_source(&file.name);
            FileStatus::Ingested {
                rows_read: batch.rows_read,
                rows_dropped: batch.rows_dropped,
                events,
                variants: batch.variants,
                added: merged.added,
                duplicates: merged.duplicates,
            }
        }
        Ok(IngestOutcome::NoValidRows { rows_read }) => FileStatus::NoValidRows { rows_read },
        Err(e) => FileStatus::Failed {
            error: e.to_string(),
        },
    }
}

async fn read_limited(file: &SourceFile, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(&file.path)
        .await
        .with_context(|| format!("Failed to stat {}", file.path.display()))?;
    if metadata.len() > max_bytes {
        anyhow::bail!(
            "file is {} bytes, above the {} byte limit",
            metadata.len(),
            max_bytes
        );
    }
    tokio::fs::read(&file.path)
        .await
        .with_context(|| format!("Failed to read {}", file.path.display()))
}
