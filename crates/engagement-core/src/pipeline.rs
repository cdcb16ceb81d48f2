//! Ingestion pipeline orchestration.
//!
//! Coordinates one file's flow: decode → classify each record → normalize
//! each record → drop events without a date. The result is either a batch
//! of valid events or the soft [`IngestOutcome::NoValidRows`]; decode and
//! format failures come back as [`IngestError`] with no partial data.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::classify::classify;
use crate::decode::{decode, DecodeOptions, FileKind};
use crate::error::IngestError;
use crate::models::{EngagementEvent, RawRecord, ReportVariant};
use crate::normalize::normalize;

/// Valid events extracted from one file, plus counters for reporting.
#[derive(Debug, Clone, Default)]
pub struct IngestBatch {
    pub events: Vec<EngagementEvent>,
    /// Data rows the decoder produced (blank rows excluded).
    pub rows_read: usize,
    /// Rows dropped for an unknown variant or an unparseable date.
    pub rows_dropped: usize,
    /// Valid events per report variant.
    pub variants: BTreeMap<ReportVariant, usize>,
}

/// Result of a pipeline run that did not hit a hard error.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Events(IngestBatch),
    /// The file decoded, but no row survived date validation.
    NoValidRows { rows_read: usize },
}

/// Runs the pipeline on one file's content with default decode options.
///
/// `extension` may be given with or without the dot, or as a file name.
pub fn ingest(content: &[u8], extension: &str) -> Result<IngestOutcome, IngestError> {
    ingest_with_options(content, extension, &DecodeOptions::default())
}

pub fn ingest_with_options(
    content: &[u8],
    extension: &str,
    options: &DecodeOptions,
) -> Result<IngestOutcome, IngestError> {
    let kind = FileKind::from_extension(extension)?;
    let records = decode(content, kind, options)?;
    debug!(?kind, records = records.len(), "decoded");
    Ok(ingest_records(&records))
}

/// Classifies, normalizes and validates already-decoded records.
pub fn ingest_records(records: &[RawRecord]) -> IngestOutcome {
    let mut batch = IngestBatch {
        rows_read: records.len(),
        ..IngestBatch::default()
    };

    for record in records {
        let variant = classify(record);
        let event = normalize(record, variant);
        if event.is_valid() {
            *batch.variants.entry(variant).or_insert(0) += 1;
            batch.events.push(event);
        } else if variant == ReportVariant::Unknown {
            debug!("dropping row of unknown report type");
            batch.rows_dropped += 1;
        } else {
            debug!(%variant, "dropping row without a valid date");
            batch.rows_dropped += 1;
        }
    }

    if batch.events.is_empty() {
        info!(rows_read = batch.rows_read, "no valid data found");
        return IngestOutcome::NoValidRows {
            rows_read: batch.rows_read,
        };
    }

    info!(
        rows_read = batch.rows_read,
        events = batch.events.len(),
        dropped = batch.rows_dropped,
        "ingested"
    );
    IngestOutcome::Events(batch)
}
