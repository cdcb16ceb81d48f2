//! # Engagement Core
//!
//! Shared, WASM-safe logic for Engagement Harness: the report ingestion
//! pipeline (decode → classify → normalize → validate), the session store,
//! date-range filtering, and the derived views every dashboard panel reads.
//!
//! This crate contains no tokio, filesystem I/O, or other native-only
//! dependencies. Callers hand it file bytes plus an extension and get
//! canonical [`models::EngagementEvent`]s back.
//!
//! ```rust
//! use engagement_core::pipeline::{ingest, IngestOutcome};
//!
//! let csv = "Exported by LinkedIn\n\nDate,Impressions (total),Clicks (total)\n01/15/2024,100,5\n";
//! match ingest(csv.as_bytes(), "csv").unwrap() {
//!     IngestOutcome::Events(batch) => assert_eq!(batch.events.len(), 1),
//!     IngestOutcome::NoValidRows { .. } => unreachable!(),
//! }
//! ```

pub mod classify;
pub mod decode;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod range;
pub mod store;
pub mod views;
