//! # Engagement Harness
//!
//! Turns LinkedIn (content, visitors, followers) and X analytics exports into
//! one normalized, deduplicated stream of engagement events, and renders the
//! views an engagement dashboard needs from it.
//!
//! The format-aware pipeline and the session store live in
//! [`engagement_core`]; this crate adds the native side: configuration, file
//! discovery, sequential multi-file ingestion, progress, and output.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────┐   ┌──────────────┐
//! │  Discover   │──▶│  Pipeline (per file)  │──▶│ SessionStore │
//! │ files/dirs  │   │ decode→classify→norm │   │ dedup+filter │
//! └─────────────┘   └──────────────────────┘   └──────┬───────┘
//!                                                     │
//!                                    ┌────────────────┤
//!                                    ▼                ▼
//!                              ┌──────────┐     ┌──────────┐
//!                              │  Views   │     │  Export  │
//!                              │ (report) │     │  (JSON)  │
//!                              └──────────┘     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! engage ingest ./exports                 # per-file outcome and totals
//! engage summary ./exports --range "3 months"
//! engage kpi ./exports --platform X --metric views
//! engage export ./exports --output out/events.json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`discover`] | Expand file and directory arguments |
//! | [`ingest`] | Sequential multi-file ingestion into a session |
//! | [`progress`] | Progress reporting on stderr |
//! | [`report`] | Table and JSON renderings of the views |
//! | [`export`] | JSON export of filtered events |

pub mod config;
pub mod discover;
pub mod export;
pub mod ingest;
pub mod progress;
pub mod report;
