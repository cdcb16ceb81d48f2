//! # Engagement Harness CLI (`engage`)
//!
//! The `engage` binary reads LinkedIn and X analytics exports (CSV, XLS,
//! XLSX), merges them into one deduplicated session, and prints the
//! requested view. Nothing is persisted between runs: every invocation
//! ingests its path arguments from scratch.
//!
//! ## Usage
//!
//! ```bash
//! engage --config ./config/engage.toml <command> <paths..>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `engage ingest` | Per-file outcome and run totals |
//! | `engage events` | Filtered event list |
//! | `engage summary` | Overview, platform breakdown, source files |
//! | `engage top` | Top content by engagements |
//! | `engage kpi` | Best and worst days per platform |
//! | `engage calendar` | Daily metric totals |
//! | `engage followers` | Follower growth series |
//! | `engage export` | JSON export of filtered events |
//!
//! ## Examples
//!
//! ```bash
//! # Which files were understood, and how many events each gave
//! engage ingest ./exports
//!
//! # Three strongest and weakest X days by views over the last 3 months
//! engage kpi ./exports --platform X --metric views --range "3 months"
//!
//! # Everything, as JSON, failing the run if any file could not be read
//! engage export ./exports --range All --strict --output events.json
//! ```

use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use engagement_core::models::Metric;
use engagement_core::store::{EventFilter, EventStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use engagement_harness::config::{self, Config, OutputFormat};
use engagement_harness::export;
use engagement_harness::ingest::{self, Session};
use engagement_harness::progress::ProgressMode;
use engagement_harness::report;

/// Engagement Harness CLI: normalize social-media engagement exports.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/engage.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "engage",
    about = "Engagement Harness: normalize LinkedIn and X engagement exports into one event stream",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/engage.toml`. Built-in defaults apply when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./config/engage.toml")]
    config: PathBuf,

    /// Output format; overrides `[output].format`.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Progress on stderr. Defaults to `human` on a terminal, else `off`.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs and view filter shared by every command.
#[derive(Args)]
struct Selection {
    /// Export files or directories to ingest, in order.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Platform filter: `All`, `LinkedIn` or `X`. Overrides `[view].platform`.
    #[arg(long)]
    platform: Option<String>,

    /// Date range label (`1 week` … `2 years`, or `All`), anchored at the
    /// latest event date. Overrides `[view].range`.
    #[arg(long)]
    range: Option<String>,

    /// Exit non-zero if any file failed to ingest.
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest files and report what each one contributed.
    Ingest {
        #[command(flatten)]
        selection: Selection,
    },

    /// List events that pass the filter.
    Events {
        #[command(flatten)]
        selection: Selection,
    },

    /// Engagement overview, per-platform share, and source files.
    Summary {
        #[command(flatten)]
        selection: Selection,
    },

    /// Events ranked by engagements.
    Top {
        #[command(flatten)]
        selection: Selection,

        /// Maximum number of rows. Defaults to `[view].top_limit`.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Best and worst days per platform.
    Kpi {
        #[command(flatten)]
        selection: Selection,

        /// engagements, likes, comments, shares, views, or clicks.
        #[arg(long)]
        metric: Option<String>,

        /// Days listed on each side. Defaults to `[view].kpi_days`.
        #[arg(long)]
        days: Option<usize>,
    },

    /// Per-day metric totals by platform.
    Calendar {
        #[command(flatten)]
        selection: Selection,

        #[arg(long)]
        metric: Option<String>,
    },

    /// LinkedIn follower counts over time.
    Followers {
        #[command(flatten)]
        selection: Selection,
    },

    /// Write filtered events as JSON.
    Export {
        #[command(flatten)]
        selection: Selection,

        /// Output file. Writes to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    fn selection(&self) -> &Selection {
        match self {
            Commands::Ingest { selection }
            | Commands::Events { selection }
            | Commands::Summary { selection }
            | Commands::Top { selection, .. }
            | Commands::Kpi { selection, .. }
            | Commands::Calendar { selection, .. }
            | Commands::Followers { selection }
            | Commands::Export { selection, .. } => selection,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_filter(cfg: &Config, selection: &Selection) -> Result<EventFilter> {
    let platform = selection
        .platform
        .as_deref()
        .unwrap_or(&cfg.view.platform);
    let range = selection.range.as_deref().unwrap_or(&cfg.view.range);
    EventFilter::from_labels(Some(platform), Some(range)).map_err(|e| anyhow!(e))
}

fn resolve_metric(cfg: &Config, metric: Option<&str>) -> Result<Metric> {
    metric
        .unwrap_or(&cfg.view.metric)
        .parse()
        .map_err(|e: String| anyhow!(e))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let cfg = config::load_or_minimal(&cli.config)?;
    let format = cli.format.unwrap_or(cfg.output.format);
    let progress = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    // Resolve the filter before touching any file so bad flags fail fast.
    let selection = cli.command.selection();
    let filter = build_filter(&cfg, selection)?;
    let strict = selection.strict;

    let Session { store, summary } =
        ingest::load_session(&selection.paths, &cfg.ingest, progress.as_ref()).await?;
    let events = store.query(&filter);
    let sources = store.sources();

    match &cli.command {
        Commands::Ingest { .. } => {
            print!("{}", report::render_run(&summary, store.len(), format)?);
        }
        Commands::Events { .. } => {
            print!("{}", report::render_events(&events, format)?);
        }
        Commands::Summary { .. } => {
            print!("{}", report::render_summary(&events, &sources, format)?);
        }
        Commands::Top { limit, .. } => {
            let limit = limit.unwrap_or(cfg.view.top_limit);
            print!("{}", report::render_top(&events, limit, format)?);
        }
        Commands::Kpi { metric, days, .. } => {
            let metric = resolve_metric(&cfg, metric.as_deref())?;
            let days = days.unwrap_or(cfg.view.kpi_days);
            print!("{}", report::render_kpi(&events, metric, days, format)?);
        }
        Commands::Calendar { metric, .. } => {
            let metric = resolve_metric(&cfg, metric.as_deref())?;
            print!("{}", report::render_calendar(&events, metric, format)?);
        }
        Commands::Followers { .. } => {
            print!("{}", report::render_followers(&events, format)?);
        }
        Commands::Export { output, .. } => {
            export::run_export(&events, &sources, output.as_deref()).await?;
        }
    }

    if strict && summary.failed() > 0 {
        bail!(
            "{} of {} files failed to ingest",
            summary.failed(),
            summary.files.len()
        );
    }
    Ok(())
}
