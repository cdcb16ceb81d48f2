//! TOML configuration for the `engage` binary.
//!
//! Every section is optional. A missing file at the default path falls back
//! to [`Config::minimal`], so the binary works with no setup at all.

use anyhow::{Context, Result};
use engagement_core::models::{parse_platform_filter, Metric};
use engagement_core::range::DateRange;
use globset::Glob;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Globs applied to files found under a directory argument.
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_header_scan_columns")]
    pub header_scan_columns: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
            max_file_bytes: default_max_file_bytes(),
            header_scan_columns: default_header_scan_columns(),
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.csv".to_string(),
        "**/*.xls".to_string(),
        "**/*.xlsx".to_string(),
    ]
}
fn default_max_file_bytes() -> u64 {
    25 * 1024 * 1024
}
fn default_header_scan_columns() -> usize {
    engagement_core::decode::DEFAULT_HEADER_SCAN_COLUMNS
}

/// Defaults for the report commands; each can be overridden on the command line.
#[derive(Debug, Deserialize, Clone)]
pub struct ViewConfig {
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default = "default_metric")]
    pub metric: String,
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
    #[serde(default = "default_kpi_days")]
    pub kpi_days: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            range: default_range(),
            metric: default_metric(),
            top_limit: default_top_limit(),
            kpi_days: default_kpi_days(),
        }
    }
}

fn default_platform() -> String {
    "All".to_string()
}
fn default_range() -> String {
    "1 month".to_string()
}
fn default_metric() -> String {
    "engagements".to_string()
}
fn default_top_limit() -> usize {
    10
}
fn default_kpi_days() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Read, parse and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields [`Config::minimal`].
/// A file that exists and fails to parse or validate is still an error.
pub fn load_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    // Validate ingest
    if config.ingest.max_file_bytes == 0 {
        anyhow::bail!("ingest.max_file_bytes must be > 0");
    }
    if !(1..=256).contains(&config.ingest.header_scan_columns) {
        anyhow::bail!("ingest.header_scan_columns must be in [1, 256]");
    }
    for pattern in config
        .ingest
        .include_globs
        .iter()
        .chain(&config.ingest.exclude_globs)
    {
        Glob::new(pattern).with_context(|| format!("Invalid glob pattern: '{}'", pattern))?;
    }

    // Validate view
    if config.view.top_limit < 1 {
        anyhow::bail!("view.top_limit must be >= 1");
    }
    if config.view.kpi_days < 1 {
        anyhow::bail!("view.kpi_days must be >= 1");
    }
    parse_platform_filter(&config.view.platform)
        .map_err(|e| anyhow::anyhow!("view.platform: {}", e))?;
    config
        .view
        .range
        .parse::<DateRange>()
        .map_err(|e| anyhow::anyhow!("view.range: {}", e))?;
    config
        .view
        .metric
        .parse::<Metric>()
        .map_err(|e| anyhow::anyhow!("view.metric: {}", e))?;

    Ok(())
}
