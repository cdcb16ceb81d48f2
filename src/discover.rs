//! Resolves command-line paths into the ordered list of files to ingest.
//!
//! A file argument is taken as-is, whatever its extension, so an unsupported
//! format is reported by the pipeline rather than silently skipped. A
//! directory argument is walked and filtered through the configured include
//! and exclude globs, matched against paths relative to that directory.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::progress::{IngestProgressEvent, IngestProgressReporter};

/// One file queued for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Display name: the file name for explicit arguments, the path relative
    /// to the walked directory otherwise.
    pub name: String,
}

/// Expands `paths` in argument order. Entries of each directory are sorted.
pub fn discover_files(
    paths: &[PathBuf],
    config: &IngestConfig,
    progress: &dyn IngestProgressReporter,
) -> Result<Vec<SourceFile>> {
    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            progress.report(IngestProgressEvent::Discovering {
                root: path.display().to_string(),
            });
            files.extend(scan_directory(
                path,
                &include_set,
                &exclude_set,
                config.follow_symlinks,
            )?);
        } else if path.exists() {
            files.push(SourceFile {
                path: path.clone(),
                name: file_name(path),
            });
        } else {
            bail!("Input path does not exist: {}", path.display());
        }
    }
    Ok(files)
}

fn scan_directory(
    root: &Path,
    include_set: &GlobSet,
    exclude_set: &GlobSet,
    follow_symlinks: bool,
) -> Result<Vec<SourceFile>> {
    let mut items = Vec::new();

    let walker = WalkDir::new(root).follow_links(follow_symlinks);
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        items.push(SourceFile {
            path: path.to_path_buf(),
            name: rel_str,
        });
    }

    // Sort for deterministic ordering
    items.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(items)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
