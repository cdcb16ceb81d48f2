//! Tabular decoding for exported reports (CSV, XLS, XLSX).
//!
//! Exports do not reliably start with their header row: LinkedIn prepends a
//! title line and a blank line, some tools add date-range metadata. The
//! decoder scans from the top for the first row holding a cell equal to
//! `date` (trimmed, case-insensitive) and uses that row as the header. All
//! rows above it are discarded. When no such row exists the first row is the
//! header, which usually classifies as `Unknown` downstream and yields no
//! events rather than an error.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use crate::error::IngestError;
use crate::models::{RawRecord, DATE_FORMAT};

/// Spreadsheet columns sampled per row while looking for the header.
pub const DEFAULT_HEADER_SCAN_COLUMNS: usize = 20;

/// Delimiters a header line may use, in tie-break priority order.
const DELIMITERS: [u8; 3] = [b',', b'\t', b';'];

const HEADER_MARKER: &str = "date";

/// Container kind, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `.csv`: delimited text (comma, tab or semicolon).
    Delimited,
    /// `.xls` / `.xlsx`: first worksheet of a workbook.
    Spreadsheet,
}

impl FileKind {
    /// Accepts `csv`, `.csv`, `report.CSV` and so on.
    pub fn from_extension(extension: &str) -> Result<Self, IngestError> {
        let ext = extension
            .rsplit('.')
            .next()
            .unwrap_or(extension)
            .trim()
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(FileKind::Delimited),
            "xls" | "xlsx" => Ok(FileKind::Spreadsheet),
            _ => Err(IngestError::UnsupportedFormat(extension.to_string())),
        }
    }
}

/// Knobs for header discovery.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    pub header_scan_columns: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            header_scan_columns: DEFAULT_HEADER_SCAN_COLUMNS,
        }
    }
}

/// Decodes file content into raw records, in file order.
pub fn decode(
    bytes: &[u8],
    kind: FileKind,
    options: &DecodeOptions,
) -> Result<Vec<RawRecord>, IngestError> {
    match kind {
        FileKind::Delimited => decode_delimited(&String::from_utf8_lossy(bytes)),
        FileKind::Spreadsheet => decode_spreadsheet(bytes, options),
    }
}

/// Decodes delimited text. Exposed for callers that already hold a string.
pub fn decode_delimited(text: &str) -> Result<Vec<RawRecord>, IngestError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let header_idx = match lines.iter().position(|line| is_header_line(line)) {
        Some(idx) => idx,
        None => {
            debug!("no date column found, using first line as header");
            0
        }
    };
    let delimiter = detect_delimiter(lines[header_idx]);
    let body = lines[header_idx..].join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: RawRecord = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name, row.get(i).unwrap_or("")))
            .collect();
        if !record.is_blank() {
            records.push(record);
        }
    }
    Ok(records)
}

fn is_header_line(line: &str) -> bool {
    line.split([',', '\t', ';'])
        .any(|cell| is_header_marker(cell.trim().trim_matches('"')))
}

fn is_header_marker(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case(HEADER_MARKER)
}

/// Picks the delimiter that splits the header line into the most cells.
fn detect_delimiter(header_line: &str) -> u8 {
    let mut best = DELIMITERS[0];
    let mut best_count = 0;
    for d in DELIMITERS {
        let count = header_line.bytes().filter(|b| *b == d).count();
        if count > best_count {
            best = d;
            best_count = count;
        }
    }
    best
}

fn decode_spreadsheet(bytes: &[u8], options: &DecodeOptions) -> Result<Vec<RawRecord>, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };
    if range.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    // the header scan covers absolute sheet columns, but rows start at the
    // first used column
    let first_col = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let scan_width = options.header_scan_columns.saturating_sub(first_col);
    let header_idx = match rows.iter().position(|row| {
        row.iter()
            .take(scan_width)
            .any(|cell| is_header_marker(cell))
    }) {
        Some(idx) => idx,
        None => {
            debug!("no date column found in first sheet, using first row as header");
            0
        }
    };

    let header = &rows[header_idx];
    let mut records = Vec::new();
    for row in &rows[header_idx + 1..] {
        let record: RawRecord = header
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.trim().is_empty())
            .map(|(i, name)| (name.as_str(), row.get(i).map(String::as_str).unwrap_or("")))
            .collect();
        if !record.is_blank() {
            records.push(record);
        }
    }
    Ok(records)
}

/// Renders a cell as the string a CSV export of the same sheet would hold.
/// Date cells come out as `YYYY-MM-DD` so the normalizer's ISO pattern
/// picks them up.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => format!("{}", f),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR({:?})", e),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.split('T').next().unwrap_or(s).to_string(),
        Data::DurationIso(s) => s.clone(),
    }
}
