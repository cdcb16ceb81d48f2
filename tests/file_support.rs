//! Integration tests for spreadsheet exports.
//!
//! Workbooks are built in-test as minimal XLSX packages so the fixtures stay
//! readable next to the assertions.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn engage_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_engage"))
}

fn col_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = String::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    name
}

/// Single-sheet workbook. Numeric-looking cells are stored as numbers, the
/// rest as inline strings; empty cells are left out.
fn minimal_xlsx(rows: &[&[&str]]) -> Vec<u8> {
    let mut sheet = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><sheetData>",
    );
    for (r, row) in rows.iter().enumerate() {
        sheet.push_str(&format!("<row r=\"{}\">", r + 1));
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let cell_ref = format!("{}{}", col_name(c), r + 1);
            if value.parse::<f64>().is_ok() {
                sheet.push_str(&format!("<c r=\"{}\"><v>{}</v></c>", cell_ref, value));
            } else {
                sheet.push_str(&format!(
                    "<c r=\"{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                    cell_ref, value
                ));
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let parts = [
        (
            "[Content_Types].xml",
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"><Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/><Default Extension=\"xml\" ContentType=\"application/xml\"/><Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/><Override PartName=\"/xl/worksheets/sheet1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/></Types>".to_string(),
        ),
        (
            "_rels/.rels",
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"><Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/></Relationships>".to_string(),
        ),
        (
            "xl/workbook.xml",
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\"><sheets><sheet name=\"Sheet1\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>".to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"><Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet1.xml\"/></Relationships>".to_string(),
        ),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        for (name, body) in parts.iter() {
            zip.start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

fn followers_workbook() -> Vec<u8> {
    minimal_xlsx(&[
        &["LinkedIn followers report"],
        &[],
        &["Date", "Follower gain", "Total followers"],
        &["01/02/2024", "5", "105"],
        &["01/01/2024", "3", "100"],
        &["01/03/2024", "0", "0"],
    ])
}

fn setup_file_support_env(extra_config: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();
    fs::create_dir_all(root.join("config")).unwrap();
    fs::create_dir_all(root.join("files")).unwrap();

    let config_content = format!(
        "[view]\nrange = \"All\"\n\n[ingest]\ninclude_globs = [\"**/*.xlsx\", \"**/*.csv\"]\n{}",
        extra_config
    );
    let config_path = root.join("config").join("engage.toml");
    fs::write(&config_path, config_content).unwrap();
    (tmp, config_path)
}

fn write_file(tmp: &TempDir, name: &str, content: &[u8]) -> String {
    let path = tmp.path().join("files").join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

fn run_engage(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = engage_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run engage: {}", e));
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn file_support_xlsx_followers_series() {
    let (tmp, config_path) = setup_file_support_env("");
    let path = write_file(&tmp, "followers.xlsx", &followers_workbook());

    let (stdout, stderr, success) =
        run_engage(&config_path, &["--format", "json", "followers", &path]);
    assert!(success, "followers failed: {}", stderr);
    let series: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        series,
        serde_json::json!([
            { "date": "2024-01-01", "followers": 100 },
            { "date": "2024-01-02", "followers": 105 }
        ])
    );
}

#[test]
fn file_support_xlsx_rows_counted() {
    let (tmp, config_path) = setup_file_support_env("");
    let path = write_file(&tmp, "followers.xlsx", &followers_workbook());

    let (stdout, _, success) = run_engage(&config_path, &["ingest", &path]);
    assert!(success);
    assert!(stdout.contains("rows read: 3"));
    assert!(stdout.contains("valid events: 3"));
}

#[test]
fn file_support_same_rows_across_formats_deduplicated() {
    let (tmp, config_path) = setup_file_support_env("");
    let xlsx = write_file(&tmp, "followers.xlsx", &followers_workbook());
    let csv = write_file(
        &tmp,
        "followers.csv",
        b"Date,Follower gain,Total followers\n01/02/2024,5,105\n01/01/2024,3,100\n01/03/2024,0,0\n",
    );

    let (stdout, _, success) = run_engage(&config_path, &["ingest", &xlsx, &csv]);
    assert!(success);
    assert!(stdout.contains("events stored: 3"));
    assert!(stdout.contains("duplicates skipped: 3"));
}

#[test]
fn file_support_visitors_workbook() {
    let (tmp, config_path) = setup_file_support_env("");
    let path = write_file(
        &tmp,
        "visitors.xlsx",
        &minimal_xlsx(&[
            &["Date", "Page views", "Unique visitors"],
            &["2024-02-01", "40", "12"],
            &["2024-02-02", "1,024", "300"],
        ]),
    );

    let (stdout, stderr, success) = run_engage(
        &config_path,
        &["--format", "json", "calendar", &path, "--metric", "views"],
    );
    assert!(success, "calendar failed: {}", stderr);
    let days: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(days[0]["date"], "2024-02-01");
    assert_eq!(days[0]["total"], 40);
    assert_eq!(days[1]["total"], 1024);
}

#[test]
fn file_support_header_scan_width_from_config() {
    let rows: &[&[&str]] = &[
        &["Visitor metrics"],
        &["", "", "", "Date", "Page views"],
        &["", "", "", "2024-02-01", "40"],
    ];

    let (tmp, config_path) = setup_file_support_env("");
    let path = write_file(&tmp, "wide.xlsx", &minimal_xlsx(rows));
    let (stdout, _, success) = run_engage(&config_path, &["ingest", &path]);
    assert!(success);
    assert!(stdout.contains("valid events: 1"));

    let (tmp, config_path) = setup_file_support_env("header_scan_columns = 2\n");
    let path = write_file(&tmp, "wide.xlsx", &minimal_xlsx(rows));
    let (stdout, _, success) = run_engage(&config_path, &["ingest", &path]);
    assert!(success);
    assert!(stdout.contains("no valid data found"));
}

#[test]
fn file_support_skipped_on_failure() {
    let (tmp, config_path) = setup_file_support_env("");
    let corrupt = write_file(&tmp, "broken.xlsx", b"PK\x03\x04 definitely not a workbook");
    let good = write_file(&tmp, "followers.xlsx", &followers_workbook());

    let (stdout, stderr, success) = run_engage(&config_path, &["ingest", &corrupt, &good]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("failed: could not decode file"));
    assert!(stdout.contains("files: 2 (1 failed)"));
    assert!(stdout.contains("events stored: 3"));
}

#[test]
fn file_support_max_size_skipped() {
    let (tmp, config_path) = setup_file_support_env("max_file_bytes = 64\n");
    let path = write_file(&tmp, "followers.xlsx", &followers_workbook());

    let (stdout, _, success) = run_engage(&config_path, &["ingest", &path, "--strict"]);
    assert!(!success);
    assert!(stdout.contains("byte limit"));
    assert!(stdout.contains("events stored: 0"));
}
