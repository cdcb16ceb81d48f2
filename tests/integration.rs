use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn engage_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_engage"))
}

const LINKEDIN_CONTENT: &str = "\
Company page content export
Generated for Acme Corp

Date,Post text,Link,Impressions (total),Clicks (total),Reactions (total),Comments (total),Reposts (total)
12/01/2023,Launch recap,https://linkedin.example/1,900,10,20,3,1
01/15/2024,Hiring update,https://linkedin.example/2,100,5,10,2,1
01/16/2024,Quarterly numbers,https://linkedin.example/3,\"1,250\",7,30,4,2
";

const X_POSTS: &str = "\
Tweet ID,Tweet text,Date,Impressions,Likes,Engagements,Replies,Reposts
101,Shipping day,\"Mon, Jan 15, 2024\",400,12,40,2,3
102,Thread on metrics,\"Sat, Jan 20, 2024\",800,30,90,5,6
";

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(files_dir.join("linkedin.csv"), LINKEDIN_CONTENT).unwrap();
    fs::write(files_dir.join("x.csv"), X_POSTS).unwrap();
    fs::write(files_dir.join("readme.txt"), "not an export").unwrap();

    let config_content = r#"[ingest]
include_globs = ["**/*.csv", "**/*.xls", "**/*.xlsx"]
exclude_globs = []

[view]
platform = "All"
range = "All"
metric = "engagements"
top_limit = 10
kpi_days = 3

[output]
format = "table"
"#;

    let config_path = config_dir.join("engage.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn files(config_path: &Path, name: &str) -> String {
    config_path
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("files")
        .join(name)
        .to_string_lossy()
        .to_string()
}

fn run_engage(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = engage_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run engage binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn run_json(config_path: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--format", "json"];
    full.extend_from_slice(args);
    let (stdout, stderr, success) = run_engage(config_path, &full);
    assert!(success, "command failed: stdout={}, stderr={}", stdout, stderr);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("invalid JSON ({}): {}", e, stdout))
}

#[test]
fn test_ingest_skips_preamble() {
    let (_tmp, config_path) = setup_test_env();
    let linkedin = files(&config_path, "linkedin.csv");

    let (stdout, stderr, success) = run_engage(&config_path, &["ingest", &linkedin]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("ingest linkedin.csv"));
    assert!(stdout.contains("rows read: 3"));
    assert!(stdout.contains("valid events: 3"));
    assert!(stdout.contains("events stored: 3"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_reingest_same_file_adds_nothing() {
    let (_tmp, config_path) = setup_test_env();
    let linkedin = files(&config_path, "linkedin.csv");

    let (stdout, _, success) = run_engage(&config_path, &["ingest", &linkedin, &linkedin]);
    assert!(success);
    assert!(stdout.contains("events stored: 3"));
    assert!(stdout.contains("duplicates skipped: 3"));
}

#[test]
fn test_directory_walk_uses_globs() {
    let (tmp, config_path) = setup_test_env();
    let dir = tmp.path().join("files");

    let (stdout, stderr, success) =
        run_engage(&config_path, &["ingest", dir.to_str().unwrap()]);
    assert!(success, "ingest failed: stderr={}", stderr);
    assert!(stdout.contains("files: 2 (0 failed)"));
    assert!(!stdout.contains("readme.txt"));
    assert!(stdout.contains("events stored: 5"));
}

#[test]
fn test_unsupported_file_reported_and_run_continues() {
    let (_tmp, config_path) = setup_test_env();
    let readme = files(&config_path, "readme.txt");
    let x = files(&config_path, "x.csv");

    let (stdout, stderr, success) = run_engage(&config_path, &["ingest", &readme, &x]);
    assert!(success, "non-strict run should succeed: {}", stderr);
    assert!(stdout.contains("failed: unsupported file type"));
    assert!(stdout.contains("events stored: 2"));
    assert!(stderr.contains("readme.txt"));
}

#[test]
fn test_strict_fails_on_bad_file() {
    let (_tmp, config_path) = setup_test_env();
    let readme = files(&config_path, "readme.txt");
    let x = files(&config_path, "x.csv");

    let (stdout, stderr, success) =
        run_engage(&config_path, &["ingest", &readme, &x, "--strict"]);
    assert!(!success);
    assert!(stdout.contains("events stored: 2"));
    assert!(stderr.contains("1 of 2 files failed"));
}

#[test]
fn test_no_valid_rows_is_soft() {
    let (tmp, config_path) = setup_test_env();
    let odd = tmp.path().join("scores.csv");
    fs::write(&odd, "Name,Score\nalice,3\nbob,4\n").unwrap();

    let (stdout, _, success) =
        run_engage(&config_path, &["ingest", odd.to_str().unwrap(), "--strict"]);
    assert!(success);
    assert!(stdout.contains("no valid data found"));
    assert!(stdout.contains("events stored: 0"));
}

#[test]
fn test_range_anchors_at_latest_event() {
    let (_tmp, config_path) = setup_test_env();
    let linkedin = files(&config_path, "linkedin.csv");
    let x = files(&config_path, "x.csv");

    // anchor 2024-01-20, window (2024-01-13, 2024-01-20]
    let events = run_json(&config_path, &["events", &linkedin, &x, "--range", "1 week"]);
    let dates: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-15", "2024-01-16", "2024-01-15", "2024-01-20"]);

    let all = run_json(&config_path, &["events", &linkedin, &x, "--range", "All"]);
    assert_eq!(all.as_array().unwrap().len(), 5);
}

#[test]
fn test_platform_filter_moves_anchor() {
    let (_tmp, config_path) = setup_test_env();
    let linkedin = files(&config_path, "linkedin.csv");
    let x = files(&config_path, "x.csv");

    let events = run_json(
        &config_path,
        &["events", &linkedin, &x, "--platform", "LinkedIn", "--range", "1 week"],
    );
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e["platform"] == "LinkedIn"));
    assert!(events.iter().all(|e| e["sourceType"] == "LinkedInContent"));
}

#[test]
fn test_event_fields_normalized() {
    let (_tmp, config_path) = setup_test_env();
    let linkedin = files(&config_path, "linkedin.csv");
    let x = files(&config_path, "x.csv");

    let events = run_json(&config_path, &["events", &linkedin, &x]);
    let events = events.as_array().unwrap();

    let quarterly = events
        .iter()
        .find(|e| e["title"] == "Quarterly numbers")
        .unwrap();
    assert_eq!(quarterly["views"], 1250);
    assert_eq!(quarterly["engagements"], 7 + 30 + 4 + 2);
    assert_eq!(quarterly["link"], "https://linkedin.example/3");

    let thread = events
        .iter()
        .find(|e| e["content"] == "Thread on metrics")
        .unwrap();
    assert_eq!(thread["date"], "2024-01-20");
    assert_eq!(thread["id"], "102");
    assert_eq!(thread["comments"], 5);
    assert_eq!(thread["shares"], 6);
    assert_eq!(thread["engagements"], 90);
}

#[test]
fn test_summary_lists_sources() {
    let (_tmp, config_path) = setup_test_env();
    let linkedin = files(&config_path, "linkedin.csv");
    let x = files(&config_path, "x.csv");

    let (stdout, _, success) = run_engage(&config_path, &["summary", &linkedin, &x]);
    assert!(success);
    assert!(stdout.contains("Engagement Summary"));
    assert!(stdout.contains("Events:             5"));
    assert!(stdout.contains("linkedin.csv"));
    assert!(stdout.contains("x.csv"));

    let summary = run_json(&config_path, &["summary", &linkedin, &x]);
    // linkedin: 34 + 18 + 43, x: 40 + 90
    assert_eq!(summary["overview"]["total_engagements"], 225);
    assert_eq!(summary["overview"]["avg_engagements"], 45);
    assert_eq!(summary["platforms"][0]["platform"], "LinkedIn");
    assert_eq!(summary["platforms"][0]["engagements"], 95);
}

#[test]
fn test_top_orders_by_engagements() {
    let (_tmp, config_path) = setup_test_env();
    let linkedin = files(&config_path, "linkedin.csv");
    let x = files(&config_path, "x.csv");

    let top = run_json(&config_path, &["top", &linkedin, &x, "--limit", "2"]);
    let top = top.as_array().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["engagements"], 90);
    assert_eq!(top[1]["engagements"], 43);
}

#[test]
fn test_kpi_reports_best_and_worst() {
    let (_tmp, config_path) = setup_test_env();
    let x = files(&config_path, "x.csv");

    let kpi = run_json(&config_path, &["kpi", &x, "--metric", "views", "--days", "1"]);
    assert_eq!(kpi["metric"], "views");
    let platform = &kpi["platforms"][0];
    assert_eq!(platform["platform"], "X");
    assert_eq!(platform["best"][0]["date"], "2024-01-20");
    assert_eq!(platform["best"][0]["value"], 800);
    assert_eq!(platform["worst"][0]["date"], "2024-01-15");
    assert_eq!(platform["worst"][0]["posts"], 1);
}

#[test]
fn test_calendar_totals_per_day() {
    let (_tmp, config_path) = setup_test_env();
    let linkedin = files(&config_path, "linkedin.csv");
    let x = files(&config_path, "x.csv");

    let days = run_json(&config_path, &["calendar", &linkedin, &x]);
    let jan15 = days
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["date"] == "2024-01-15")
        .unwrap();
    assert_eq!(jan15["per_platform"]["LinkedIn"], 18);
    assert_eq!(jan15["per_platform"]["X"], 40);
    assert_eq!(jan15["total"], 58);
}

#[test]
fn test_export_writes_file() {
    let (tmp, config_path) = setup_test_env();
    let linkedin = files(&config_path, "linkedin.csv");
    let out = tmp.path().join("out").join("events.json");

    let (_, stderr, success) = run_engage(
        &config_path,
        &["export", &linkedin, "--output", out.to_str().unwrap()],
    );
    assert!(success, "export failed: {}", stderr);
    assert!(stderr.contains("Exported 3 events"));

    let data: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(data["sources"][0], "linkedin.csv");
    assert_eq!(data["events"].as_array().unwrap().len(), 3);
    assert_eq!(data["events"][0]["sourceType"], "LinkedInContent");
}

#[test]
fn test_invalid_config_rejected() {
    let (_tmp, config_path) = setup_test_env();
    fs::write(&config_path, "[view]\nrange = \"fortnight\"\n").unwrap();
    let x = files(&config_path, "x.csv");

    let (_, stderr, success) = run_engage(&config_path, &["events", &x]);
    assert!(!success);
    assert!(stderr.contains("view.range"));
}

#[test]
fn test_missing_config_uses_defaults() {
    let (tmp, _config_path) = setup_test_env();
    let missing = tmp.path().join("config").join("absent.toml");
    let x = tmp.path().join("files").join("x.csv");

    let (stdout, stderr, success) =
        run_engage(&missing, &["ingest", x.to_str().unwrap()]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("events stored: 2"));
}

#[test]
fn test_bad_range_flag_rejected() {
    let (_tmp, config_path) = setup_test_env();
    let x = files(&config_path, "x.csv");

    let (_, stderr, success) = run_engage(&config_path, &["events", &x, "--range", "5 weeks"]);
    assert!(!success);
    assert!(stderr.contains("unknown date range"));
}

#[test]
fn test_ingest_reports_dropped_rows_and_variants() {
    let (tmp, config_path) = setup_test_env();
    let mixed = tmp.path().join("files").join("mixed.csv");
    fs::write(
        &mixed,
        "Date,Post text,Impressions (total),Clicks (total),Reactions (total),Comments (total),Reposts (total)\n2024-01-15,Hello,100,5,10,2,1\nnot a date,Bad,1,1,1,1,1\n",
    )
    .unwrap();
    let mixed = mixed.to_string_lossy().to_string();

    let (stdout, _, success) = run_engage(&config_path, &["ingest", &mixed]);
    assert!(success);
    assert!(stdout.contains("rows dropped: 1"));
    assert!(stdout.contains("LinkedInContent"));

    let json = run_json(&config_path, &["ingest", &mixed]);
    assert_eq!(json["files"][0]["rows_dropped"], 1);
    assert_eq!(json["files"][0]["variants"]["LinkedInContent"], 1);
}
