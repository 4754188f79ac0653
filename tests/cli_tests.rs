//! Command-line tests for the draw-solver binary

use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HISTORY_CSV: &str = "\
id,game_type_id,game_id,draw_date,draw_number,success,machine
w1,1,1,2024-01-01,500,3 8 15 22 41 49,5 12 19 27 33 44
w2,1,1,2024-01-08,501,9 3 16 23 42 48,6 13 20 28 34 45
w3,1,1,2024-01-15,502,3 11 15 30 40 47,7 14 21 29 35 46
w4,1,1,2024-01-22,503,3 12 17 31 39 46,15 16 22 36 37 38
";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn draw_solver() -> Command {
    Command::cargo_bin("draw-solver").unwrap()
}

fn search(history: &Path) -> Command {
    let mut cmd = draw_solver();
    cmd.arg("search").arg(history);
    cmd
}

#[test]
fn test_single_row_text_output() {
    let dir = TempDir::new().unwrap();
    let history = write_file(&dir, "draws.csv", HISTORY_CSV);

    search(&history)
        .args(["--mode", "single-row", "--scope", "position", "--row", "3,,,,,"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: single-row"))
        .stdout(predicate::str::contains("w1"))
        .stdout(predicate::str::contains("w3"))
        .stdout(predicate::str::contains("w2").not());
}

#[test]
fn test_json_output_is_parseable() {
    let dir = TempDir::new().unwrap();
    let history = write_file(&dir, "draws.csv", HISTORY_CSV);

    let output = search(&history)
        .args(["--format", "json", "--mode", "knocking", "--logic", "zebra"])
        .args(["--row", "3", "--row", "", "--row", ""])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["diagnostics"]["hits"], 2);
    assert_eq!(json["diagnostics"]["skipped"]["end_of_history"], 2);
    assert_eq!(json["results"][0]["detail"]["kind"], "knocking");
    assert_eq!(json["results"][0]["draw_ids"][0], "w1");
}

#[test]
fn test_tsv_output_has_header() {
    let dir = TempDir::new().unwrap();
    let history = write_file(&dir, "draws.csv", HISTORY_CSV);

    search(&history)
        .args(["-f", "tsv", "--mode", "lapping", "--logic", "positional"])
        .args(["--row", "3", "--row", ""])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("rank\tstart\tdraw_ids"))
        .stdout(predicate::str::contains("w3,w4"));
}

#[test]
fn test_query_file() {
    let dir = TempDir::new().unwrap();
    let history = write_file(&dir, "draws.csv", HISTORY_CSV);
    let query = write_file(
        &dir,
        "query.json",
        r#"{"mode": "pattern", "rows": [[15]], "machine_rows": [[3]]}"#,
    );

    search(&history)
        .arg("--query")
        .arg(&query)
        .args(["--format", "json", "--include-misses"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success_to_machine\""));
}

#[test]
fn test_invalid_cell_rejected_unless_lenient() {
    let dir = TempDir::new().unwrap();
    let history = write_file(&dir, "draws.csv", HISTORY_CSV);

    search(&history)
        .args(["--mode", "single-row", "--row", "3,abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("abc"));

    search(&history)
        .args(["--mode", "single-row", "--row", "3,abc", "--lenient"])
        .assert()
        .success()
        .stderr(predicate::str::contains("invalid cell treated as wildcard"));
}

#[test]
fn test_unknown_logic_fails() {
    let dir = TempDir::new().unwrap();
    let history = write_file(&dir, "draws.csv", HISTORY_CSV);

    search(&history)
        .args(["--mode", "lapping", "--logic", "spiral", "--row", "3", "--row", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown logic 'spiral'"));
}

#[test]
fn test_mode_required_without_query_file() {
    let dir = TempDir::new().unwrap();
    let history = write_file(&dir, "draws.csv", HISTORY_CSV);

    search(&history).args(["--row", "3"]).assert().failure();
}

#[test]
fn test_history_summary_from_gzip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("draws.csv.gz");
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder.write_all(HISTORY_CSV.as_bytes()).unwrap();
    encoder.finish().unwrap();

    draw_solver()
        .arg("history")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Draws: 4"))
        .stdout(predicate::str::contains("2024-01-01 to 2024-01-22"))
        .stdout(predicate::str::contains("Years: 2024 to 2024"));
}

#[test]
fn test_history_json_reports_year_span() {
    let dir = TempDir::new().unwrap();
    let history = write_file(&dir, "draws.csv", HISTORY_CSV);

    let output = draw_solver()
        .args(["--format", "json", "history"])
        .arg(&history)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["draws"], 4);
    assert_eq!(json["first_year"], 2024);
    assert_eq!(json["last_year"], 2024);
}

#[test]
fn test_missing_history_file() {
    draw_solver()
        .args(["history", "/nonexistent/draws.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load history"));
}
