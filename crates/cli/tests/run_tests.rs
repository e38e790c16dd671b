// Integration tests for `ownerdata run`, `status` and `config`.
// Run with: cargo test -p ownerdata-cli --test run_tests -- --nocapture

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use ownerdata_engine::reference::REQUIRED_COLUMNS;
use tempfile::TempDir;

fn ownerdata(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ownerdata"));
    cmd.current_dir(workdir);
    // keep the user's real settings file out of the picture
    cmd.env("OWNERDATA_CONFIG", workdir.join("config.toml"));
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Working folder with an empty settings file and the default layout.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "").unwrap();
    fs::create_dir_all(dir.path().join("bu_database")).unwrap();
    fs::create_dir_all(dir.path().join("files_to_process")).unwrap();
    dir
}

fn write_reference(dir: &Path, name: &str, rows: &[&[(&str, &str)]]) {
    let conn = rusqlite::Connection::open(dir.join("bu_database").join(name)).unwrap();
    let columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| format!("\"{}\" TEXT", c)).collect();
    conn.execute_batch(&format!("CREATE TABLE bottoms_up ({});", columns.join(", ")))
        .unwrap();

    for row in rows {
        let names: Vec<String> = row.iter().map(|(c, _)| format!("\"{}\"", c)).collect();
        let marks: Vec<&str> = row.iter().map(|_| "?").collect();
        let sql = format!(
            "INSERT INTO bottoms_up ({}) VALUES ({})",
            names.join(", "),
            marks.join(", ")
        );
        let values: Vec<&str> = row.iter().map(|(_, v)| *v).collect();
        conn.execute(&sql, rusqlite::params_from_iter(values)).unwrap();
    }
}

fn standard_reference(dir: &Path) {
    write_reference(
        dir,
        "bu.db",
        &[
            &[
                ("id", "x1"),
                ("contact_group_id", "G"),
                ("phone1", "(555) 123-4567"),
                ("Serial Number", "SN100"),
                ("date_created", "2024-02-10 08:00:00"),
                ("Owner", "Owner One"),
            ],
            &[("id", "x2"), ("contact_group_id", "G"), ("Owner", "Owner Two")],
        ],
    );
}

fn write_input(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join("files_to_process").join(name), content).unwrap();
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (headers, rows)
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_writes_enriched_output_and_json_result() {
    let ws = workspace();
    standard_reference(ws.path());
    write_input(ws.path(), "leads.csv", "phone_number,source\n555-123-4567,mailer\n999,web\n");

    let output = ownerdata(ws.path())
        .args(["run", "--progress", "off", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(result["outcome"], "completed");
    assert_eq!(result["reference_records"], 2);
    assert_eq!(result["total_rows"], 2);
    assert_eq!(result["files"][0]["name"], "leads.csv");
    assert_eq!(result["files"][0]["matched_records"], 1);
    assert_eq!(result["files"][0]["unmatched_records"], 1);
    assert_eq!(result["files"][0]["output_rows"], 3);

    let (headers, rows) = read_csv(&ws.path().join("results").join("output_leads.csv"));
    let id = headers.iter().position(|h| h == "id").unwrap();
    let owner = headers.iter().position(|h| h == "Owner").unwrap();
    let date = headers.iter().position(|h| h == "date_created").unwrap();
    assert_eq!(headers[0], "phone_number");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][id], "X1");
    assert_eq!(rows[0][owner], "Owner One");
    assert_eq!(rows[0][date], "2024-02-10");
    assert_eq!(rows[1][id], "X2");
    assert_eq!(rows[2][0], "999");
    assert_eq!(rows[2][id], "");
}

#[test]
fn run_keeps_lead_with_blank_phone() {
    let ws = workspace();
    standard_reference(ws.path());
    write_input(ws.path(), "leads.csv", "phone_number,name\n,\n5551234567,Ann\n");

    let output = ownerdata(ws.path())
        .args(["run", "--progress", "off", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["total_rows"], 2);
    assert_eq!(result["files"][0]["unmatched_records"], 1);

    let (headers, rows) = read_csv(&ws.path().join("results").join("output_leads.csv"));
    let id = headers.iter().position(|h| h == "id").unwrap();
    let owner = headers.iter().position(|h| h == "Owner").unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "");
    assert_eq!(rows[0][id], "");
    assert_eq!(rows[0][owner], "");
    assert_eq!(rows[1][id], "X1");
    assert_eq!(rows[2][id], "X2");
}

#[test]
fn run_creates_missing_folders_then_reports_missing_reference() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "").unwrap();

    let output = ownerdata(dir.path()).args(["run"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("no .db file found"));
    for folder in ["bu_database", "files_to_process", "results"] {
        assert!(dir.path().join(folder).is_dir(), "{folder} not created");
    }
}

#[test]
fn run_with_two_databases_is_ambiguous() {
    let ws = workspace();
    standard_reference(ws.path());
    write_reference(ws.path(), "other.db", &[]);

    let output = ownerdata(ws.path()).args(["run"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("bu.db, other.db"));
}

#[test]
fn run_single_file_without_key_column_is_schema_error() {
    let ws = workspace();
    standard_reference(ws.path());
    write_input(ws.path(), "bad.csv", "name,city\nA,B\n");

    let output = ownerdata(ws.path())
        .args(["run", "--progress", "off"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("bad.csv: missing required columns"));
    assert!(!ws.path().join("results").join("output_bad.csv").exists());
}

#[test]
fn run_with_no_inputs_succeeds_and_writes_nothing() {
    let ws = workspace();
    standard_reference(ws.path());

    let summary = ws.path().join("summary.json");
    let output = ownerdata(ws.path())
        .args(["run", "--summary", summary.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let result: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(result["outcome"], "nothing_to_process");
    assert_eq!(fs::read_dir(ws.path().join("results")).unwrap().count(), 0);
}

#[test]
fn run_json_progress_goes_to_stderr() {
    let ws = workspace();
    standard_reference(ws.path());
    write_input(ws.path(), "ids.csv", "id\nx1\nx2\n");

    let output = ownerdata(ws.path())
        .args(["run", "--progress", "json", "--quiet"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let events: Vec<serde_json::Value> = stderr(&output)
        .lines()
        .filter(|l| l.starts_with('{'))
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"], "progress");
    assert_eq!(events[0]["fraction"], 0.5);
    assert_eq!(events[1]["fraction"], 1.0);
    assert_eq!(events[1]["file"], "ids.csv");
}

// ---------------------------------------------------------------------------
// status / config
// ---------------------------------------------------------------------------

#[test]
fn status_reports_readiness() {
    let ws = workspace();
    let output = ownerdata(ws.path()).args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["readiness"], "missing_both");

    standard_reference(ws.path());
    write_input(ws.path(), "b.xlsx", "");
    write_input(ws.path(), "a.CSV", "id\n");

    let output = ownerdata(ws.path()).args(["status", "--json"]).output().unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["readiness"], "ready");
    assert_eq!(report["reference_files"], serde_json::json!(["bu.db"]));
    assert_eq!(report["input_files"], serde_json::json!(["a.CSV", "b.xlsx"]));
}

#[test]
fn config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.toml");

    let output = ownerdata(dir.path())
        .env("OWNERDATA_CONFIG", &config)
        .args(["config", "init"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(config.exists());

    // second init without --force refuses
    let output = ownerdata(dir.path())
        .env("OWNERDATA_CONFIG", &config)
        .args(["config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let output = ownerdata(dir.path())
        .env("OWNERDATA_CONFIG", &config)
        .args(["config", "show", "--output-dir", "out"])
        .output()
        .unwrap();
    let shown = String::from_utf8_lossy(&output.stdout);
    assert!(shown.contains("reference_table = \"bottoms_up\""));
    assert!(shown.contains("out"));
}

#[test]
fn unreadable_config_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = ownerdata(dir.path())
        .env("OWNERDATA_CONFIG", dir.path().join("missing.toml"))
        .args(["status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}
