// End-to-end tests for the `slscheck` binary.
//
// Run with: cargo test -p slscheck-cli --test check_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rusqlite::{params, Connection};
use tempfile::{tempdir, TempDir};

fn slscheck() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_slscheck"));
    cmd.env_remove("RUST_LOG").env_remove("SLSCHECK_CONFIG");
    cmd
}

fn write_gpkg(path: &Path, layer: &str, features: &[(&str, &str, &str)]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE gpkg_contents (table_name TEXT PRIMARY KEY, data_type TEXT NOT NULL);
         CREATE TABLE gpkg_geometry_columns (table_name TEXT, column_name TEXT);
         CREATE TABLE {layer} (fid INTEGER PRIMARY KEY, geom BLOB, idsubsls TEXT, kdsubsls TEXT, nmsls TEXT);
         INSERT INTO gpkg_contents VALUES ('{layer}', 'features');
         INSERT INTO gpkg_geometry_columns VALUES ('{layer}', 'geom');"
    ))
    .unwrap();
    for (id, code, name) in features {
        conn.execute(
            &format!("INSERT INTO {layer} (geom, idsubsls, kdsubsls, nmsls) VALUES (X'4750', ?1, ?2, ?3)"),
            params![id, code, name],
        )
        .unwrap();
    }
}

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    gpkg: PathBuf,
    master: PathBuf,
}

fn fixture(master_csv: &str, features: &[(&str, &str, &str)]) -> Fixture {
    let dir = tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let gpkg = root.join("sls.gpkg");
    let master = root.join("master.csv");
    std::fs::write(&master, master_csv).unwrap();
    write_gpkg(&gpkg, "sls_final", features);
    Fixture { _dir: dir, root, gpkg, master }
}

fn check(f: &Fixture, extra: &[&str]) -> Output {
    slscheck()
        .arg("check")
        .arg("--geometry")
        .arg(&f.gpkg)
        .arg("--master")
        .arg(&f.master)
        .args(extra)
        .output()
        .expect("run slscheck check")
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

fn stderr(o: &Output) -> String {
    String::from_utf8_lossy(&o.stderr).into_owned()
}

const CONSISTENT: &str = "idsubsls,kdsubsls,nmsls\nA1,01,RT 001\nA2,2,RT 002\n";

// ===========================================================================
// check
// ===========================================================================

#[test]
fn consistent_inputs_exit_zero() {
    let f = fixture(CONSISTENT, &[("A1", "01", "RT 001"), ("A2", "02", "RT 002")]);
    let out = check(&f, &["--strict"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Total rows: 2"));
    assert!(text.contains("All records are consistent."));
    assert!(stderr(&out).contains("Reading master register..."));
}

#[test]
fn quiet_suppresses_progress() {
    let f = fixture(CONSISTENT, &[("A1", "01", "RT 001"), ("A2", "02", "RT 002")]);
    let out = check(&f, &["--quiet"]);
    assert!(out.status.success());
    assert!(!stderr(&out).contains("Reading master register..."));
}

#[test]
fn strict_fails_on_mismatch() {
    let f = fixture(CONSISTENT, &[("A1", "01", "RT 001"), ("B9", "09", "RT 009")]);

    let lenient = check(&f, &[]);
    assert!(lenient.status.success());
    let text = stdout(&lenient);
    assert!(text.contains("Found 2 inconsistent row(s):"));
    assert!(text.contains("1. IDSUB_SLS B9: MissingFromMaster"));
    assert!(text.contains("2. IDSUB_SLS A2: MissingFromGeometry"));

    let strict = check(&f, &["--strict", "--quiet"]);
    assert_eq!(strict.status.code(), Some(6));
    assert!(stderr(&strict).contains("2 row(s) not matched"));
}

#[test]
fn json_output_is_single_value() {
    let f = fixture(CONSISTENT, &[("A1", "1", "RT 001")]);
    let out = check(&f, &["--json", "--quiet"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let val: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(val["summary"]["total"], 2);
    assert_eq!(val["summary"]["matched"], 1);
    assert_eq!(val["summary"]["geometry_digit_issues"], 1);
    assert_eq!(val["rows"][0]["code_geometry"], "01");
    assert_eq!(val["report"][0]["IDSUB_SLS"], "A1");
}

#[test]
fn writes_report_and_result_files() {
    let f = fixture(CONSISTENT, &[("A1", "01", "RT 001"), ("A2", "02", "RT 002")]);
    let report = f.root.join("report.csv");
    let result = f.root.join("result.json");
    let out = check(
        &f,
        &["--quiet", "--out", report.to_str().unwrap(), "--output", result.to_str().unwrap()],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let csv = std::fs::read_to_string(&report).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("IDSUB_SLS,NMSLS_GPKG,NMSLS_MASTER,KDSUBSLS_GPKG,KDSUBSLS_GPKG_ORIGINAL,KDSUBSLS_MASTER,KDSUBSLS_MASTER_ORIGINAL,Status")
    );
    assert_eq!(lines.next(), Some("A1,RT 001,RT 001,01,01,01,01,Matched"));
    assert!(csv.contains("=== KDSUBSLS DIGIT ISSUES ==="));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&result).unwrap()).unwrap();
    assert_eq!(json["master_anomalies"].as_array().unwrap().len(), 1);
}

#[test]
fn config_remaps_columns() {
    let f = fixture(
        "ID,KODE,NAMA\nA1,01,RT 001\n",
        &[("A1", "01", "RT 001")],
    );
    let config = f.root.join("c.toml");
    std::fs::write(
        &config,
        "[master.columns]\nidsubsls = \"ID\"\nkdsubsls = \"KODE\"\nnmsls = \"NAMA\"\n",
    )
    .unwrap();

    let without = check(&f, &["--quiet"]);
    assert_eq!(without.status.code(), Some(4));
    assert!(stderr(&without).contains("master: missing column 'idsubsls'"));

    let with = check(&f, &["--quiet", "--config", config.to_str().unwrap()]);
    assert!(with.status.success(), "stderr: {}", stderr(&with));
}

#[test]
fn empty_master_is_input_error() {
    let f = fixture("idsubsls,kdsubsls,nmsls\n", &[("A1", "01", "RT 001")]);
    let out = check(&f, &["--quiet"]);
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("master: no data rows"));
}

#[test]
fn unknown_layer_is_io_error() {
    let f = fixture(CONSISTENT, &[("A1", "01", "RT 001")]);
    let out = check(&f, &["--quiet", "--layer", "nope"]);
    assert_eq!(out.status.code(), Some(5));
}

#[test]
fn invalid_files_are_usage_errors() {
    let dir = tempdir().unwrap();
    let shp = dir.path().join("sls.shp");
    let master = dir.path().join("master.csv");
    std::fs::write(&shp, b"").unwrap();
    std::fs::write(&master, CONSISTENT).unwrap();

    let out = slscheck()
        .arg("check")
        .arg("--geometry")
        .arg(&shp)
        .arg("--master")
        .arg(&master)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains(".gpkg extension"));

    let missing = slscheck()
        .args(["check", "--geometry", "/nonexistent/sls.gpkg", "--master"])
        .arg(&master)
        .output()
        .unwrap();
    assert_eq!(missing.status.code(), Some(2));
}

// ===========================================================================
// layers / config
// ===========================================================================

#[test]
fn layers_lists_feature_tables() {
    let f = fixture(CONSISTENT, &[("A1", "01", "RT 001")]);
    let out = slscheck().arg("layers").arg(&f.gpkg).output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "sls_final");
}

#[test]
fn config_show_defaults() {
    let out = slscheck().args(["config", "show"]).output().unwrap();
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("anomaly_detail_limit = 10"));
    assert!(text.contains("progress_interval = 100"));
}

#[test]
fn config_validate_rejects_bad_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[geometry.columns]\nidsubsls = \"X\"\nkdsubsls = \"X\"\n").unwrap();
    let out = slscheck().args(["config", "validate"]).arg(&path).output().unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("both map to 'X'"));
}
