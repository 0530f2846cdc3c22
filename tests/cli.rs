//! Binary-level tests: argument handling, exit codes and config discovery.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(relative)
}

fn kbstats(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kbstats").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn stats_writes_report_and_summary() {
    let dir = TempDir::new().unwrap();
    let output = kbstats(dir.path())
        .args(["stats", "-k", "PC", "--fm"])
        .arg(fixture("fms/smartwatch.sxfm"))
        .args(["-o", "report.txt"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 entries to report.txt"), "{stdout}");

    let report = fs::read_to_string(dir.path().join("report.txt")).unwrap();
    assert!(report.starts_with("1\nName: PCConfigurationProblem\n"));
    assert!(report.contains("\n2\nName: smartwatch.sxfm\n"));
}

#[test]
fn default_output_is_statistics_txt() {
    let dir = TempDir::new().unwrap();
    kbstats(dir.path())
        .args(["stats", "-k", "Renault"])
        .assert()
        .success();
    let report = fs::read_to_string(dir.path().join("statistics.txt")).unwrap();
    assert!(report.contains("#Choco variables: 3178088\n"));
}

#[test]
fn unknown_identifier_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    let output = kbstats(dir.path())
        .args(["stats", "-k", "PC", "-k", "Boeing"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("The knowledge base is not supported: Boeing"),
        "{stderr}"
    );
    let report = fs::read_to_string(dir.path().join("statistics.txt")).unwrap();
    assert!(report.contains("PCConfigurationProblem"));
}

#[test]
fn keep_going_reports_skipped_files() {
    let dir = TempDir::new().unwrap();
    let models = dir.path().join("models");
    fs::create_dir(&models).unwrap();
    fs::copy(fixture("fms/smartwatch.sxfm"), models.join("smartwatch.sxfm")).unwrap();
    fs::write(models.join("notes.txt"), "not a model").unwrap();

    let output = kbstats(dir.path())
        .args(["stats", "--fm-dir", "models", "--keep-going"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 entry"), "{stdout}");
    assert!(stdout.contains("notes.txt"), "{stdout}");
}

#[test]
fn config_file_sets_output_and_policy() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".kbstats.toml"),
        "[output]\npath = \"from-config.txt\"\n[batch]\non_error = \"continue\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("bad.sxfm"), "nothing").unwrap();

    kbstats(dir.path())
        .args(["stats", "-k", "PC", "--fm", "bad.sxfm"])
        .assert()
        .success();
    assert!(dir.path().join("from-config.txt").is_file());
}

#[test]
fn init_creates_config_once() {
    let dir = TempDir::new().unwrap();
    kbstats(dir.path()).arg("init").assert().success();
    assert!(dir.path().join(".kbstats.toml").is_file());

    kbstats(dir.path()).arg("init").assert().failure();
    kbstats(dir.path()).args(["init", "--force"]).assert().success();
}
