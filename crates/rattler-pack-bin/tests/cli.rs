use assert_cmd::Command;
use predicates::prelude::*;

fn rattler_pack() -> Command {
    Command::cargo_bin("rattler-pack").unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    rattler_pack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pack"))
        .stdout(predicate::str::contains("extract"));
}

#[test]
fn test_pack_requires_paths() {
    rattler_pack().arg("pack").assert().failure();
}

#[test]
fn test_pack_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    rattler_pack()
        .arg("pack")
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Specified path does not exist"))
        .stderr(predicate::str::contains("1 of 1 paths could not be packed"));
}

#[test]
fn test_extract_missing_archive_reports_code() {
    let dir = tempfile::tempdir().unwrap();
    rattler_pack()
        .arg("extract")
        .arg(dir.path().join("missing.zip"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("code -4"));
}

#[test]
fn test_extract_directory_reports_code() {
    let dir = tempfile::tempdir().unwrap();
    rattler_pack()
        .arg("extract")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("code -2"));
}

#[test]
fn test_extract_non_zip_reports_code() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "plain text").unwrap();
    rattler_pack()
        .args(["extract", "--silent"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("code -3"));
}

#[test]
fn test_invalid_disk_image_pattern_is_rejected() {
    rattler_pack()
        .args(["pack", "--disk-image", "(", "somewhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--disk-image"));
}
