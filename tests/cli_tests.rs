//! Command-line surface tests; none of these reach the encoder

use assert_cmd::Command;
use predicates::prelude::*;

fn clipstudio(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("clipstudio").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("CLIPSTUDIO_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    clipstudio(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cut"))
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("add-audio"))
        .stdout(predicate::str::contains("waveform"));
}

#[test]
fn test_reversed_range_is_rejected_before_probing() {
    let dir = tempfile::tempdir().unwrap();
    clipstudio(&dir)
        .args(["cut", "-i", "missing.mp4", "-s", "10", "-e", "5", "--preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid parameters"));
}

#[test]
fn test_output_or_preview_is_required() {
    let dir = tempfile::tempdir().unwrap();
    clipstudio(&dir)
        .args(["cut", "-i", "talk.mp4", "-s", "0", "-e", "5"])
        .assert()
        .failure();

    clipstudio(&dir)
        .args([
            "cut", "-i", "talk.mp4", "-s", "0", "-e", "5", "--preview", "-o", "out.mp4",
        ])
        .assert()
        .failure();
}

#[test]
fn test_bad_timestamp_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    clipstudio(&dir)
        .args(["cut", "-i", "talk.mp4", "-s", "soon", "-e", "5", "--preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("soon"));
}

#[test]
fn test_unknown_merge_mode_fails() {
    let dir = tempfile::tempdir().unwrap();
    clipstudio(&dir)
        .args([
            "merge", "--base", "a.mp4", "--insert", "b.mp4", "--at", "1", "--mode", "sideways",
            "--preview",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sideways"));
}

#[test]
fn test_broken_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clipstudio.toml"), "[clipstudio\nthreads = ").unwrap();
    clipstudio(&dir)
        .args(["probe", "-i", "talk.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}
