//! Argument handling, intake validation and configuration commands

use super::common::TestContext;
use assert_fs::prelude::*;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let ctx = TestContext::new();
    ctx.ziprepo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("login"));
}

#[test]
fn test_upload_requires_inputs() {
    let ctx = TestContext::new();
    ctx.ziprepo()
        .args(["upload", "--repo", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("INPUTS"));
}

#[test]
fn test_upload_requires_repo() {
    let ctx = TestContext::new();
    let archive = ctx.zip("site.zip", &[("index.html", "<html>")]);
    ctx.ziprepo()
        .arg("upload")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--repo"));
}

#[test]
fn test_upload_missing_input() {
    let ctx = TestContext::new();
    ctx.ziprepo()
        .args(["upload", "nowhere.zip", "--repo", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input not found"));
}

#[test]
fn test_upload_rejects_disallowed_extension() {
    let ctx = TestContext::new();
    ctx.temp.child("notes.txt").write_str("hello").unwrap();

    ctx.ziprepo()
        .args(["upload", "notes.txt", "--repo", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Rejected input notes.txt"))
        .stderr(predicate::str::contains("allowed_extensions"));
}

#[test]
fn test_upload_corrupt_archive() {
    let ctx = TestContext::new();
    ctx.temp
        .child("broken.zip")
        .write_str("definitely not a zip")
        .unwrap();

    ctx.ziprepo()
        .args(["upload", "broken.zip", "--repo", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Invalid or corrupted ZIP file: broken.zip",
        ));
}

#[test]
fn test_upload_directory_only_archive() {
    let ctx = TestContext::new();
    ctx.zip("dirs.zip", &[("docs/", ""), ("docs/img/", "")]);

    ctx.ziprepo()
        .args(["upload", "dirs.zip", "--repo", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No valid files found in dirs.zip"));
}

#[test]
fn test_upload_without_token_fails_after_extraction() {
    let ctx = TestContext::new();
    ctx.zip("site.zip", &[("index.html", "<html>")]);
    // Never reach the real API, even if the keychain holds a token
    ctx.write_config("api_url: http://127.0.0.1:9\n");

    ctx.ziprepo()
        .args(["upload", "site.zip", "--repo", "demo"])
        .env("GITHUB_TOKEN", "")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Prepared 1 file(s)"));
}

#[test]
fn test_config_path() {
    let ctx = TestContext::new();
    ctx.ziprepo()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));
}

#[test]
fn test_config_show_creates_defaults() {
    let ctx = TestContext::new();
    ctx.ziprepo()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api_url: https://api.github.com"))
        .stdout(predicate::str::contains("max_requests: 5000"))
        .stdout(predicate::str::contains("mode: grace"));

    #[cfg(target_os = "linux")]
    assert!(ctx.config_file().exists());
}

#[test]
fn test_config_show_invalid_rate_limit() {
    let ctx = TestContext::new();
    ctx.write_config("rate_limit:\n  max_requests: 0\n  per_minutes: 60\n");

    ctx.ziprepo()
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rate_limit"));
}
