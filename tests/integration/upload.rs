//! End-to-end uploads against a mock GitHub API

use super::common::TestContext;
use serde_json::json;
use std::process::Output;
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "ghp_e2e_token";

fn repo_json(server: &MockServer, default_branch: &str) -> serde_json::Value {
    json!({
        "id": 42,
        "name": "demo",
        "full_name": "octo/demo",
        "html_url": "https://github.com/octo/demo",
        "default_branch": default_branch,
        "private": false,
        "url": format!("{}/repos/octo/demo", server.uri()),
    })
}

fn configure(ctx: &TestContext, server: &MockServer) {
    ctx.write_config(&format!(
        "api_url: {}\nreadiness:\n  mode: grace\n  grace_ms: 0\n",
        server.uri()
    ));
}

async fn run_upload(ctx: &TestContext, args: &[&str]) -> Output {
    let mut cmd = ctx.ziprepo();
    cmd.arg("upload").args(args).env("GITHUB_TOKEN", TOKEN);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mount_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octo" })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_new_repository_upload() {
    let server = MockServer::start().await;
    let ctx = TestContext::new();
    configure(&ctx, &server);
    mount_user(&server).await;

    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(body_partial_json(json!({ "name": "demo", "private": false })))
        .respond_with(ResponseTemplate::new(201).set_body_json(repo_json(&server, "main")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json(&server, "main")))
        .mount(&server)
        .await;

    for file in ["index.html", "css/app.css"] {
        Mock::given(method("GET"))
            .and(path(format!("/repos/octo/demo/contents/{}", file)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path(format!("/repos/octo/demo/contents/{}", file)))
            .and(body_partial_json(json!({ "message": format!("Add {}", file) })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "content": {} })))
            .expect(1)
            .mount(&server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/repos/octo/demo/pulls"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    ctx.zip(
        "site.zip",
        &[("css/", ""), ("index.html", "<html>"), ("css/app.css", "body {}")],
    );

    let output = run_upload(&ctx, &["site.zip", "--repo", "demo"]).await;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stdout.contains("Prepared 2 file(s)"));
    assert!(stdout.contains("Created repository octo/demo"));
    assert!(stdout.contains("Repository: https://github.com/octo/demo"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_existing_repository_opens_pull_request() {
    let server = MockServer::start().await;
    let ctx = TestContext::new();
    configure(&ctx, &server);
    mount_user(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json(&server, "trunk")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/git/ref/heads/trunk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/trunk",
            "object": { "sha": "base-sha", "type": "commit" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/demo/git/refs"))
        .and(body_partial_json(json!({ "sha": "base-sha" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/README.md"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "README.md",
            "path": "README.md",
            "sha": "abc123"
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/repos/octo/demo/contents/README.md"))
        .and(body_partial_json(json!({
            "message": "Update README.md",
            "sha": "abc123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": {} })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/demo/pulls"))
        .and(body_partial_json(json!({
            "base": "trunk",
            "title": "Update repository content"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "number": 7,
            "html_url": "https://github.com/octo/demo/pull/7"
        })))
        .expect(1)
        .mount(&server)
        .await;

    ctx.zip("docs.zip", &[("README.md", "# Updated")]);

    let output = run_upload(&ctx, &["docs.zip", "--repo", "demo", "--existing"]).await;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stdout.contains("Pull request: https://github.com/octo/demo/pull/7"));
    assert!(!stdout.contains("Created repository"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_write_reports_path() {
    let server = MockServer::start().await;
    let ctx = TestContext::new();
    configure(&ctx, &server);
    mount_user(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json(&server, "main")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/main",
            "object": { "sha": "base-sha" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/demo/git/refs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/src/broken.bin"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/demo/contents/src/broken.bin"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "message": "is at 000 but expected 111" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/demo/pulls"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    ctx.zip("bad.zip", &[("src/broken.bin", "\u{1}\u{2}")]);

    let output = run_upload(&ctx, &["bad.zip", "--repo", "demo", "--existing"]).await;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Failed to upload src/broken.bin"), "stderr: {}", stderr);
    assert!(stderr.contains("is at 000 but expected 111"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_token() {
    let server = MockServer::start().await;
    let ctx = TestContext::new();
    configure(&ctx, &server);

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
        )
        .mount(&server)
        .await;

    ctx.zip("site.zip", &[("index.html", "<html>")]);

    let output = run_upload(&ctx, &["site.zip", "--repo", "demo"]).await;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Authentication failed"), "stderr: {}", stderr);
    assert!(stderr.contains("ziprepo login"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repository_name_taken() {
    let server = MockServer::start().await;
    let ctx = TestContext::new();
    configure(&ctx, &server);
    mount_user(&server).await;

    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Repository creation failed."
        })))
        .mount(&server)
        .await;

    ctx.zip("site.zip", &[("index.html", "<html>")]);

    let output = run_upload(&ctx, &["site.zip", "--repo", "demo"]).await;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Repository name already exists or is invalid"));
}
