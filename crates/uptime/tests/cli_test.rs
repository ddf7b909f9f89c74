//! Integration tests for the `uptime-dash` CLI binary.
//!
//! Argument parsing, help output, config handling and error exit codes run
//! without a service; data commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `uptime-dash` binary with env isolation.
///
/// Clears all `UPTIME_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn uptime_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("uptime-dash");
    cmd.env("HOME", "/tmp/uptime-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/uptime-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("UPTIME_API_URL")
        .env_remove("UPTIME_CONFIG")
        .env_remove("UPTIME_OUTPUT")
        .env_remove("UPTIME_API__BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Command wired to `server` with no config file in play.
fn against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = uptime_cmd();
    cmd.args(["--api-url", &format!("{}/api", server.uri())]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn endpoint_json(id: &str, name: &str, active: bool) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "url": format!("https://{name}.example.com/health"),
        "method": "GET",
        "headers": null,
        "expectedStatus": 200,
        "checkInterval": 90,
        "isActive": active,
        "createdAt": "2024-06-01T08:00:00Z",
        "updatedAt": "2024-06-02T08:00:00Z"
    })
}

fn alert_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "endpointId": "ep-1",
        "alertType": "DOWN",
        "message": "Endpoint is down",
        "severity": "HIGH",
        "isAcknowledged": false,
        "createdAt": "2024-06-15T10:30:00Z",
        "acknowledgedAt": null
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = uptime_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    uptime_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("endpoints")
            .and(predicate::str::contains("alerts"))
            .and(predicate::str::contains("logs"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    uptime_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("uptime-dash"));
}

#[test]
fn test_completions_bash() {
    uptime_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_unknown_analytics_window_is_usage_error() {
    uptime_cmd()
        .args(["logs", "analytics", "ep-1", "--hours", "48"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("hours"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("custom.toml");
    uptime_cmd()
        .args(["config", "path", "--config"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");

    uptime_cmd()
        .args(["config", "init", "--defaults", "--config"])
        .arg(&file)
        .assert()
        .success();
    assert!(file.exists());

    uptime_cmd()
        .args(["config", "show", "--config"])
        .arg(&file)
        .args(["--api-url", "https://monitor.internal/api"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("base_url = \"https://monitor.internal/api\"")
                .and(predicate::str::contains("alerts_secs = 15")),
        );
}

#[test]
fn test_invalid_config_value_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, "[polling]\nendpoints_secs = 0\n").unwrap();

    uptime_cmd()
        .args(["endpoints", "list", "--config"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("polling.endpoints_secs"));
}

// ── Errors ──────────────────────────────────────────────────────────

#[test]
fn test_unreachable_service_exits_with_connection_code() {
    let output = uptime_cmd()
        .args(["--api-url", "http://127.0.0.1:9/api", "--timeout", "2"])
        .args(["endpoints", "list"])
        .output()
        .unwrap();
    let text = combined_output(&output);
    assert_eq!(output.status.code(), Some(7), "output:\n{text}");
    assert!(text.contains("127.0.0.1:9"), "output:\n{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_create_sends_nothing() {
    let server = MockServer::start().await;

    against(&server)
        .args(["endpoints", "create", "--name", "billing", "--url", "not a url"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("url"));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_requires_yes_when_not_interactive() {
    let server = MockServer::start().await;

    against(&server)
        .args(["endpoints", "delete", "ep-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));

    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Data commands ───────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_endpoints_list_table_and_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/endpoints"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            endpoint_json("ep-1", "billing", true),
            endpoint_json("ep-2", "search", false)
        ])))
        .mount(&server)
        .await;

    against(&server)
        .args(["endpoints", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("billing")
                .and(predicate::str::contains("Paused"))
                .and(predicate::str::contains("1h 30m")),
        );

    let output = against(&server)
        .args(["endpoints", "list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
    assert_eq!(parsed[0]["isActive"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_alerts_list_open_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .and(query_param("acknowledged", "false"))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([alert_json("a1")])))
        .expect(1)
        .mount(&server)
        .await;

    against(&server)
        .args(["alerts", "list", "--open", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("a1\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_disable_sends_active_flag_only() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/endpoints/ep-1"))
        .and(wiremock::matchers::body_json(json!({ "isActive": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(endpoint_json("ep-1", "billing", false)))
        .expect(1)
        .mount(&server)
        .await;

    against(&server)
        .args(["endpoints", "disable", "ep-1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("billing disabled"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_endpoint_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/endpoints/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "statusCode": 404,
            "message": "Endpoint not found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/health-logs/analytics/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "statusCode": 404,
            "message": "Endpoint not found"
        })))
        .mount(&server)
        .await;

    against(&server)
        .args(["endpoints", "get", "nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Endpoint not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_dashboard_once_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/endpoints"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            endpoint_json("ep-1", "billing", true),
            endpoint_json("ep-2", "search", false),
            endpoint_json("ep-3", "auth", true)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .and(query_param("acknowledged", "false"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([alert_json("a1")])))
        .mount(&server)
        .await;

    let output = against(&server)
        .args(["watch", "dashboard", "--once", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["total_endpoints"], 3);
    assert_eq!(parsed["active_endpoints"], 2);
    assert_eq!(parsed["inactive_endpoints"], 1);
    assert_eq!(parsed["recent_alerts"][0]["id"], "a1");
}
