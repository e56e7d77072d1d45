//! Integration tests for the `headdeck` CLI binary.
//!
//! Argument parsing, help, completions, and error exit codes run without
//! any server. Listing commands run against a wiremock stand-in for the
//! gateway.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const NONEXISTENT_HOME: &str = "/tmp/headdeck-cli-test-nonexistent";

/// Build a [`Command`] for the `headdeck` binary with env isolation.
///
/// Clears all `HEADDECK_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn headdeck_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("headdeck");
    cmd.env("HOME", NONEXISTENT_HOME)
        .env("XDG_CONFIG_HOME", NONEXISTENT_HOME)
        .env_remove("HEADDECK_PROFILE")
        .env_remove("HEADDECK_GATEWAY_URL")
        .env_remove("HEADDECK_API_KEY")
        .env_remove("HEADDECK_CONFIG")
        .env_remove("HEADDECK_OUTPUT")
        .env_remove("HEADDECK_INSECURE")
        .env_remove("HEADDECK_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A mock gateway answering all four list endpoints; three nodes.
fn mock_gateway(rt: &tokio::runtime::Runtime) -> MockServer {
    rt.block_on(async {
        let server = MockServer::start().await;
        let bodies = [
            ("/api/v1/user", json!({ "users": [] })),
            ("/api/v1/routes", json!({ "routes": [] })),
            ("/api/v1/apikey", json!({ "apiKeys": [] })),
            (
                "/api/v1/node",
                json!({ "nodes": [
                    { "id": "1", "name": "a", "user": { "id": "1", "name": "alice" } },
                    { "id": "2", "name": "b", "user": { "id": "1", "name": "alice" } },
                    { "id": "3", "name": "c", "givenName": "gw", "user": { "id": "2", "name": "bob" } }
                ]}),
            ),
        ];
        for (endpoint, body) in bodies {
            Mock::given(method("GET"))
                .and(path(endpoint))
                .and(header("authorization", "Bearer test-key"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;
        }
        server
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = headdeck_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    headdeck_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Headscale")
            .and(predicate::str::contains("serve"))
            .and(predicate::str::contains("nodes"))
            .and(predicate::str::contains("summary")),
    );
}

#[test]
fn test_version_flag() {
    headdeck_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("headdeck"));
}

#[test]
fn test_completions_bash() {
    headdeck_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_output_format() {
    headdeck_cmd()
        .args(["-o", "xml", "nodes"])
        .assert()
        .code(2);
}

// ── Credential handling ─────────────────────────────────────────────

#[test]
fn test_missing_credential_exits_with_auth_code() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, "[profiles.cli-test-empty]\n").unwrap();

    let output = headdeck_cmd()
        .args(["--gateway", &server.uri(), "--profile", "cli-test-empty"])
        .args(["--config", file.to_str().unwrap()])
        .arg("nodes")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("headdeck setup"), "Expected setup hint:\n{text}");
    let requests = rt.block_on(server.received_requests()).unwrap();
    assert!(requests.is_empty(), "no request may be sent without a key");
}

#[test]
fn test_unknown_profile_is_usage_error() {
    headdeck_cmd()
        .args(["--profile", "nope", "nodes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_setup_rejects_empty_key() {
    headdeck_cmd()
        .args(["--api-key", "   ", "setup", "--no-verify"])
        .assert()
        .code(2);
}

// ── Listing through the gateway ─────────────────────────────────────

#[test]
fn test_summary_json_counts_and_selection() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = mock_gateway(&rt);

    let output = headdeck_cmd()
        .args(["--gateway", &server.uri(), "--api-key", "test-key"])
        .args(["-o", "json", "summary", "--path", "/nodes"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let counts: Vec<u64> = body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![0, 3, 0, 0]);
    assert_eq!(body["path"], "/nodes");
    assert_eq!(body["selected"]["label"], "Nodes");
}

#[test]
fn test_summary_unknown_path_selects_nothing() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = mock_gateway(&rt);

    let output = headdeck_cmd()
        .args(["--gateway", &server.uri(), "--api-key", "test-key"])
        .args(["-o", "json-compact", "summary", "--path", "/nodes/"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(body["selected"].is_null());
}

#[test]
fn test_nodes_plain_lists_ids() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = mock_gateway(&rt);

    headdeck_cmd()
        .args(["--gateway", &server.uri(), "--api-key", "test-key"])
        .args(["-o", "plain", "nodes"])
        .assert()
        .success()
        .stdout("1\n2\n3\n");
}

#[test]
fn test_rejected_key_exits_with_auth_code() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        server
    });

    headdeck_cmd()
        .args(["--gateway", &server.uri(), "--api-key", "stale"])
        .arg("users")
        .assert()
        .code(3);
}

#[test]
fn test_server_error_exits_nonzero_with_message() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/routes"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database is locked"))
            .mount(&server)
            .await;
        server
    });

    headdeck_cmd()
        .args(["--gateway", &server.uri(), "--api-key", "test-key"])
        .arg("routes")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("500"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    headdeck_cmd()
        .args(["--config", "/tmp/headdeck-elsewhere.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/headdeck-elsewhere.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    let file = file.to_str().unwrap();

    headdeck_cmd()
        .args(["--config", file, "config", "init"])
        .assert()
        .success();

    headdeck_cmd()
        .args(["--config", file, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upstream"));

    // A second init must not clobber the file.
    headdeck_cmd()
        .args(["--config", file, "config", "init"])
        .assert()
        .code(2);
}
