//! Integration tests for the `domru` CLI binary.
//!
//! Argument parsing, help output and error handling run without a network.
//! Flows that talk to the API run against a local `wiremock` server whose
//! URL is written into a temporary config file.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `domru` binary with env isolation.
///
/// Clears `DOMRU_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn domru_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("domru");
    cmd.env("HOME", "/tmp/domru-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/domru-cli-test-nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("DOMRU_CONFIG")
        .env_remove("DOMRU_OUTPUT")
        .env_remove("DOMRU_API_URL")
        .env_remove("DOMRU_TIMEOUT")
        .env_remove("DOMRU_INSECURE")
        .env_remove("DOMRU_SESSION__ACCESS_TOKEN")
        .env_remove("DOMRU_SESSION__REFRESH_TOKEN")
        .env_remove("DOMRU_SESSION__OPERATOR_ID");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Temp dir with a config file pointing at `api_url`, optionally signed in.
fn write_config(api_url: &str, signed_in: bool) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut raw = format!("api_url = \"{api_url}\"\ntimeout = 5\n");
    if signed_in {
        raw.push_str(
            "\n[session]\noperator_id = 2\naccess_token = \"access-1\"\nrefresh_token = \"refresh-1\"\nplace_id = 5\n",
        );
    }
    std::fs::write(&path, raw).unwrap();
    (dir, path)
}

fn read_config(path: &Path) -> toml::Table {
    std::fs::read_to_string(path).unwrap().parse().unwrap()
}

fn places_body() -> serde_json::Value {
    json!({
        "data": [{
            "id": 100,
            "subscriberType": "owner",
            "place": {
                "id": 5,
                "address": { "visibleAddress": "Lenina 1, apt 5" },
                "accessControls": [
                    { "id": 9, "name": "Front door", "forpostGroupId": "1234", "allowOpen": true }
                ]
            },
            "blocked": false
        }]
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = domru_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    domru_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("login")
            .and(predicate::str::contains("access"))
            .and(predicate::str::contains("cameras")),
    );
}

#[test]
fn test_version_flag() {
    domru_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("domru"));
}

#[test]
fn test_completions_zsh() {
    domru_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    domru_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_output_format() {
    let output = domru_cmd()
        .args(["--output", "yaml", "places"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_places_without_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("missing.toml");

    domru_cmd()
        .arg("--config")
        .arg(&config)
        .arg("places")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Not logged in").and(predicate::str::contains("domru login")));
}

#[test]
fn test_login_rejects_bad_phone_locally() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    domru_cmd()
        .arg("--config")
        .arg(&config)
        .args(["login", "--phone", "12345"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("phone"));
}

#[test]
fn test_logout_without_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    domru_cmd()
        .arg("--config")
        .arg(&config)
        .arg("logout")
        .assert()
        .success()
        .stderr(predicate::str::contains("No stored session"));
}

#[test]
fn test_logout_removes_session() {
    let (_dir, config) = write_config("http://127.0.0.1:9", true);

    domru_cmd()
        .arg("--config")
        .arg(&config)
        .arg("logout")
        .assert()
        .success()
        .stderr(predicate::str::contains("Session removed"));

    let doc = read_config(&config);
    assert!(!doc.contains_key("session"));
    assert_eq!(doc["timeout"].as_integer(), Some(5));
}

// ── Against a mock API ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_places_json_output() {
    let server = MockServer::start().await;
    let (_dir, config) = write_config(&server.uri(), true);

    Mock::given(method("GET"))
        .and(path("/rest/v1/subscriberplaces"))
        .and(header("Authorization", "Bearer access-1"))
        .and(header("Operator", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(places_body()))
        .expect(1)
        .mount(&server)
        .await;

    let output = domru_cmd()
        .arg("--config")
        .arg(&config)
        .args(["-o", "json-compact", "places"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["place"]["id"], 5);
    assert_eq!(parsed[0]["subscriberType"], "owner");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_access_open() {
    let server = MockServer::start().await;
    let (_dir, config) = write_config(&server.uri(), true);

    Mock::given(method("GET"))
        .and(path("/rest/v1/subscriberplaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(places_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/places/5/accesscontrols/9/actions"))
        .and(body_json(json!({ "name": "accessControlOpen" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    domru_cmd()
        .arg("--config")
        .arg(&config)
        .args(["access", "open", "9"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Access control 9 opened"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_access_open_unknown_id() {
    let server = MockServer::start().await;
    let (_dir, config) = write_config(&server.uri(), true);

    Mock::given(method("GET"))
        .and(path("/rest/v1/subscriberplaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(places_body()))
        .mount(&server)
        .await;

    domru_cmd()
        .arg("--config")
        .arg(&config)
        .args(["access", "open", "404"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("domru access list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refreshed_tokens_are_saved() {
    let server = MockServer::start().await;
    let (_dir, config) = write_config(&server.uri(), true);

    Mock::given(method("GET"))
        .and(path("/rest/v1/subscribers/profiles/finances"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v2/session/refresh"))
        .and(header("Bearer", "refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-2",
            "refreshToken": "refresh-2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/subscribers/profiles/finances"))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "balance": 120.5,
            "blocked": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    domru_cmd()
        .arg("--config")
        .arg(&config)
        .args(["-o", "plain", "finances"])
        .assert()
        .success()
        .stdout(predicate::str::contains("120.50"));

    let doc = read_config(&config);
    let session = doc["session"].as_table().unwrap();
    assert_eq!(session["access_token"].as_str(), Some("access-2"));
    assert_eq!(session["refresh_token"].as_str(), Some("refresh-2"));
    assert_eq!(session["place_id"].as_integer(), Some(5));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_snapshot_to_file() {
    let server = MockServer::start().await;
    let (dir, config) = write_config(&server.uri(), true);
    let image: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02, 0xFF, 0xD9];

    Mock::given(method("GET"))
        .and(path("/rest/v1/forpost/cameras/501/snapshots"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(image),
        )
        .mount(&server)
        .await;

    let target = dir.path().join("door.jpg");
    domru_cmd()
        .arg("--config")
        .arg(&config)
        .args(["cameras", "snapshot", "501", "--file"])
        .arg(&target)
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved 8 bytes"));

    assert_eq!(std::fs::read(&target).unwrap(), image);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_snapshot_leaves_no_file() {
    let server = MockServer::start().await;
    let (dir, config) = write_config(&server.uri(), true);

    Mock::given(method("GET"))
        .and(path("/rest/v1/forpost/cameras/501/snapshots"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/jpeg"))
        .mount(&server)
        .await;

    let target = dir.path().join("door.jpg");
    domru_cmd()
        .arg("--config")
        .arg(&config)
        .args(["cameras", "snapshot", "501", "--file"])
        .arg(&target)
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty snapshot"));

    assert!(!target.exists());
    assert!(!dir.path().join("door.jpg.part").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_with_code_saves_session() {
    let server = MockServer::start().await;
    let (_dir, config) = write_config(&server.uri(), false);

    Mock::given(method("GET"))
        .and(path("/auth/v2/login/79991234567"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "operatorId": 2, "subscriberId": 42, "accountId": "590001234", "placeId": 7, "address": "Lenina 1" },
            { "operatorId": 2, "subscriberId": 43, "accountId": null, "placeId": 8, "address": "Mira 3" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v2/auth/79991234567/confirmation"))
        .and(body_json(json!({
            "operatorId": 2,
            "subscriberId": 43,
            "accountId": null,
            "login": 79_991_234_567_u64,
            "confirm1": "1234"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "operatorId": 2,
            "operatorName": "Perm",
            "accessToken": "access-1",
            "refreshToken": "refresh-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    domru_cmd()
        .arg("--config")
        .arg(&config)
        .args(["login", "--phone", "+7 (999) 123-45-67", "--account", "1", "--code", "1234"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Logged in to Perm"));

    let doc = read_config(&config);
    let session = doc["session"].as_table().unwrap();
    assert_eq!(session["access_token"].as_str(), Some("access-1"));
    assert_eq!(session["subscriber_id"].as_integer(), Some(43));
    assert_eq!(session["place_id"].as_integer(), Some(8));
    assert!(!session.contains_key("account_id"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_needs_account_choice_when_not_interactive() {
    let server = MockServer::start().await;
    let (_dir, config) = write_config(&server.uri(), false);

    Mock::given(method("GET"))
        .and(path("/auth/v2/login/79991234567"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "operatorId": 2, "subscriberId": 42, "placeId": 7, "address": "Lenina 1" },
            { "operatorId": 2, "subscriberId": 43, "placeId": 8, "address": "Mira 3" }
        ])))
        .mount(&server)
        .await;

    domru_cmd()
        .arg("--config")
        .arg(&config)
        .args(["login", "--phone", "79991234567", "--code", "1234"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--account"));
}
