//! Integration tests for `kantik login`, `whoami`, `logout` and `language`.

mod common;

use common::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    kantik_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("songs"))
        .stdout(predicate::str::contains("playlists"))
        .stdout(predicate::str::contains("--api-url"));
}

#[test]
fn test_whoami_without_session_asks_for_login() {
    let home = TempDir::new().unwrap();
    kantik_cmd(&home)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Login required for whoami"))
        .stderr(predicate::str::contains("kantik login"));
}

#[test]
fn test_language_defaults_to_french() {
    let home = TempDir::new().unwrap();
    kantik_cmd(&home)
        .arg("language")
        .assert()
        .success()
        .stdout(predicate::str::diff("fr\n"));
}

#[test]
fn test_language_is_persisted() {
    let home = TempDir::new().unwrap();
    kantik_cmd(&home).args(["language", "en"]).assert().success();

    assert_eq!(read_session(&home)["kantik_language"], "en");
    kantik_cmd(&home)
        .arg("language")
        .assert()
        .success()
        .stdout(predicate::str::diff("en\n"));
}

#[test]
fn test_language_rejects_unknown_value() {
    let home = TempDir::new().unwrap();
    kantik_cmd(&home)
        .args(["language", "de"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported language"));
}

#[test]
fn test_logout_keeps_language() {
    let home = TempDir::new().unwrap();
    store_token(&home, TOKEN);
    kantik_cmd(&home).args(["language", "en"]).assert().success();

    kantik_cmd(&home).arg("logout").assert().success();

    let stored = read_session(&home);
    assert!(stored.get("kantik_token").is_none());
    assert_eq!(stored["kantik_language"], "en");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_stores_token_then_whoami() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "ana@example.com", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": TOKEN,
            "user": account("STANDARD", Some(FAR_FUTURE), None),
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_me(&server, account("STANDARD", Some(FAR_FUTURE), None)).await;

    let home = TempDir::new().unwrap();
    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .args(["login", "--email", "ana@example.com", "--password-stdin"])
        .write_stdin("s3cret\n")
        .assert()
        .success();

    assert_eq!(read_session(&home)["kantik_token"], TOKEN);

    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana <ana@example.com> [STANDARD]"))
        .stdout(predicate::str::contains("active until 2999-01-01"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_with_wrong_password_keeps_no_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    kantik_cmd(&home)
        .args(["--api-url", &server.uri()])
        .args(["login", "--email", "ana@example.com", "--password-stdin"])
        .write_stdin("wrong\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));

    assert!(!session_file(&home).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_token_is_cleared() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    store_token(&home, TOKEN);

    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session expired"));

    let cleared = !session_file(&home).exists()
        || read_session(&home).get("kantik_token").is_none();
    assert!(cleared, "token should be removed after a 401");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_json_reports_normalized_admin_flag() {
    let server = MockServer::start().await;
    mount_me(&server, admin_account()).await;

    let home = TempDir::new().unwrap();
    store_token(&home, TOKEN);

    let output = kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .args(["whoami", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["isAdmin"], true);
    assert_eq!(value["plan"], "FREE");
}
