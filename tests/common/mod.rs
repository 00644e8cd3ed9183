#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";

/// `kantik` with an isolated config directory and no ambient settings.
pub fn kantik_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kantik").expect("kantik binary not found");
    cmd.current_dir(home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("KANTIK_API_URL")
        .env_remove("KANTIK_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

pub fn session_file(home: &TempDir) -> std::path::PathBuf {
    home.path().join("kantik").join("session.json")
}

/// Write a stored session as `kantik login` would.
pub fn store_token(home: &TempDir, token: &str) {
    let file = session_file(home);
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    let body = json!({ "kantik_token": token, "kantik_language": "fr", "email": "ana@example.com" });
    std::fs::write(file, body.to_string()).unwrap();
}

pub fn read_session(home: &TempDir) -> Value {
    let raw = std::fs::read_to_string(session_file(home)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

pub fn account(plan: &str, expires: Option<&str>, grace: Option<&str>) -> Value {
    json!({
        "id": "u1",
        "email": "ana@example.com",
        "displayName": "Ana",
        "plan": plan,
        "planExpiresAt": expires,
        "graceUntil": grace,
        "teamId": null,
        "roleInTeam": null,
        "isAdmin": false,
    })
}

pub fn admin_account() -> Value {
    json!({
        "id": "admin1",
        "email": "root@example.com",
        "displayName": "Root",
        "plan": "FREE",
        "role": "ADMIN",
    })
}

pub fn song(id: &str, number: i64, tier: &str) -> Value {
    json!({
        "id": id,
        "number": number,
        "title": format!("Song {number}"),
        "language": "ht",
        "accessTier": tier,
        "tags": ["louange"],
        "resources": [{ "type": "CHORDS_PDF", "filename": format!("{number}.pdf") }],
    })
}

/// Plan dates far enough ahead that tests never expire.
pub const FAR_FUTURE: &str = "2999-01-01T00:00:00Z";

/// Mount `GET /auth/me` answering with `account` for the test token.
pub async fn mount_me(server: &MockServer, account: Value) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(account))
        .mount(server)
        .await;
}

pub fn file_exists(dir: &Path, name: &str) -> bool {
    dir.join(name).is_file()
}
