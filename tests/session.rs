//! `Session` and `PlaylistEditor` wired to a real client and a temp store.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use kantik::cli::credentials::{CredentialsManager, FileCredentialStore};
use kantik::cli::error::CliError;
use kantik::cli::kantik_client::KantikClient;
use kantik::models::AccessTier;
use kantik::services::playlist_order::{PlaylistEditor, ReorderPolicy};
use kantik::services::session::Session;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session(server: &MockServer, dir: &TempDir) -> Session<FileCredentialStore> {
    let store = FileCredentialStore::new(dir.path().join("session.json"));
    let client = KantikClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    Session::new(CredentialsManager::new(store), client)
}

fn user(plan: &str, expires: &str, grace: &str) -> serde_json::Value {
    json!({
        "id": "u1",
        "email": "ana@example.com",
        "displayName": "Ana",
        "plan": plan,
        "planExpiresAt": expires,
        "graceUntil": grace,
    })
}

#[tokio::test]
async fn test_login_then_start_reuses_stored_token() {
    let server = MockServer::start().await;
    let account = user("STANDARD", "2024-01-31T00:00:00Z", "2024-02-03T00:00:00Z");
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "tok", "user": account })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account.clone()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut first = session(&server, &dir);
    first.login("ana@example.com", "pw").await.unwrap();
    assert!(first.state().is_authenticated());

    let mut second = session(&server, &dir);
    assert!(!second.state().is_authenticated());
    second.start("test").await.unwrap();

    let state = second.state();
    let jan_10 = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
    let feb_02 = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();
    let feb_10 = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
    assert!(state.is_plan_active(jan_10));
    assert!(state.can_download(jan_10, AccessTier::Standard));
    assert!(!state.can_download(jan_10, AccessTier::Premium));
    assert!(state.can_download(feb_02, AccessTier::Standard));
    assert!(!state.is_plan_active(feb_10));
}

#[tokio::test]
async fn test_start_without_token_needs_login() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let err = session(&server, &dir).start("downloads").await.unwrap_err();
    assert!(matches!(err, CliError::LoginRequired { ref feature } if feature == "downloads"));
}

#[tokio::test]
async fn test_server_error_keeps_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::new(dir.path().join("session.json"));
    CredentialsManager::new(store)
        .save_token("tok", "ana@example.com", &server.uri())
        .unwrap();

    let mut s = session(&server, &dir);
    let err = s.start("test").await.unwrap_err();
    assert!(matches!(err, CliError::Api { status: 503, .. }));
    assert_eq!(s.credentials().token().unwrap().as_deref(), Some("tok"));
}

#[tokio::test]
async fn test_reconcile_reloads_server_order_after_failed_save() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlists/pl1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pl1",
            "name": "Dimanche",
            "songIds": ["a", "b", "c"],
            "songs": [],
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/playlists/pl1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = KantikClient::new(&server.uri(), Duration::from_secs(5))
        .unwrap()
        .authenticated("tok");

    let mut editor = PlaylistEditor::open(&client, "pl1", ReorderPolicy::Reconcile)
        .await
        .unwrap();
    assert!(editor.reorder("c", "a").await.is_err());
    assert_eq!(editor.song_ids(), ["a", "b", "c"]);

    let mut editor = PlaylistEditor::open(&client, "pl1", ReorderPolicy::BestEffort)
        .await
        .unwrap();
    assert!(editor.reorder("c", "a").await.is_err());
    assert_eq!(editor.song_ids(), ["c", "a", "b"]);
}
