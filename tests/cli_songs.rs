//! Integration tests for `kantik songs` and `kantik library`.

mod common;

use common::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `%PDF-1.4` in base64.
const PDF_B64: &str = "JVBERi0xLjQ=";

async fn mount_song(server: &MockServer, id: &str, tier: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/songs/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(song(id, 12, tier)))
        .mount(server)
        .await;
}

async fn mount_download(server: &MockServer, id: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/songs/{id}/download/CHORDS_PDF")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "filename": "12-chords.pdf",
            "contentType": "application/pdf",
            "data": PDF_B64,
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_songs_is_public_and_forwards_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/songs"))
        .and(query_param("search", "gloire"))
        .and(query_param("language", "ht"))
        .and(query_param("sort", "popular"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([song("s1", 12, "STANDARD"), song("s2", 40, "PREMIUM")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .args(["songs", "list", "--search", "gloire", "--language", "ht", "--sort", "popular"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Song 12"))
        .stdout(predicate::str::contains("PREMIUM"));
}

#[test]
fn test_list_songs_rejects_unknown_sort() {
    let home = TempDir::new().unwrap();
    kantik_cmd(&home)
        .args(["songs", "list", "--sort", "random"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown sort"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_writes_file_for_active_plan() {
    let server = MockServer::start().await;
    mount_me(&server, account("STANDARD", Some(FAR_FUTURE), None)).await;
    mount_song(&server, "s1", "STANDARD").await;
    mount_download(&server, "s1", 1).await;

    let home = TempDir::new().unwrap();
    store_token(&home, TOKEN);
    let out = home.path().join("charts");

    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .args(["songs", "download", "s1", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("12-chords.pdf"));

    assert_eq!(std::fs::read(out.join("12-chords.pdf")).unwrap(), b"%PDF-1.4");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_in_grace_period_is_allowed() {
    let server = MockServer::start().await;
    mount_me(
        &server,
        account("STANDARD", Some("2000-01-01T00:00:00Z"), Some(FAR_FUTURE)),
    )
    .await;
    mount_song(&server, "s1", "STANDARD").await;
    mount_download(&server, "s1", 1).await;

    let home = TempDir::new().unwrap();
    store_token(&home, TOKEN);

    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .args(["songs", "download", "s1", "--out", "."])
        .assert()
        .success();
    assert!(file_exists(home.path(), "12-chords.pdf"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_free_plan_download_refused_before_request() {
    let server = MockServer::start().await;
    mount_me(&server, account("FREE", None, None)).await;
    mount_song(&server, "s1", "STANDARD").await;
    mount_download(&server, "s1", 0).await;

    let home = TempDir::new().unwrap();
    store_token(&home, TOKEN);

    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .args(["songs", "download", "s1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Download refused"))
        .stderr(predicate::str::contains("upgrade to a paid plan"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_standard_plan_cannot_download_premium() {
    let server = MockServer::start().await;
    mount_me(&server, account("STANDARD", Some(FAR_FUTURE), None)).await;
    mount_song(&server, "p1", "PREMIUM").await;
    mount_download(&server, "p1", 0).await;

    let home = TempDir::new().unwrap();
    store_token(&home, TOKEN);

    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .args(["songs", "download", "p1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "PREMIUM songs are not included in the STANDARD plan",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_plan_download_refused() {
    let server = MockServer::start().await;
    mount_me(
        &server,
        account("TEAM", Some("2000-01-01T00:00:00Z"), Some("2000-01-04T00:00:00Z")),
    )
    .await;
    mount_song(&server, "s1", "STANDARD").await;
    mount_download(&server, "s1", 0).await;

    let home = TempDir::new().unwrap();
    store_token(&home, TOKEN);

    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .args(["songs", "download", "s1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("your plan has expired"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_song_anonymous_reports_login_needed() {
    let server = MockServer::start().await;
    mount_song(&server, "s1", "STANDARD").await;

    let home = TempDir::new().unwrap();
    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .args(["songs", "show", "s1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#12 Song 12"))
        .stdout(predicate::str::contains("unavailable (log in to download)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_library_requires_paid_plan() {
    let server = MockServer::start().await;
    mount_me(&server, account("FREE", None, None)).await;
    Mock::given(method("GET"))
        .and(path("/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    store_token(&home, TOKEN);

    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .arg("library")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not allowed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_library_lists_for_lapsed_standard_plan() {
    let server = MockServer::start().await;
    mount_me(
        &server,
        account("STANDARD", Some("2024-01-01T00:00:00Z"), Some("2024-01-04T00:00:00Z")),
    )
    .await;
    let mut entry = song("s7", 7, "STANDARD");
    entry["downloadedAt"] = json!("2023-12-20T10:00:00Z");
    Mock::given(method("GET"))
        .and(path("/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([entry])))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    store_token(&home, TOKEN);

    kantik_cmd(&home)
        .env("KANTIK_API_URL", server.uri())
        .arg("library")
        .assert()
        .success()
        .stdout(predicate::str::contains("Song 7"));
}
