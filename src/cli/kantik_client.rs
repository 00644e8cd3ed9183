//! Kantik REST API client.
//!
//! Thin async wrapper over `reqwest`: one request per call, no retries.
//! Authenticated endpoints send `Authorization: Bearer <token>`; the token
//! comes from `kantik login`. Non-2xx replies are mapped through
//! [`CliError::from_status`] using the backend's `{"detail": ...}` body.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cli::error::CliError;
use crate::models::{
    Account, AdminStats, AdminUserDetail, AuthResponse, FilePayload, InviteResponse,
    LoginRequest, MessageResponse, Payment, PaymentDetail, PaymentRequest, PaymentReview,
    PaymentStatus, Playlist, PlaylistCreate, PlaylistDetail, PlaylistUpdate, PreviewStatus,
    RegisterRequest, ResourceType, ResourceUploadResponse, Song, SongInput, SongPatch, SongQuery,
    Team, TeamCreate, TeamInvite, UserAdminUpdate,
};

/// Longest body excerpt kept in an error message.
const ERROR_BODY_PREVIEW: usize = 240;

/// Raw bytes plus the reply's `Content-Type`.
#[derive(Debug, Clone)]
pub struct BinaryPayload {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Local file attached to a multipart upload.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read `path` and guess its content type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let content_type = guess_content_type(&filename).to_string();
        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    fn into_part(self) -> Result<Part, CliError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.filename)
            .mime_str(&self.content_type)?)
    }
}

fn guess_content_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// KantikClient: HTTP client for the Kantik API
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone)]
pub struct KantikClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl std::fmt::Debug for KantikClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KantikClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl KantikClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CliError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kantik-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CliError::Config(format!("HTTP client error: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            http,
        })
    }

    /// Same client, sending `token` as a bearer credential.
    pub fn authenticated(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    // ── Plumbing ─────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, CliError> {
        let resp = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request failed before a response");
            CliError::Network(e.to_string())
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        tracing::warn!(status = status.as_u16(), %detail, "request rejected");
        Err(CliError::from_status(status.as_u16(), detail))
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, CliError> {
        let resp = self.execute(builder).await?;
        let body = resp.bytes().await.map_err(|e| CliError::Network(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(error = %e, "unexpected response shape");
            CliError::InvalidResponse(e.to_string())
        })
    }

    async fn fetch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, CliError> {
        self.fetch(self.request(method, path).json(body)).await
    }

    /// Success with the body discarded.
    async fn send_discard(&self, builder: RequestBuilder) -> Result<(), CliError> {
        self.execute(builder).await.map(|_| ())
    }

    // ── Auth ─────────────────────────────────────────

    #[tracing::instrument(name = "Login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, CliError> {
        let body = LoginRequest { email, password };
        self.fetch_json(Method::POST, "/auth/login", &body)
            .await
            .map_err(auth_failure)
    }

    #[tracing::instrument(name = "Register", skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthResponse, CliError> {
        let body = RegisterRequest {
            email,
            password,
            display_name,
        };
        self.fetch_json(Method::POST, "/auth/register", &body)
            .await
            .map_err(auth_failure)
    }

    #[tracing::instrument(name = "Fetch current account", skip(self))]
    pub async fn me(&self) -> Result<Account, CliError> {
        self.fetch(self.request(Method::GET, "/auth/me")).await
    }

    // ── Songs ────────────────────────────────────────

    #[tracing::instrument(name = "List songs", skip(self))]
    pub async fn list_songs(&self, query: &SongQuery) -> Result<Vec<Song>, CliError> {
        let builder = self.request(Method::GET, "/songs").query(&query.to_pairs());
        self.fetch(builder).await
    }

    #[tracing::instrument(name = "List featured songs", skip(self))]
    pub async fn featured_songs(&self) -> Result<Vec<Song>, CliError> {
        self.fetch(self.request(Method::GET, "/songs/featured")).await
    }

    #[tracing::instrument(name = "Get song", skip(self))]
    pub async fn get_song(&self, id: &str) -> Result<Song, CliError> {
        self.fetch(self.request(Method::GET, &format!("/songs/{}", seg(id))))
            .await
    }

    #[tracing::instrument(name = "Download resource", skip(self))]
    pub async fn download(
        &self,
        song_id: &str,
        resource_type: ResourceType,
    ) -> Result<FilePayload, CliError> {
        let path = format!("/songs/{}/download/{}", seg(song_id), resource_type);
        self.fetch(self.request(Method::GET, &path)).await
    }

    #[tracing::instrument(name = "Preview status", skip(self))]
    pub async fn preview_status(&self, song_id: &str) -> Result<PreviewStatus, CliError> {
        let path = format!("/songs/{}/preview/status", seg(song_id));
        self.fetch(self.request(Method::GET, &path)).await
    }

    #[tracing::instrument(name = "Fetch preview", skip(self))]
    pub async fn preview(&self, song_id: &str) -> Result<BinaryPayload, CliError> {
        let path = format!("/songs/{}/preview", seg(song_id));
        let resp = self.execute(self.request(Method::GET, &path)).await?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.bytes().await?.to_vec();
        Ok(BinaryPayload {
            content_type,
            bytes,
        })
    }

    #[tracing::instrument(name = "Fetch library", skip(self))]
    pub async fn library(&self) -> Result<Vec<Song>, CliError> {
        self.fetch(self.request(Method::GET, "/library")).await
    }

    // ── Playlists ────────────────────────────────────

    #[tracing::instrument(name = "List playlists", skip(self))]
    pub async fn list_playlists(&self) -> Result<Vec<Playlist>, CliError> {
        self.fetch(self.request(Method::GET, "/playlists")).await
    }

    #[tracing::instrument(name = "Get playlist", skip(self))]
    pub async fn get_playlist(&self, id: &str) -> Result<PlaylistDetail, CliError> {
        self.fetch(self.request(Method::GET, &format!("/playlists/{}", seg(id))))
            .await
    }

    #[tracing::instrument(name = "Create playlist", skip(self))]
    pub async fn create_playlist(&self, body: &PlaylistCreate) -> Result<Playlist, CliError> {
        self.fetch_json(Method::POST, "/playlists", body).await
    }

    #[tracing::instrument(name = "Update playlist", skip(self))]
    pub async fn update_playlist(&self, id: &str, body: &PlaylistUpdate) -> Result<(), CliError> {
        let builder = self
            .request(Method::PUT, &format!("/playlists/{}", seg(id)))
            .json(body);
        self.send_discard(builder).await
    }

    #[tracing::instrument(name = "Delete playlist", skip(self))]
    pub async fn delete_playlist(&self, id: &str) -> Result<(), CliError> {
        let builder = self.request(Method::DELETE, &format!("/playlists/{}", seg(id)));
        self.send_discard(builder).await
    }

    #[tracing::instrument(name = "Add song to playlist", skip(self))]
    pub async fn add_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<(), CliError> {
        let path = format!("/playlists/{}/songs/{}", seg(playlist_id), seg(song_id));
        self.send_discard(self.request(Method::POST, &path)).await
    }

    #[tracing::instrument(name = "Remove song from playlist", skip(self))]
    pub async fn remove_playlist_song(
        &self,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<(), CliError> {
        let path = format!("/playlists/{}/songs/{}", seg(playlist_id), seg(song_id));
        self.send_discard(self.request(Method::DELETE, &path)).await
    }

    // ── Teams ────────────────────────────────────────

    /// `None` when the account belongs to no team.
    #[tracing::instrument(name = "Get my team", skip(self))]
    pub async fn my_team(&self) -> Result<Option<Team>, CliError> {
        self.fetch(self.request(Method::GET, "/teams/my-team")).await
    }

    #[tracing::instrument(name = "Create team", skip(self))]
    pub async fn create_team(&self, body: &TeamCreate) -> Result<Team, CliError> {
        self.fetch_json(Method::POST, "/teams", body).await
    }

    #[tracing::instrument(name = "Invite team member", skip(self))]
    pub async fn invite_member(
        &self,
        team_id: &str,
        body: &TeamInvite,
    ) -> Result<InviteResponse, CliError> {
        let path = format!("/teams/{}/invite", seg(team_id));
        self.fetch_json(Method::POST, &path, body).await
    }

    #[tracing::instrument(name = "Accept team invite", skip(self))]
    pub async fn accept_invite(&self, invite_id: &str) -> Result<MessageResponse, CliError> {
        let path = format!("/teams/accept-invite/{}", seg(invite_id));
        self.fetch(self.request(Method::POST, &path)).await
    }

    #[tracing::instrument(name = "Remove team member", skip(self))]
    pub async fn remove_member(&self, team_id: &str, uid: &str) -> Result<(), CliError> {
        let path = format!("/teams/{}/members/{}", seg(team_id), seg(uid));
        self.send_discard(self.request(Method::DELETE, &path)).await
    }

    // ── Payments ─────────────────────────────────────

    #[tracing::instrument(name = "List payments", skip(self))]
    pub async fn list_payments(&self) -> Result<Vec<Payment>, CliError> {
        self.fetch(self.request(Method::GET, "/payments")).await
    }

    #[tracing::instrument(name = "Submit payment", skip(self))]
    pub async fn submit_payment(&self, body: &PaymentRequest) -> Result<Payment, CliError> {
        self.fetch_json(Method::POST, "/payments", body).await
    }

    #[tracing::instrument(name = "Upload receipt", skip(self, file), fields(filename = %file.filename))]
    pub async fn upload_receipt(&self, payment_id: &str, file: Upload) -> Result<(), CliError> {
        let form = Form::new().part("file", file.into_part()?);
        let path = format!("/payments/{}/receipt", seg(payment_id));
        self.send_discard(self.request(Method::POST, &path).multipart(form))
            .await
    }

    // ── Admin ────────────────────────────────────────

    #[tracing::instrument(name = "Admin stats", skip(self))]
    pub async fn admin_stats(&self) -> Result<AdminStats, CliError> {
        self.fetch(self.request(Method::GET, "/admin/stats")).await
    }

    #[tracing::instrument(name = "Admin list payments", skip(self))]
    pub async fn admin_payments(
        &self,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<Payment>, CliError> {
        let mut builder = self.request(Method::GET, "/admin/payments");
        if let Some(status) = status {
            builder = builder.query(&[("status", status.as_str())]);
        }
        self.fetch(builder).await
    }

    #[tracing::instrument(name = "Admin get payment", skip(self))]
    pub async fn admin_payment(&self, id: &str) -> Result<PaymentDetail, CliError> {
        self.fetch(self.request(Method::GET, &format!("/admin/payments/{}", seg(id))))
            .await
    }

    #[tracing::instrument(name = "Admin get receipt", skip(self))]
    pub async fn admin_receipt(&self, id: &str) -> Result<FilePayload, CliError> {
        let path = format!("/admin/payments/{}/receipt", seg(id));
        self.fetch(self.request(Method::GET, &path)).await
    }

    #[tracing::instrument(name = "Admin review payment", skip(self))]
    pub async fn review_payment(
        &self,
        id: &str,
        review: &PaymentReview,
    ) -> Result<MessageResponse, CliError> {
        let path = format!("/admin/payments/{}/review", seg(id));
        self.fetch_json(Method::POST, &path, review).await
    }

    #[tracing::instrument(name = "Admin list users", skip(self))]
    pub async fn admin_users(&self) -> Result<Vec<Account>, CliError> {
        self.fetch(self.request(Method::GET, "/admin/users")).await
    }

    #[tracing::instrument(name = "Admin get user", skip(self))]
    pub async fn admin_user(&self, id: &str) -> Result<AdminUserDetail, CliError> {
        self.fetch(self.request(Method::GET, &format!("/admin/users/{}", seg(id))))
            .await
    }

    #[tracing::instrument(name = "Admin update user", skip(self))]
    pub async fn update_user(&self, id: &str, body: &UserAdminUpdate) -> Result<(), CliError> {
        let builder = self
            .request(Method::PUT, &format!("/admin/users/{}", seg(id)))
            .json(body);
        self.send_discard(builder).await
    }

    #[tracing::instrument(name = "Admin user action", skip(self))]
    pub async fn user_action(&self, id: &str, action: UserAction) -> Result<(), CliError> {
        let path = format!("/admin/users/{}/{}", seg(id), action.as_path());
        self.send_discard(self.request(Method::POST, &path)).await
    }

    #[tracing::instrument(name = "Admin list songs", skip(self))]
    pub async fn admin_songs(&self) -> Result<Vec<Song>, CliError> {
        self.fetch(self.request(Method::GET, "/admin/songs")).await
    }

    #[tracing::instrument(name = "Create song", skip(self))]
    pub async fn create_song(&self, body: &SongInput) -> Result<Song, CliError> {
        self.fetch_json(Method::POST, "/songs", body).await
    }

    #[tracing::instrument(name = "Update song", skip(self))]
    pub async fn update_song(&self, id: &str, body: &SongPatch) -> Result<(), CliError> {
        let builder = self
            .request(Method::PUT, &format!("/songs/{}", seg(id)))
            .json(body);
        self.send_discard(builder).await
    }

    #[tracing::instrument(name = "Delete song", skip(self))]
    pub async fn delete_song(&self, id: &str) -> Result<(), CliError> {
        self.send_discard(self.request(Method::DELETE, &format!("/songs/{}", seg(id))))
            .await
    }

    #[tracing::instrument(name = "Upload song resource", skip(self, file), fields(filename = %file.filename))]
    pub async fn upload_resource(
        &self,
        song_id: &str,
        resource_type: ResourceType,
        file: Upload,
    ) -> Result<ResourceUploadResponse, CliError> {
        let form = Form::new()
            .text("resourceType", resource_type.as_str())
            .part("file", file.into_part()?);
        let path = format!("/songs/{}/resources", seg(song_id));
        self.fetch(self.request(Method::POST, &path).multipart(form))
            .await
    }
}

/// Admin-only account actions with their own endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    PromoteAdmin,
    DemoteAdmin,
    ResetPlan,
}

impl UserAction {
    fn as_path(self) -> &'static str {
        match self {
            Self::PromoteAdmin => "promote-admin",
            Self::DemoteAdmin => "demote-admin",
            Self::ResetPlan => "reset-plan",
        }
    }
}

fn seg(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

/// A 401 on the auth endpoints means wrong credentials, not an expired session.
fn auth_failure(err: CliError) -> CliError {
    match err {
        CliError::SessionExpired => CliError::AuthFailed("invalid email or password".to_string()),
        CliError::Api { status: 400, message } => CliError::AuthFailed(message),
        other => other,
    }
}

/// Human message from an error body.
///
/// Handles `{"detail": "..."}` and the validation form
/// `{"detail": [{"msg": "..."}]}`; anything else is shown truncated.
pub(crate) fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            Some(serde_json::Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }
    body.trim().chars().take(ERROR_BODY_PREVIEW).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail":"Team is full (max 7 members)"}"#),
            "Team is full (max 7 members)"
        );
    }

    #[test]
    fn test_extract_detail_validation_list() {
        let body = r#"{"detail":[{"loc":["body","email"],"msg":"field required"},{"msg":"bad amount"}]}"#;
        assert_eq!(extract_detail(body), "field required; bad amount");
    }

    #[test]
    fn test_extract_detail_falls_back_to_truncated_body() {
        let body = "x".repeat(1000);
        assert_eq!(extract_detail(&body).len(), ERROR_BODY_PREVIEW);
        assert_eq!(extract_detail("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("chords.PDF"), "application/pdf");
        assert_eq!(guess_content_type("receipt.jpeg"), "image/jpeg");
        assert_eq!(guess_content_type("noext"), "application/octet-stream");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        assert_eq!(seg("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_auth_failure_mapping() {
        assert!(matches!(
            auth_failure(CliError::SessionExpired),
            CliError::AuthFailed(_)
        ));
        assert!(matches!(
            auth_failure(CliError::Network("down".into())),
            CliError::Network(_)
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = KantikClient::new("http://localhost:8001/api/", Duration::from_secs(5))
            .unwrap()
            .authenticated("secret-token");
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-token"));
        assert_eq!(client.base_url(), "http://localhost:8001/api");
    }
}
