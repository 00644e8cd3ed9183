//! Chord and lyric sheet downloads.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::cli::error::CliError;
use crate::cli::kantik_client::KantikClient;
use crate::models::{Account, FilePayload, ResourceType, Song};
use crate::services::access;

/// Fetch `resource_type` of `song` and write it into `dest_dir`.
///
/// The evaluator runs first so obviously forbidden downloads never reach the
/// network; the server still has the final say and a 403 from it surfaces as
/// [`CliError::Forbidden`].
#[tracing::instrument(name = "Download song resource", skip(account, client, song), fields(song = %song.id))]
pub async fn download_resource(
    account: Option<&Account>,
    client: &KantikClient,
    song: &Song,
    resource_type: ResourceType,
    dest_dir: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf, CliError> {
    if let Some(reason) = access::download_denial(account, now, song.access_tier) {
        tracing::info!(%reason, "download blocked before request");
        return Err(CliError::AccessDenied { reason });
    }

    let payload = client.download(&song.id, resource_type).await?;
    let fallback = format!(
        "{}-{}.{}",
        song.number,
        resource_type.as_str().to_ascii_lowercase(),
        resource_type.default_extension()
    );
    write_payload(&payload, dest_dir, &fallback)
}

/// Decode a base64 file body.
pub fn decode_payload(payload: &FilePayload) -> Result<Vec<u8>, CliError> {
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.data.trim())?)
}

/// Decode `payload` and write it under `dest_dir`, returning the path written.
pub fn write_payload(
    payload: &FilePayload,
    dest_dir: &Path,
    fallback_name: &str,
) -> Result<PathBuf, CliError> {
    let bytes = decode_payload(payload)?;
    let name = sanitize_filename(&payload.filename).unwrap_or_else(|| fallback_name.to_string());

    std::fs::create_dir_all(dest_dir)?;
    let path = dest_dir.join(name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Last path component of a server-provided name, or `None` when nothing
/// usable is left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Some(last.chars().filter(|c| !c.is_control()).collect())
}
