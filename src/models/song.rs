use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content classification. Variant order is the tier order:
/// `Standard < Premium`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessTier {
    #[default]
    Standard,
    Premium,
}

impl AccessTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Premium => "PREMIUM",
        }
    }
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AccessTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(Self::Standard),
            "PREMIUM" => Ok(Self::Premium),
            other => Err(format!("unknown access tier '{other}' (expected STANDARD or PREMIUM)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SongLanguage {
    #[default]
    Fr,
    Ht,
}

impl SongLanguage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::Ht => "ht",
        }
    }
}

impl fmt::Display for SongLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SongLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" | "french" => Ok(Self::Fr),
            "ht" | "creole" => Ok(Self::Ht),
            other => Err(format!("unknown song language '{other}' (expected fr or ht)")),
        }
    }
}

/// Typed attachment kinds stored with a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    ChordsPdf,
    LyricsPdf,
    PreviewImage,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChordsPdf => "CHORDS_PDF",
            Self::LyricsPdf => "LYRICS_PDF",
            Self::PreviewImage => "PREVIEW_IMAGE",
        }
    }

    pub fn default_extension(self) -> &'static str {
        match self {
            Self::ChordsPdf | Self::LyricsPdf => "pdf",
            Self::PreviewImage => "jpg",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "CHORDS_PDF" | "CHORDS" => Ok(Self::ChordsPdf),
            "LYRICS_PDF" | "LYRICS" => Ok(Self::LyricsPdf),
            "PREVIEW_IMAGE" | "PREVIEW" => Ok(Self::PreviewImage),
            other => Err(format!("unknown resource type '{other}'")),
        }
    }
}

/// Attachment metadata. Payload bytes are only fetched through the
/// download endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub auto_generated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub number: i64,
    pub title: String,
    #[serde(default)]
    pub language: SongLanguage,
    #[serde(default)]
    pub key_original: Option<String>,
    #[serde(default)]
    pub tempo: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub access_tier: AccessTier,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub downloads_count: u64,
    #[serde(default)]
    pub favorites_count: u64,
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Present on library entries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded_at: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Song {
    pub fn resource(&self, kind: ResourceType) -> Option<&Resource> {
        self.resources.iter().find(|r| r.resource_type == kind)
    }

    pub fn has_resource(&self, kind: ResourceType) -> bool {
        self.resource(kind).is_some()
    }
}

/// Catalog ordering accepted by `GET /songs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SongSort {
    #[default]
    Number,
    Popular,
    Newest,
}

impl SongSort {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Popular => "popular",
            Self::Newest => "newest",
        }
    }
}

impl FromStr for SongSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "number" => Ok(Self::Number),
            "popular" => Ok(Self::Popular),
            "newest" => Ok(Self::Newest),
            other => Err(format!("unknown sort '{other}' (expected number, popular or newest)")),
        }
    }
}

/// Catalog filter for `GET /songs`.
#[derive(Debug, Clone, Default)]
pub struct SongQuery {
    pub search: Option<String>,
    pub language: Option<SongLanguage>,
    pub access_tier: Option<AccessTier>,
    pub tags: Vec<String>,
    pub sort: SongSort,
}

impl SongQuery {
    /// Query-string pairs; empty filters are omitted.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(language) = self.language {
            pairs.push(("language", language.to_string()));
        }
        if let Some(tier) = self.access_tier {
            pairs.push(("accessTier", tier.to_string()));
        }
        let tags: Vec<&str> = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            pairs.push(("tags", tags.join(",")));
        }
        pairs.push(("sort", self.sort.as_str().to_string()));
        pairs
    }
}

/// Base64 file body returned by the download and receipt endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewStatus {
    pub has_preview: bool,
    #[serde(default)]
    pub auto_generated: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of `POST /songs` (admin).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongInput {
    pub number: i64,
    pub title: String,
    pub language: SongLanguage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_original: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<u32>,
    pub tags: Vec<String>,
    pub access_tier: AccessTier,
}

/// Body of `PUT /songs/{id}` (admin). Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<SongLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_original: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_tier: Option<AccessTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl SongPatch {
    pub fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.title.is_none()
            && self.language.is_none()
            && self.key_original.is_none()
            && self.tempo.is_none()
            && self.tags.is_none()
            && self.access_tier.is_none()
            && self.active.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUploadResponse {
    pub message: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub preview_generated: bool,
}
