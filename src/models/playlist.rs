use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::song::Song;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OwnerType {
    #[default]
    User,
    Team,
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.pad("USER"),
            Self::Team => f.pad("TEAM"),
        }
    }
}

impl FromStr for OwnerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" | "PERSONAL" => Ok(Self::User),
            "TEAM" => Ok(Self::Team),
            other => Err(format!("unknown playlist owner '{other}' (expected user or team)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner_type: OwnerType,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub song_ids: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// `GET /playlists/{id}`: the playlist plus its active songs in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDetail {
    #[serde(flatten)]
    pub playlist: Playlist,
    #[serde(default)]
    pub songs: Vec<Song>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistCreate {
    pub name: String,
    pub owner_type: OwnerType,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_ids: Option<Vec<String>>,
}
