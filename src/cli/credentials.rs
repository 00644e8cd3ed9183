use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cli::error::CliError;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Language: persisted UI preference
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Self::Fr),
            "en" => Ok(Self::En),
            other => Err(format!("unsupported language '{other}' (expected fr or en)")),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// StoredSession: what we persist to disk
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Session file stored at `~/.config/kantik/session.json`.
///
/// `kantik_token` and `kantik_language` are each replaced or cleared as a
/// whole. `email` and `api_url` are only kept for `kantik whoami` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kantik_token: Option<String>,
    #[serde(default)]
    pub kantik_language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl StoredSession {
    pub fn is_logged_in(&self) -> bool {
        self.kantik_token.as_deref().map_or(false, |t| !t.is_empty())
    }
}

impl fmt::Display for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_logged_in() {
            return f.pad("Not logged in");
        }
        let email = self.email.as_deref().unwrap_or("<unknown>");
        write!(f, "Logged in as {email}")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CredentialStore trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Pluggable storage back-end. Production writes to disk; tests use
/// an in-memory implementation.
pub trait CredentialStore: Send + Sync {
    fn save(&self, session: &StoredSession) -> Result<(), CliError>;
    fn load(&self) -> Result<Option<StoredSession>, CliError>;
    fn delete(&self) -> Result<(), CliError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FileCredentialStore: XDG-compliant file storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// `$XDG_CONFIG_HOME/kantik/session.json`, falling back to
    /// `~/.config/kantik/session.json`.
    pub fn default_path() -> PathBuf {
        let base = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .unwrap_or_else(|_| PathBuf::from("."));

        base.join("kantik").join("session.json")
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_default_path() -> Self {
        Self::new(Self::default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, session: &StoredSession) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(session)
            .map_err(|e| CliError::Config(format!("Failed to serialize session: {e}")))?;

        std::fs::write(&self.path, &json)?;

        // Owner read/write only: the file holds a bearer token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn load(&self) -> Result<Option<StoredSession>, CliError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let session: StoredSession = serde_json::from_str(&content).map_err(|e| {
            CliError::Config(format!(
                "Corrupt session file {}: {e}",
                self.path.display()
            ))
        })?;

        Ok(Some(session))
    }

    fn delete(&self) -> Result<(), CliError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CredentialsManager: high-level operations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Token and language persistence on top of a [`CredentialStore`].
pub struct CredentialsManager<S: CredentialStore> {
    store: S,
}

impl<S: CredentialStore> CredentialsManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored session, or the defaults when nothing was saved yet.
    pub fn load(&self) -> Result<StoredSession, CliError> {
        Ok(self.store.load()?.unwrap_or_default())
    }

    /// Replace the token after a successful login or registration.
    pub fn save_token(&self, token: &str, email: &str, api_url: &str) -> Result<(), CliError> {
        let mut session = self.load()?;
        session.kantik_token = Some(token.to_string());
        session.email = Some(email.to_string());
        session.api_url = Some(api_url.to_string());
        self.store.save(&session)
    }

    /// Drop the token and identity. The language preference survives.
    pub fn clear_token(&self) -> Result<(), CliError> {
        let kept = StoredSession {
            kantik_language: self.load()?.kantik_language,
            ..StoredSession::default()
        };
        if kept == StoredSession::default() {
            self.store.delete()
        } else {
            self.store.save(&kept)
        }
    }

    pub fn token(&self) -> Result<Option<String>, CliError> {
        Ok(self.load()?.kantik_token.filter(|t| !t.is_empty()))
    }

    /// Returns `CliError::LoginRequired` when no token is stored.
    pub fn require_token(&self, feature: &str) -> Result<String, CliError> {
        self.token()?.ok_or_else(|| CliError::LoginRequired {
            feature: feature.to_string(),
        })
    }

    pub fn language(&self) -> Result<Language, CliError> {
        Ok(self.load()?.kantik_language)
    }

    pub fn set_language(&self, language: Language) -> Result<(), CliError> {
        let mut session = self.load()?;
        session.kantik_language = language;
        self.store.save(&session)
    }
}

impl CredentialsManager<FileCredentialStore> {
    pub fn with_default_store() -> Self {
        Self::new(FileCredentialStore::with_default_path())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
