use std::future::Future;
use std::time::Duration;

use crate::cli::credentials::{CredentialsManager, FileCredentialStore};
use crate::cli::error::CliError;
use crate::cli::kantik_client::KantikClient;
use crate::configuration::Settings;
use crate::services::session::Session;

/// Settings shared by every command, resolved once in `main`.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub settings: Settings,
}

impl CommandContext {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Unauthenticated client for the configured API.
    pub fn client(&self) -> Result<KantikClient, CliError> {
        KantikClient::new(
            &self.settings.api_url,
            Duration::from_secs(self.settings.timeout_secs),
        )
    }

    pub fn credentials(&self) -> CredentialsManager<FileCredentialStore> {
        CredentialsManager::with_default_store()
    }

    /// Session backed by the on-disk token store. Call `start` or `login`
    /// before using it.
    pub fn session(&self) -> Result<Session<FileCredentialStore>, CliError> {
        Ok(Session::new(self.credentials(), self.client()?))
    }

    /// Drive `fut` on a current-thread runtime.
    pub fn block_on<F>(&self, fut: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = Result<(), CliError>>,
    {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Config(format!("Failed to create async runtime: {}", e)))?;

        rt.block_on(fut)?;
        Ok(())
    }
}

/// Fixed-width cell for table output.
pub(crate) fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let kept: String = value.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Date part of a backend timestamp, `-` when absent.
pub(crate) fn short_date(value: Option<&str>) -> String {
    value
        .and_then(|v| v.get(..10))
        .unwrap_or("-")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Sunday", 10), "Sunday");
        assert_eq!(truncate("Grace abounding", 6), "Grace…");
    }

    #[test]
    fn test_short_date() {
        assert_eq!(short_date(Some("2024-01-15T10:00:00+00:00")), "2024-01-15");
        assert_eq!(short_date(None), "-");
        assert_eq!(short_date(Some("2024")), "-");
    }
}
