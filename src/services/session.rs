//! Authenticated-user state and its lifecycle.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::cli::credentials::{CredentialStore, CredentialsManager};
use crate::cli::error::CliError;
use crate::cli::kantik_client::KantikClient;
use crate::models::{AccessTier, Account};
use crate::services::access;

/// Holder of the current account snapshot.
///
/// The snapshot is only ever swapped as a whole; readers take an `Arc` and
/// evaluate against it, so an evaluation never sees a half-updated account.
#[derive(Debug, Default)]
pub struct AppState {
    account: RwLock<Option<Arc<Account>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, account: Account) {
        let mut guard = self.account.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(account));
    }

    pub fn clear(&self) {
        let mut guard = self.account.write().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    pub fn snapshot(&self) -> Option<Arc<Account>> {
        self.account
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.snapshot().map_or(false, |a| a.is_admin)
    }

    pub fn is_plan_active(&self, now: DateTime<Utc>) -> bool {
        access::is_plan_active(self.snapshot().as_deref(), now)
    }

    pub fn can_download(&self, now: DateTime<Utc>, tier: AccessTier) -> bool {
        access::can_download(self.snapshot().as_deref(), now, tier)
    }
}

/// Ties the account state to the token store and the API client.
pub struct Session<S: CredentialStore> {
    state: AppState,
    credentials: CredentialsManager<S>,
    client: KantikClient,
}

impl<S: CredentialStore> Session<S> {
    /// `client` must not carry a token yet; the session attaches the stored
    /// one on [`Session::start`] and fresh ones on login.
    pub fn new(credentials: CredentialsManager<S>, client: KantikClient) -> Self {
        Self {
            state: AppState::new(),
            credentials,
            client,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn client(&self) -> &KantikClient {
        &self.client
    }

    pub fn credentials(&self) -> &CredentialsManager<S> {
        &self.credentials
    }

    /// Restore the stored session and fetch the account.
    ///
    /// A token the server rejects is cleared locally; network failures keep
    /// it so the user can retry later.
    #[tracing::instrument(name = "Start session", skip(self))]
    pub async fn start(&mut self, feature: &str) -> Result<Arc<Account>, CliError> {
        let token = self.credentials.require_token(feature)?;
        self.client = self.client.clone().authenticated(&token);
        self.refresh().await
    }

    /// Re-fetch `GET /auth/me` and replace the snapshot.
    #[tracing::instrument(name = "Refresh account", skip(self))]
    pub async fn refresh(&self) -> Result<Arc<Account>, CliError> {
        match self.client.me().await {
            Ok(account) => {
                self.state.replace(account);
                self.state
                    .snapshot()
                    .ok_or_else(|| CliError::InvalidResponse("account snapshot missing".into()))
            }
            Err(err) if err.is_session_expired() => {
                tracing::info!("stored token rejected, clearing session");
                self.state.clear();
                self.credentials.clear_token()?;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    #[tracing::instrument(name = "Session login", skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Arc<Account>, CliError> {
        let auth = self.client.login(email, password).await?;
        self.adopt(auth.token, auth.user)
    }

    #[tracing::instrument(name = "Session register", skip(self, password))]
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Arc<Account>, CliError> {
        let auth = self.client.register(email, password, display_name).await?;
        self.adopt(auth.token, auth.user)
    }

    fn adopt(&mut self, token: String, account: Account) -> Result<Arc<Account>, CliError> {
        self.credentials
            .save_token(&token, &account.email, self.client.base_url())?;
        self.client = self.client.clone().authenticated(&token);
        self.state.replace(account);
        self.state
            .snapshot()
            .ok_or_else(|| CliError::InvalidResponse("account snapshot missing".into()))
    }

    /// Remove the token and forget the account. No server call is made.
    pub fn logout(&self) -> Result<(), CliError> {
        self.state.clear();
        self.credentials.clear_token()
    }
}
