use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::account::{Account, Plan};
use super::payment::Payment;
use super::team::{Team, TeamMember};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    pub total_users: u64,
    pub active_standard: u64,
    pub active_team: u64,
    pub standard_users: u64,
    pub team_users: u64,
    pub total_songs: u64,
    pub inactive_songs: u64,
    pub total_downloads: u64,
    pub pending_payments: u64,
    pub total_teams: u64,
}

/// `GET /admin/users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDetail {
    #[serde(flatten)]
    pub account: Account,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}' (expected user or admin)")),
        }
    }
}

/// Body of `PUT /admin/users/{id}`. The backend derives `graceUntil`
/// (expiry + 3 days) when only `planExpiresAt` is sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAdminUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_until: Option<String>,
}

impl UserAdminUpdate {
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.plan.is_none()
            && self.plan_expires_at.is_none()
            && self.grace_until.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
