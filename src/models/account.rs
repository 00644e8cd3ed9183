use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::song::AccessTier;
use super::timestamp;

/// Subscription level of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Plan {
    #[default]
    Free,
    Standard,
    Team,
}

impl Plan {
    /// Highest content tier this plan may download, if any.
    pub fn max_tier(self) -> Option<AccessTier> {
        match self {
            Self::Free => None,
            Self::Standard => Some(AccessTier::Standard),
            Self::Team => Some(AccessTier::Premium),
        }
    }

    /// True when content of `tier` is within this plan's allowance.
    pub fn covers(self, tier: AccessTier) -> bool {
        self.max_tier().map_or(false, |max| tier <= max)
    }

    pub fn is_paid(self) -> bool {
        self != Self::Free
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Standard => "STANDARD",
            Self::Team => "TEAM",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FREE" => Ok(Self::Free),
            "STANDARD" => Ok(Self::Standard),
            "TEAM" => Ok(Self::Team),
            other => Err(format!("unknown plan '{other}' (expected FREE, STANDARD or TEAM)")),
        }
    }
}

/// Role of a member inside a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TeamRole {
    Owner,
    Admin,
    Member,
}

impl TeamRole {
    /// Owners and team admins may invite and remove members.
    pub fn can_manage_members(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => f.pad("OWNER"),
            Self::Admin => f.pad("ADMIN"),
            Self::Member => f.pad("MEMBER"),
        }
    }
}

impl FromStr for TeamRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "MEMBER" => Ok(Self::Member),
            other => Err(format!("unknown team role '{other}'")),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Account: the authenticated user snapshot
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Account snapshot as returned by `GET /auth/me` and the admin user views.
///
/// The backend carries two admin representations (`isAdmin: bool` and
/// `role: "ADMIN"`); both are folded into [`Account::is_admin`] while
/// deserializing, so no call site ever repeats the disjunction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAccount", rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub plan: Plan,
    #[serde(with = "timestamp::lenient")]
    pub plan_expires_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp::lenient")]
    pub grace_until: Option<DateTime<Utc>>,
    pub team_id: Option<String>,
    pub role_in_team: Option<TeamRole>,
    pub is_admin: bool,
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_member_count: Option<u32>,
}

impl Account {
    pub fn in_team(&self) -> bool {
        self.team_id.is_some()
    }
}

/// Wire shape of an account before normalization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAccount {
    #[serde(default)]
    id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    plan: Option<Plan>,
    #[serde(default, with = "timestamp::lenient")]
    plan_expires_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::lenient")]
    grace_until: Option<DateTime<Utc>>,
    #[serde(default)]
    team_id: Option<String>,
    #[serde(default)]
    role_in_team: Option<TeamRole>,
    #[serde(default)]
    is_admin: Option<bool>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    team_member_count: Option<u32>,
}

impl From<RawAccount> for Account {
    fn from(raw: RawAccount) -> Self {
        let is_admin = raw.is_admin.unwrap_or(false)
            || raw
                .role
                .as_deref()
                .map_or(false, |role| role == "ADMIN");

        Self {
            id: raw.id,
            email: raw.email,
            display_name: raw.display_name,
            plan: raw.plan.unwrap_or_default(),
            plan_expires_at: raw.plan_expires_at,
            grace_until: raw.grace_until,
            team_id: raw.team_id.filter(|id| !id.is_empty()),
            role_in_team: raw.role_in_team,
            is_admin,
            created_at: raw.created_at,
            team_member_count: raw.team_member_count,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.display_name.is_empty() {
            &self.email
        } else {
            &self.display_name
        };
        write!(f, "{} <{}> [{}]", name, self.email, self.plan)?;
        if self.is_admin {
            write!(f, " (admin)")?;
        }
        Ok(())
    }
}

/// `POST /auth/login` and `POST /auth/register` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Account,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub display_name: &'a str,
}
