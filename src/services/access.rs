//! Subscription access evaluation.
//!
//! Pure functions of an account snapshot and the current instant. They are
//! re-evaluated on every check rather than cached, so the answer always
//! reflects the latest fetched snapshot and the wall clock. Missing data
//! always yields the least-privileged answer.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::models::{AccessTier, Account, Plan};

/// Whether the account's plan is currently usable.
///
/// `FREE` never expires. A paid plan is usable while `now` is on or before
/// `planExpiresAt` or on or before `graceUntil`; a paid plan carrying neither
/// timestamp is treated as expired.
pub fn is_plan_active(account: Option<&Account>, now: DateTime<Utc>) -> bool {
    let Some(account) = account else {
        return false;
    };

    if account.plan == Plan::Free {
        return true;
    }

    let before = |deadline: Option<DateTime<Utc>>| deadline.map_or(false, |d| now <= d);
    before(account.plan_expires_at) || before(account.grace_until)
}

/// Why a download is refused client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadDenial {
    NotAuthenticated,
    PlanInactive,
    FreePlan,
    TierTooLow { plan: Plan, tier: AccessTier },
}

impl fmt::Display for DownloadDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "log in to download"),
            Self::PlanInactive => write!(f, "your plan has expired; renew it to download"),
            Self::FreePlan => write!(f, "upgrade to a paid plan to download"),
            Self::TierTooLow { plan, tier } => {
                write!(f, "{tier} songs are not included in the {plan} plan; upgrade to download")
            }
        }
    }
}

/// The refusal reason behind [`can_download`], or `None` when allowed.
///
/// The admin flag is deliberately not consulted.
pub fn download_denial(
    account: Option<&Account>,
    now: DateTime<Utc>,
    tier: AccessTier,
) -> Option<DownloadDenial> {
    let Some(acc) = account else {
        return Some(DownloadDenial::NotAuthenticated);
    };
    if !is_plan_active(account, now) {
        return Some(DownloadDenial::PlanInactive);
    }
    if acc.plan == Plan::Free {
        return Some(DownloadDenial::FreePlan);
    }
    if !acc.plan.covers(tier) {
        return Some(DownloadDenial::TierTooLow {
            plan: acc.plan,
            tier,
        });
    }
    None
}

/// Whether content of `tier` may be downloaded by `account` at `now`.
pub fn can_download(account: Option<&Account>, now: DateTime<Utc>, tier: AccessTier) -> bool {
    download_denial(account, now, tier).is_none()
}

/// Display-level state of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Free,
    Active,
    GracePeriod,
    Expired,
}

impl PlanStatus {
    pub fn is_usable(self) -> bool {
        self != Self::Expired
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Active => write!(f, "active"),
            Self::GracePeriod => write!(f, "grace period"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Classify a plan. `is_usable()` of the result always equals
/// [`is_plan_active`] for the same inputs.
pub fn plan_status(account: &Account, now: DateTime<Utc>) -> PlanStatus {
    if account.plan == Plan::Free {
        return PlanStatus::Free;
    }
    if account.plan_expires_at.map_or(false, |d| now <= d) {
        return PlanStatus::Active;
    }
    if account.grace_until.map_or(false, |d| now <= d) {
        return PlanStatus::GracePeriod;
    }
    PlanStatus::Expired
}

/// Owners and team admins may invite and remove members.
pub fn can_manage_team(account: Option<&Account>) -> bool {
    account.map_or(false, |acc| {
        acc.in_team() && acc.role_in_team.map_or(false, |r| r.can_manage_members())
    })
}

/// Only an active `TEAM` plan without an existing team may create one.
pub fn can_create_team(account: Option<&Account>, now: DateTime<Utc>) -> bool {
    account.map_or(false, |acc| {
        acc.plan == Plan::Team && !acc.in_team() && is_plan_active(account, now)
    })
}

/// The personal library is shown to any paid plan, lapsed or not.
pub fn has_library_access(account: Option<&Account>) -> bool {
    account.map_or(false, |acc| acc.plan.is_paid())
}
