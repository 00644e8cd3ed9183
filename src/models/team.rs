use serde::{Deserialize, Serialize};

use super::account::TeamRole;

/// Seats available on a team plan.
pub const MAX_TEAM_MEMBERS: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(default)]
    pub id: Option<String>,
    pub uid: String,
    pub email: String,
    pub role: TeamRole,
    #[serde(default)]
    pub joined_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub owner_uid: String,
    #[serde(default = "default_max_members")]
    pub max_members: usize,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_max_members() -> usize {
    MAX_TEAM_MEMBERS
}

impl Team {
    pub fn seats_left(&self) -> usize {
        self.max_members.saturating_sub(self.members.len())
    }

    pub fn is_full(&self) -> bool {
        self.seats_left() == 0
    }

    pub fn member(&self, uid: &str) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.uid == uid)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamCreate {
    pub name: String,
}

/// Invitation body; owners cannot be invited.
#[derive(Debug, Clone, Serialize)]
pub struct TeamInvite {
    pub email: String,
    pub role: TeamRole,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub message: String,
    #[serde(default)]
    pub invite_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_team_seats() {
        let team: Team = serde_json::from_value(json!({
            "id": "t1",
            "name": "Chorale",
            "ownerUid": "u1",
            "members": [
                {"uid": "u1", "email": "o@example.com", "role": "OWNER"},
                {"uid": "u2", "email": "m@example.com", "role": "MEMBER"}
            ]
        }))
        .unwrap();
        assert_eq!(team.max_members, MAX_TEAM_MEMBERS);
        assert_eq!(team.seats_left(), 5);
        assert!(!team.is_full());
        assert_eq!(team.member("u2").unwrap().role, TeamRole::Member);
    }
}
