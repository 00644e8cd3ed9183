use chrono::Utc;

use crate::cli::error::CliError;
use crate::console::commands::cli::context::short_date;
use crate::console::commands::cli::CommandContext;
use crate::console::commands::CallableTrait;
use crate::models::{Plan, TeamCreate, TeamInvite, TeamRole};
use crate::services::access;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// team show
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik team show [--json]`
pub struct ShowTeamCommand {
    pub ctx: CommandContext,
    pub json: bool,
}

impl ShowTeamCommand {
    pub fn new(ctx: CommandContext, json: bool) -> Self {
        Self { ctx, json }
    }

    async fn run(&self) -> Result<(), CliError> {
        let mut session = self.ctx.session()?;
        let account = session.start("teams").await?;
        let team = session.client().my_team().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&team)?);
            return Ok(());
        }

        let Some(team) = team else {
            if access::can_create_team(Some(account.as_ref()), Utc::now()) {
                eprintln!("You are not in a team yet. Create one with `kantik team create <name>`.");
            } else if account.plan != Plan::Team {
                eprintln!("Teams are part of the TEAM plan.");
            } else {
                eprintln!("You are not in a team.");
            }
            return Ok(());
        };

        println!("{} ({} / {} members)", team.name, team.members.len(), team.max_members);
        println!("{:<28} {:<32} {:<8} {:<12}", "UID", "EMAIL", "ROLE", "JOINED");
        println!("{}", "─".repeat(82));
        for member in &team.members {
            println!(
                "{:<28} {:<32} {:<8} {:<12}",
                member.uid,
                member.email,
                member.role,
                short_date(member.joined_at.as_deref()),
            );
        }
        if access::can_manage_team(Some(account.as_ref())) {
            eprintln!("\n{} seat(s) left.", team.seats_left());
        }
        Ok(())
    }
}

impl CallableTrait for ShowTeamCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// team create
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik team create <name>`
pub struct CreateTeamCommand {
    pub ctx: CommandContext,
    pub name: String,
}

impl CreateTeamCommand {
    pub fn new(ctx: CommandContext, name: String) -> Self {
        Self { ctx, name }
    }

    async fn run(&self) -> Result<(), CliError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CliError::Validation("Team name cannot be empty".to_string()));
        }

        let mut session = self.ctx.session()?;
        let account = session.start("teams").await?;
        if !access::can_create_team(Some(account.as_ref()), Utc::now()) {
            let reason = if account.in_team() {
                "you already belong to a team"
            } else {
                "creating a team needs an active TEAM plan"
            };
            return Err(CliError::Forbidden(reason.to_string()));
        }

        let team = session
            .client()
            .create_team(&TeamCreate {
                name: name.to_string(),
            })
            .await?;
        eprintln!("✓ Team '{}' created", team.name);
        println!("{}", team.id);
        Ok(())
    }
}

impl CallableTrait for CreateTeamCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// team invite / accept / remove
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik team invite <email> [--role member|admin]`
pub struct InviteMemberCommand {
    pub ctx: CommandContext,
    pub email: String,
    pub role: TeamRole,
}

impl InviteMemberCommand {
    pub fn new(ctx: CommandContext, email: String, role: TeamRole) -> Self {
        Self { ctx, email, role }
    }

    async fn run(&self) -> Result<(), CliError> {
        if self.role == TeamRole::Owner {
            return Err(CliError::Validation(
                "A team has exactly one owner; invite as member or admin".to_string(),
            ));
        }
        let email = self.email.trim();
        if !email.contains('@') {
            return Err(CliError::Validation(format!("'{email}' is not an email address")));
        }

        let mut session = self.ctx.session()?;
        let account = session.start("teams").await?;
        if !access::can_manage_team(Some(account.as_ref())) {
            return Err(CliError::Forbidden(
                "only the team owner or a team admin can invite".to_string(),
            ));
        }
        let team_id = account.team_id.clone().unwrap_or_default();

        let reply = session
            .client()
            .invite_member(
                &team_id,
                &TeamInvite {
                    email: email.to_string(),
                    role: self.role,
                },
            )
            .await?;
        eprintln!("✓ {}", reply.message);
        if let Some(invite_id) = reply.invite_id {
            println!("{invite_id}");
        }
        Ok(())
    }
}

impl CallableTrait for InviteMemberCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

/// `kantik team accept <invite-id>`
pub struct AcceptInviteCommand {
    pub ctx: CommandContext,
    pub invite_id: String,
}

impl AcceptInviteCommand {
    pub fn new(ctx: CommandContext, invite_id: String) -> Self {
        Self { ctx, invite_id }
    }

    async fn run(&self) -> Result<(), CliError> {
        let mut session = self.ctx.session()?;
        session.start("teams").await?;
        let reply = session.client().accept_invite(&self.invite_id).await?;
        // Team membership changes the account snapshot.
        let account = session.refresh().await?;
        eprintln!("✓ {}", reply.message);
        if let Some(team_id) = &account.team_id {
            eprintln!("  Team: {team_id}");
        }
        Ok(())
    }
}

impl CallableTrait for AcceptInviteCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

/// `kantik team remove <uid>`
pub struct RemoveMemberCommand {
    pub ctx: CommandContext,
    pub uid: String,
}

impl RemoveMemberCommand {
    pub fn new(ctx: CommandContext, uid: String) -> Self {
        Self { ctx, uid }
    }

    async fn run(&self) -> Result<(), CliError> {
        let mut session = self.ctx.session()?;
        let account = session.start("teams").await?;
        if !access::can_manage_team(Some(account.as_ref())) {
            return Err(CliError::Forbidden(
                "only the team owner or a team admin can remove members".to_string(),
            ));
        }
        if account.id == self.uid {
            return Err(CliError::Validation("You cannot remove yourself".to_string()));
        }
        let team_id = account.team_id.clone().unwrap_or_default();
        session.client().remove_member(&team_id, &self.uid).await?;
        eprintln!("✓ Member removed");
        Ok(())
    }
}

impl CallableTrait for RemoveMemberCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}
