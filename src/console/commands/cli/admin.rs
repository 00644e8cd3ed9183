use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use dialoguer::Confirm;

use crate::cli::credentials::FileCredentialStore;
use crate::cli::error::CliError;
use crate::cli::kantik_client::{Upload, UserAction};
use crate::console::commands::cli::context::{short_date, truncate};
use crate::console::commands::cli::payments::print_payment_table;
use crate::console::commands::cli::songs::print_song_table;
use crate::console::commands::cli::CommandContext;
use crate::console::commands::CallableTrait;
use crate::models::timestamp::parse_timestamp;
use crate::models::{
    Account, PaymentReview, PaymentStatus, ResourceType, ReviewDecision, SongInput, SongPatch,
    UserAdminUpdate,
};
use crate::services::access::{self, PlanStatus};
use crate::services::download;
use crate::services::session::Session;

/// What an admin command does. Every action requires the admin flag.
#[derive(Debug, Clone)]
pub enum AdminAction {
    Stats,
    Payments { status: Option<PaymentStatus> },
    Payment { id: String },
    Receipt { id: String, out: Option<PathBuf> },
    Review { id: String, decision: ReviewDecision, note: Option<String>, yes: bool },
    Users,
    User { id: String },
    UpdateUser { id: String, update: UserAdminUpdate },
    UserAction { id: String, action: UserAction },
    Songs,
    CreateSong { input: SongInput },
    UpdateSong { id: String, patch: SongPatch },
    DeleteSong { id: String, yes: bool },
    UploadResource { song_id: String, resource_type: ResourceType, file: PathBuf },
}

/// `kantik admin <action>`
pub struct AdminCommand {
    pub ctx: CommandContext,
    pub action: AdminAction,
    pub json: bool,
}

impl AdminCommand {
    pub fn new(ctx: CommandContext, action: AdminAction, json: bool) -> Self {
        Self { ctx, action, json }
    }

    async fn admin_session(
        &self,
    ) -> Result<(Session<FileCredentialStore>, Arc<Account>), CliError> {
        let mut session = self.ctx.session()?;
        let account = session.start("admin").await?;
        if !account.is_admin {
            return Err(CliError::Forbidden("admin access required".to_string()));
        }
        Ok((session, account))
    }

    fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn confirm(yes: bool, prompt: String) -> Result<bool, CliError> {
        if yes {
            return Ok(true);
        }
        Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
    }

    async fn run(&self) -> Result<(), CliError> {
        let (session, me) = self.admin_session().await?;
        let client = session.client();

        match &self.action {
            AdminAction::Stats => {
                let stats = client.admin_stats().await?;
                if self.json {
                    return Self::print_json(&stats);
                }
                println!("Users:            {}", stats.total_users);
                println!("  STANDARD:       {} ({} active)", stats.standard_users, stats.active_standard);
                println!("  TEAM:           {} ({} active)", stats.team_users, stats.active_team);
                println!("Teams:            {}", stats.total_teams);
                println!("Songs:            {} ({} inactive)", stats.total_songs, stats.inactive_songs);
                println!("Downloads:        {}", stats.total_downloads);
                println!("Pending payments: {}", stats.pending_payments);
            }

            AdminAction::Payments { status } => {
                let payments = client.admin_payments(*status).await?;
                if self.json {
                    return Self::print_json(&payments);
                }
                if payments.is_empty() {
                    eprintln!("No payments.");
                } else {
                    print_payment_table(&payments, true);
                }
            }

            AdminAction::Payment { id } => {
                let detail = client.admin_payment(id).await?;
                if self.json {
                    return Self::print_json(&detail);
                }
                let p = &detail.payment;
                println!("Payment {} [{}]", p.id, p.status);
                println!("Plan:      {}", p.plan_requested);
                println!("Amount:    {:.2} {}", p.amount, p.currency);
                println!("Provider:  {}", p.provider);
                if let Some(bank) = &p.bank_name {
                    println!("Bank:      {bank}");
                }
                println!("Month:     {}", p.billing_month);
                println!("Reference: {}", p.reference);
                println!("Receipt:   {}", if p.has_receipt() { "yes" } else { "no" });
                println!("Submitted: {}", short_date(p.created_at.as_deref()));
                if let Some(user) = &detail.user {
                    println!("User:      {user}");
                }
                if let Some(note) = &p.note {
                    println!("Note:      {note}");
                }
            }

            AdminAction::Receipt { id, out } => {
                let receipt = client.admin_receipt(id).await?;
                let dir = out.clone().unwrap_or_else(|| self.ctx.settings.download_dir());
                let path = download::write_payload(&receipt, &dir, &format!("receipt-{id}"))?;
                eprintln!("✓ Receipt saved");
                println!("{}", path.display());
            }

            AdminAction::Review {
                id,
                decision,
                note,
                yes,
            } => {
                let verb = match decision {
                    ReviewDecision::Approved => "Approve",
                    ReviewDecision::Rejected => "Reject",
                };
                if !Self::confirm(*yes, format!("{verb} payment {id}?"))? {
                    eprintln!("Aborted.");
                    return Ok(());
                }
                let review = PaymentReview {
                    decision: *decision,
                    note: note.clone().filter(|n| !n.trim().is_empty()),
                };
                let reply = client.review_payment(id, &review).await?;
                eprintln!("✓ {}", reply.message);
            }

            AdminAction::Users => {
                let users = client.admin_users().await?;
                if self.json {
                    return Self::print_json(&users);
                }
                let now = Utc::now();
                println!(
                    "{:<28} {:<32} {:<24} {:<9} {:<12} {:<11} {}",
                    "ID", "EMAIL", "NAME", "PLAN", "STATUS", "EXPIRES", "ADMIN"
                );
                println!("{}", "─".repeat(124));
                for u in &users {
                    let status = access::plan_status(u, now);
                    println!(
                        "{:<28} {:<32} {:<24} {:<9} {:<12} {:<11} {}",
                        u.id,
                        truncate(&u.email, 30),
                        truncate(&u.display_name, 22),
                        u.plan,
                        status.to_string(),
                        u.plan_expires_at
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        if u.is_admin { "yes" } else { "" },
                    );
                }
                let lapsed = users
                    .iter()
                    .filter(|u| access::plan_status(u, now) == PlanStatus::Expired)
                    .count();
                eprintln!("\n{} user(s), {} with an expired plan.", users.len(), lapsed);
            }

            AdminAction::User { id } => {
                let detail = client.admin_user(id).await?;
                if self.json {
                    return Self::print_json(&detail);
                }
                let account = &detail.account;
                println!("{account}");
                println!("Plan status: {}", access::plan_status(account, Utc::now()));
                if let Some(d) = account.plan_expires_at {
                    println!("Expires:     {}", d.format("%Y-%m-%d"));
                }
                if let Some(d) = account.grace_until {
                    println!("Grace until: {}", d.format("%Y-%m-%d"));
                }
                if let Some(team) = &detail.team {
                    println!("Team:        {} ({} members)", team.name, detail.team_members.len());
                }
                if !detail.payments.is_empty() {
                    println!();
                    print_payment_table(&detail.payments, false);
                }
            }

            AdminAction::UpdateUser { id, update } => {
                if update.is_empty() {
                    return Err(CliError::Validation("Nothing to update".to_string()));
                }
                client.update_user(id, &normalize_dates(update.clone())?).await?;
                eprintln!("✓ User {id} updated");
            }

            AdminAction::UserAction { id, action } => {
                if *action == UserAction::DemoteAdmin && me.id == *id {
                    return Err(CliError::Validation(
                        "You cannot remove your own admin role".to_string(),
                    ));
                }
                client.user_action(id, *action).await?;
                let done = match action {
                    UserAction::PromoteAdmin => "promoted to admin",
                    UserAction::DemoteAdmin => "is no longer an admin",
                    UserAction::ResetPlan => "reset to the FREE plan",
                };
                eprintln!("✓ User {id} {done}");
            }

            AdminAction::Songs => {
                let songs = client.admin_songs().await?;
                if self.json {
                    return Self::print_json(&songs);
                }
                print_song_table(&songs);
                let inactive = songs.iter().filter(|s| !s.active).count();
                eprintln!("\n{} song(s), {} inactive.", songs.len(), inactive);
            }

            AdminAction::CreateSong { input } => {
                if input.title.trim().is_empty() {
                    return Err(CliError::Validation("Song title cannot be empty".to_string()));
                }
                let song = client.create_song(input).await?;
                eprintln!("✓ Created #{} {}", song.number, song.title);
                println!("{}", song.id);
            }

            AdminAction::UpdateSong { id, patch } => {
                if patch.is_empty() {
                    return Err(CliError::Validation("Nothing to update".to_string()));
                }
                client.update_song(id, patch).await?;
                eprintln!("✓ Song {id} updated");
            }

            AdminAction::DeleteSong { id, yes } => {
                if !Self::confirm(*yes, format!("Delete song {id}?"))? {
                    eprintln!("Aborted.");
                    return Ok(());
                }
                client.delete_song(id).await?;
                eprintln!("✓ Song {id} deleted");
            }

            AdminAction::UploadResource {
                song_id,
                resource_type,
                file,
            } => {
                let upload = Upload::from_path(file)?;
                let reply = client
                    .upload_resource(song_id, *resource_type, upload)
                    .await?;
                eprintln!("✓ {}", reply.message);
                if reply.preview_generated {
                    eprintln!("  Preview image generated from the first page.");
                }
            }
        }
        Ok(())
    }
}

/// Accept `YYYY-MM-DD` or RFC 3339 dates and send them as RFC 3339.
fn normalize_dates(mut update: UserAdminUpdate) -> Result<UserAdminUpdate, CliError> {
    let normalize = |raw: Option<String>, what: &str| -> Result<Option<String>, CliError> {
        raw.map(|value| {
            parse_timestamp(&value)
                .map(|d| d.to_rfc3339())
                .ok_or_else(|| CliError::Validation(format!("invalid {what} date '{value}'")))
        })
        .transpose()
    };
    update.plan_expires_at = normalize(update.plan_expires_at.take(), "expiry")?;
    update.grace_until = normalize(update.grace_until.take(), "grace")?;
    Ok(update)
}

impl CallableTrait for AdminCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dates_accepts_plain_dates() {
        let update = UserAdminUpdate {
            plan_expires_at: Some("2024-03-31".into()),
            ..UserAdminUpdate::default()
        };
        let normalized = normalize_dates(update).unwrap();
        assert_eq!(
            normalized.plan_expires_at.as_deref(),
            Some("2024-03-31T00:00:00+00:00")
        );
        assert!(normalized.grace_until.is_none());
    }

    #[test]
    fn test_normalize_dates_rejects_garbage() {
        let update = UserAdminUpdate {
            grace_until: Some("next week".into()),
            ..UserAdminUpdate::default()
        };
        assert!(matches!(normalize_dates(update), Err(CliError::Validation(_))));
    }
}
