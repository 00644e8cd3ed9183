use std::io::BufRead;

use chrono::Utc;
use dialoguer::{Input, Password};

use crate::cli::credentials::Language;
use crate::cli::error::CliError;
use crate::cli::progress;
use crate::console::commands::cli::CommandContext;
use crate::console::commands::CallableTrait;
use crate::models::Account;
use crate::services::access::{self, PlanStatus};

fn prompt_email(email: &Option<String>) -> Result<String, CliError> {
    let email = match email {
        Some(email) => email.trim().to_string(),
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()?
            .trim()
            .to_string(),
    };
    if email.is_empty() {
        return Err(CliError::Validation("Email cannot be empty".to_string()));
    }
    Ok(email)
}

/// Password from the first stdin line, or an interactive hidden prompt.
fn prompt_password(from_stdin: bool, confirm: bool) -> Result<String, CliError> {
    let password = if from_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_string()
    } else {
        let prompt = Password::new().with_prompt("Password");
        let prompt = if confirm {
            prompt.with_confirmation("Confirm password", "Passwords do not match")
        } else {
            prompt
        };
        prompt.interact()?
    };
    if password.is_empty() {
        return Err(CliError::Validation("Password cannot be empty".to_string()));
    }
    Ok(password)
}

fn describe_plan(account: &Account) -> String {
    let status = access::plan_status(account, Utc::now());
    let until = |d: Option<chrono::DateTime<Utc>>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    match status {
        PlanStatus::Free => format!("{} (free)", account.plan),
        PlanStatus::Active => format!("{} active until {}", account.plan, until(account.plan_expires_at)),
        PlanStatus::GracePeriod => format!(
            "{} in grace period until {}",
            account.plan,
            until(account.grace_until)
        ),
        PlanStatus::Expired => format!("{} expired, renew from `kantik payments submit`", account.plan),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// login / register / logout
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik login [--email <email>] [--password-stdin]`
///
/// Stores the token in `~/.config/kantik/session.json`.
pub struct LoginCommand {
    pub ctx: CommandContext,
    pub email: Option<String>,
    pub password_stdin: bool,
}

impl LoginCommand {
    pub fn new(ctx: CommandContext, email: Option<String>, password_stdin: bool) -> Self {
        Self {
            ctx,
            email,
            password_stdin,
        }
    }

    async fn run(&self) -> Result<(), CliError> {
        let email = prompt_email(&self.email)?;
        let password = prompt_password(self.password_stdin, false)?;

        let mut session = self.ctx.session()?;
        let pb = progress::spinner("Signing in...");
        match session.login(&email, &password).await {
            Ok(account) => {
                progress::finish_success(&pb, &format!("Logged in as {}", account.email));
                eprintln!("  Plan: {}", describe_plan(&account));
                Ok(())
            }
            Err(err) => {
                progress::finish_error(&pb, "Login failed");
                Err(err)
            }
        }
    }
}

impl CallableTrait for LoginCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

/// `kantik register [--email <email>] [--name <display name>] [--password-stdin]`
pub struct RegisterCommand {
    pub ctx: CommandContext,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub password_stdin: bool,
}

impl RegisterCommand {
    pub fn new(
        ctx: CommandContext,
        email: Option<String>,
        display_name: Option<String>,
        password_stdin: bool,
    ) -> Self {
        Self {
            ctx,
            email,
            display_name,
            password_stdin,
        }
    }

    async fn run(&self) -> Result<(), CliError> {
        let email = prompt_email(&self.email)?;
        let display_name = match &self.display_name {
            Some(name) => name.trim().to_string(),
            None => Input::<String>::new()
                .with_prompt("Display name")
                .interact_text()?
                .trim()
                .to_string(),
        };
        if display_name.is_empty() {
            return Err(CliError::Validation("Display name cannot be empty".to_string()));
        }
        let password = prompt_password(self.password_stdin, true)?;

        let mut session = self.ctx.session()?;
        let account = session.register(&email, &password, &display_name).await?;
        eprintln!("✓ Account created for {}", account.email);
        Ok(())
    }
}

impl CallableTrait for RegisterCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

/// `kantik logout`
pub struct LogoutCommand {
    pub ctx: CommandContext,
}

impl LogoutCommand {
    pub fn new(ctx: CommandContext) -> Self {
        Self { ctx }
    }
}

impl CallableTrait for LogoutCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let manager = self.ctx.credentials();
        let was_logged_in = manager.load()?.is_logged_in();
        manager.clear_token()?;
        if was_logged_in {
            eprintln!("✓ Logged out");
        } else {
            eprintln!("Not logged in.");
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// whoami
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik whoami [--json]`
pub struct WhoamiCommand {
    pub ctx: CommandContext,
    pub json: bool,
}

impl WhoamiCommand {
    pub fn new(ctx: CommandContext, json: bool) -> Self {
        Self { ctx, json }
    }

    async fn run(&self) -> Result<(), CliError> {
        let mut session = self.ctx.session()?;
        let account = session.start("whoami").await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(account.as_ref())?);
            return Ok(());
        }

        println!("{}", account);
        println!("Plan:     {}", describe_plan(&account));
        if let Some(team_id) = &account.team_id {
            let role = account
                .role_in_team
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("Team:     {} ({})", team_id, role);
        }
        println!("Language: {}", session.credentials().language()?);
        println!("Server:   {}", session.client().base_url());
        Ok(())
    }
}

impl CallableTrait for WhoamiCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// language
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik language [fr|en]`. Shows the preference when no value is given.
pub struct LanguageCommand {
    pub ctx: CommandContext,
    pub language: Option<Language>,
}

impl LanguageCommand {
    pub fn new(ctx: CommandContext, language: Option<Language>) -> Self {
        Self { ctx, language }
    }
}

impl CallableTrait for LanguageCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let manager = self.ctx.credentials();
        match self.language {
            Some(language) => {
                manager.set_language(language)?;
                eprintln!("✓ Language set to {language}");
            }
            None => println!("{}", manager.language()?),
        }
        Ok(())
    }
}
