use crate::cli::error::CliError;
use crate::console::commands::cli::context::{short_date, truncate};
use crate::console::commands::cli::CommandContext;
use crate::console::commands::CallableTrait;
use crate::services::access;

/// `kantik library [--json]`
///
/// Songs the account has downloaded, most recent first.
pub struct LibraryCommand {
    pub ctx: CommandContext,
    pub json: bool,
}

impl LibraryCommand {
    pub fn new(ctx: CommandContext, json: bool) -> Self {
        Self { ctx, json }
    }

    async fn run(&self) -> Result<(), CliError> {
        let mut session = self.ctx.session()?;
        let account = session.start("library").await?;
        if !access::has_library_access(Some(account.as_ref())) {
            return Err(CliError::Forbidden(
                "the library needs a STANDARD or TEAM plan".to_string(),
            ));
        }

        let mut songs = session.client().library().await?;
        songs.sort_by(|a, b| b.downloaded_at.cmp(&a.downloaded_at));

        if self.json {
            println!("{}", serde_json::to_string_pretty(&songs)?);
            return Ok(());
        }
        if songs.is_empty() {
            eprintln!("Your library is empty. Download a song with `kantik songs download <id>`.");
            return Ok(());
        }

        println!("{:<5} {:<40} {:<9} {:<12} {:<24}", "NO", "TITLE", "TIER", "DOWNLOADED", "ID");
        println!("{}", "─".repeat(94));
        for song in &songs {
            println!(
                "{:<5} {:<40} {:<9} {:<12} {:<24}",
                song.number,
                truncate(&song.title, 38),
                song.access_tier,
                short_date(song.downloaded_at.as_deref()),
                song.id,
            );
        }
        eprintln!("\n{} song(s) in library.", songs.len());
        Ok(())
    }
}

impl CallableTrait for LibraryCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}
