use dialoguer::Confirm;

use crate::cli::error::CliError;
use crate::cli::kantik_client::KantikClient;
use crate::console::commands::cli::context::{short_date, truncate};
use crate::console::commands::cli::CommandContext;
use crate::console::commands::CallableTrait;
use crate::models::{Account, OwnerType, PlaylistCreate};
use crate::services::playlist_order::{PlaylistEditor, ReorderPolicy};

/// Start a session. Playlist access is decided by the server.
async fn open_session(
    ctx: &CommandContext,
    feature: &str,
) -> Result<(KantikClient, std::sync::Arc<Account>), CliError> {
    let mut session = ctx.session()?;
    let account = session.start(feature).await?;
    Ok((session.client().clone(), account))
}

fn print_order(editor: &PlaylistEditor<'_, KantikClient>) {
    let detail = editor.detail();
    println!("{} ({} songs)", detail.playlist.name, detail.playlist.song_ids.len());
    for (pos, id) in detail.playlist.song_ids.iter().enumerate() {
        let title = detail
            .songs
            .iter()
            .find(|s| &s.id == id)
            .map(|s| format!("#{} {}", s.number, s.title))
            .unwrap_or_else(|| "(unavailable)".to_string());
        println!("{:>3}. {:<44} {}", pos + 1, truncate(&title, 42), id);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// playlists list / show
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik playlists list [--json]`
pub struct ListPlaylistsCommand {
    pub ctx: CommandContext,
    pub json: bool,
}

impl ListPlaylistsCommand {
    pub fn new(ctx: CommandContext, json: bool) -> Self {
        Self { ctx, json }
    }

    async fn run(&self) -> Result<(), CliError> {
        let (client, _) = open_session(&self.ctx, "playlists").await?;
        let playlists = client.list_playlists().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&playlists)?);
            return Ok(());
        }
        if playlists.is_empty() {
            eprintln!("No playlists yet. Create one with `kantik playlists create <name>`.");
            return Ok(());
        }

        println!("{:<24} {:<32} {:<6} {:<6} {:<12}", "ID", "NAME", "OWNER", "SONGS", "UPDATED");
        println!("{}", "─".repeat(84));
        for p in &playlists {
            println!(
                "{:<24} {:<32} {:<6} {:<6} {:<12}",
                p.id,
                truncate(&p.name, 30),
                p.owner_type,
                p.song_ids.len(),
                short_date(p.updated_at.as_deref()),
            );
        }
        Ok(())
    }
}

impl CallableTrait for ListPlaylistsCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

/// `kantik playlists show <id> [--json]`
pub struct ShowPlaylistCommand {
    pub ctx: CommandContext,
    pub id: String,
    pub json: bool,
}

impl ShowPlaylistCommand {
    pub fn new(ctx: CommandContext, id: String, json: bool) -> Self {
        Self { ctx, id, json }
    }

    async fn run(&self) -> Result<(), CliError> {
        let (client, _) = open_session(&self.ctx, "playlists").await?;
        let editor = PlaylistEditor::open(&client, &self.id, ReorderPolicy::default()).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(editor.detail())?);
        } else {
            print_order(&editor);
        }
        Ok(())
    }
}

impl CallableTrait for ShowPlaylistCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// playlists create / delete
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik playlists create <name> [--team]`
///
/// Team playlists are shared with every member of the caller's team.
pub struct CreatePlaylistCommand {
    pub ctx: CommandContext,
    pub name: String,
    pub team: bool,
}

impl CreatePlaylistCommand {
    pub fn new(ctx: CommandContext, name: String, team: bool) -> Self {
        Self { ctx, name, team }
    }

    async fn run(&self) -> Result<(), CliError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CliError::Validation("Playlist name cannot be empty".to_string()));
        }

        let (client, account) = open_session(&self.ctx, "playlists").await?;
        let owner_type = if self.team {
            if !account.in_team() {
                return Err(CliError::Validation(
                    "You are not a member of a team".to_string(),
                ));
            }
            OwnerType::Team
        } else {
            OwnerType::User
        };

        let playlist = client
            .create_playlist(&PlaylistCreate {
                name: name.to_string(),
                owner_type,
            })
            .await?;
        eprintln!("✓ Created playlist '{}'", playlist.name);
        println!("{}", playlist.id);
        Ok(())
    }
}

impl CallableTrait for CreatePlaylistCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

/// `kantik playlists delete <id> [--yes]`
pub struct DeletePlaylistCommand {
    pub ctx: CommandContext,
    pub id: String,
    pub yes: bool,
}

impl DeletePlaylistCommand {
    pub fn new(ctx: CommandContext, id: String, yes: bool) -> Self {
        Self { ctx, id, yes }
    }

    async fn run(&self) -> Result<(), CliError> {
        let (client, _) = open_session(&self.ctx, "playlists").await?;
        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!("Delete playlist {}?", self.id))
                .default(false)
                .interact()?;
            if !confirmed {
                eprintln!("Aborted.");
                return Ok(());
            }
        }
        client.delete_playlist(&self.id).await?;
        eprintln!("✓ Playlist deleted");
        Ok(())
    }
}

impl CallableTrait for DeletePlaylistCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// playlists add / remove / move
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik playlists add <playlist> <song>`
pub struct AddPlaylistSongCommand {
    pub ctx: CommandContext,
    pub playlist_id: String,
    pub song_id: String,
}

impl AddPlaylistSongCommand {
    pub fn new(ctx: CommandContext, playlist_id: String, song_id: String) -> Self {
        Self {
            ctx,
            playlist_id,
            song_id,
        }
    }

    async fn run(&self) -> Result<(), CliError> {
        let (client, _) = open_session(&self.ctx, "playlists").await?;
        client
            .add_playlist_song(&self.playlist_id, &self.song_id)
            .await?;
        eprintln!("✓ Song added");
        Ok(())
    }
}

impl CallableTrait for AddPlaylistSongCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

/// `kantik playlists remove <playlist> <song>`
pub struct RemovePlaylistSongCommand {
    pub ctx: CommandContext,
    pub playlist_id: String,
    pub song_id: String,
}

impl RemovePlaylistSongCommand {
    pub fn new(ctx: CommandContext, playlist_id: String, song_id: String) -> Self {
        Self {
            ctx,
            playlist_id,
            song_id,
        }
    }

    async fn run(&self) -> Result<(), CliError> {
        let (client, _) = open_session(&self.ctx, "playlists").await?;
        let mut editor =
            PlaylistEditor::open(&client, &self.playlist_id, ReorderPolicy::default()).await?;
        editor.remove_song(&self.song_id).await?;
        eprintln!("✓ Song removed");
        print_order(&editor);
        Ok(())
    }
}

impl CallableTrait for RemovePlaylistSongCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

/// `kantik playlists move <playlist> <song> <target-song> [--reconcile]`
///
/// Puts `song` where `target-song` currently is, like dropping it there.
/// With `--reconcile` a failed save reloads the server order instead of
/// keeping the local one.
pub struct MovePlaylistSongCommand {
    pub ctx: CommandContext,
    pub playlist_id: String,
    pub song_id: String,
    pub target_song_id: String,
    pub reconcile: bool,
}

impl MovePlaylistSongCommand {
    pub fn new(
        ctx: CommandContext,
        playlist_id: String,
        song_id: String,
        target_song_id: String,
        reconcile: bool,
    ) -> Self {
        Self {
            ctx,
            playlist_id,
            song_id,
            target_song_id,
            reconcile,
        }
    }

    async fn run(&self) -> Result<(), CliError> {
        let (client, _) = open_session(&self.ctx, "playlists").await?;
        let policy = if self.reconcile {
            ReorderPolicy::Reconcile
        } else {
            ReorderPolicy::BestEffort
        };
        let mut editor = PlaylistEditor::open(&client, &self.playlist_id, policy).await?;

        let moved = editor.reorder(&self.song_id, &self.target_song_id).await;
        match moved {
            Ok(true) => {
                eprintln!("✓ Order saved");
                print_order(&editor);
                Ok(())
            }
            Ok(false) => {
                eprintln!("Nothing to move.");
                Ok(())
            }
            Err(err) => {
                eprintln!("Failed to save order. Current order:");
                print_order(&editor);
                Err(err)
            }
        }
    }
}

impl CallableTrait for MovePlaylistSongCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}
