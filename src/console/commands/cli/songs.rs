use std::path::PathBuf;

use chrono::Utc;

use crate::cli::error::CliError;
use crate::cli::progress;
use crate::console::commands::cli::context::truncate;
use crate::console::commands::cli::CommandContext;
use crate::console::commands::CallableTrait;
use crate::models::{ResourceType, Song, SongQuery};
use crate::services::{access, download};

pub(crate) fn print_song_table(songs: &[Song]) {
    println!(
        "{:<5} {:<36} {:<4} {:<6} {:<9} {:<9} {:<24}",
        "NO", "TITLE", "LANG", "KEY", "TIER", "DOWNLOADS", "ID"
    );
    println!("{}", "─".repeat(100));
    for song in songs {
        println!(
            "{:<5} {:<36} {:<4} {:<6} {:<9} {:<9} {:<24}",
            song.number,
            truncate(&song.title, 34),
            song.language,
            song.key_original.as_deref().unwrap_or("-"),
            song.access_tier,
            song.downloads_count,
            song.id,
        );
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// songs list / featured
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik songs list [--search ..] [--language ..] [--tier ..] [--tags ..] [--sort ..] [--json]`
///
/// The catalog is public; no login needed.
pub struct ListSongsCommand {
    pub ctx: CommandContext,
    pub query: SongQuery,
    pub json: bool,
}

impl ListSongsCommand {
    pub fn new(ctx: CommandContext, query: SongQuery, json: bool) -> Self {
        Self { ctx, query, json }
    }

    async fn run(&self) -> Result<(), CliError> {
        let client = self.ctx.client()?;
        let songs = client.list_songs(&self.query).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&songs)?);
            return Ok(());
        }
        if songs.is_empty() {
            eprintln!("No songs found.");
            return Ok(());
        }
        print_song_table(&songs);
        eprintln!("\n{} song(s).", songs.len());
        Ok(())
    }
}

impl CallableTrait for ListSongsCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

/// `kantik songs featured`
pub struct FeaturedSongsCommand {
    pub ctx: CommandContext,
    pub json: bool,
}

impl FeaturedSongsCommand {
    pub fn new(ctx: CommandContext, json: bool) -> Self {
        Self { ctx, json }
    }

    async fn run(&self) -> Result<(), CliError> {
        let songs = self.ctx.client()?.featured_songs().await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&songs)?);
        } else {
            print_song_table(&songs);
        }
        Ok(())
    }
}

impl CallableTrait for FeaturedSongsCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// songs show
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik songs show <id> [--json]`
///
/// When logged in, also tells whether the current plan allows downloading.
pub struct ShowSongCommand {
    pub ctx: CommandContext,
    pub id: String,
    pub json: bool,
}

impl ShowSongCommand {
    pub fn new(ctx: CommandContext, id: String, json: bool) -> Self {
        Self { ctx, id, json }
    }

    async fn run(&self) -> Result<(), CliError> {
        let mut session = self.ctx.session()?;
        // Anonymous browsing is fine; only a bad stored token is worth reporting.
        let started = session.start("songs show").await;
        match started {
            Ok(_) | Err(CliError::LoginRequired { .. }) => {}
            Err(err) if err.is_session_expired() => {
                eprintln!("Stored session expired; showing public details.");
                session = self.ctx.session()?;
            }
            Err(err) => return Err(err),
        }

        let song = session.client().get_song(&self.id).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&song)?);
            return Ok(());
        }

        println!("#{} {}", song.number, song.title);
        println!("Language:  {}", song.language);
        println!("Key:       {}", song.key_original.as_deref().unwrap_or("-"));
        if let Some(tempo) = song.tempo {
            println!("Tempo:     {tempo} bpm");
        }
        if !song.tags.is_empty() {
            println!("Tags:      {}", song.tags.join(", "));
        }
        println!("Tier:      {}", song.access_tier);
        println!("Downloads: {}", song.downloads_count);
        for resource in &song.resources {
            println!(
                "  - {} {}",
                resource.resource_type,
                resource.filename.as_deref().unwrap_or("")
            );
        }

        let account = session.state().snapshot();
        match access::download_denial(account.as_deref(), Utc::now(), song.access_tier) {
            None => println!("Download:  available"),
            Some(reason) => println!("Download:  unavailable ({reason})"),
        }
        Ok(())
    }
}

impl CallableTrait for ShowSongCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// songs download
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik songs download <id> [--lyrics] [--out DIR]`
///
/// Downloads the chord sheet, or the lyrics sheet with `--lyrics`.
pub struct DownloadSongCommand {
    pub ctx: CommandContext,
    pub id: String,
    pub lyrics: bool,
    pub out: Option<PathBuf>,
}

impl DownloadSongCommand {
    pub fn new(ctx: CommandContext, id: String, lyrics: bool, out: Option<PathBuf>) -> Self {
        Self {
            ctx,
            id,
            lyrics,
            out,
        }
    }

    async fn run(&self) -> Result<(), CliError> {
        let mut session = self.ctx.session()?;
        let account = session.start("downloads").await?;
        let song = session.client().get_song(&self.id).await?;

        let kind = if self.lyrics {
            ResourceType::LyricsPdf
        } else {
            ResourceType::ChordsPdf
        };
        let dest = self
            .out
            .clone()
            .unwrap_or_else(|| self.ctx.settings.download_dir());

        let pb = progress::spinner(&format!("Downloading #{} {}...", song.number, song.title));
        match download::download_resource(
            Some(account.as_ref()),
            session.client(),
            &song,
            kind,
            &dest,
            Utc::now(),
        )
        .await
        {
            Ok(path) => {
                progress::finish_success(&pb, &format!("Saved {}", path.display()));
                println!("{}", path.display());
                Ok(())
            }
            Err(err) => {
                progress::finish_error(&pb, "Download failed");
                Err(err)
            }
        }
    }
}

impl CallableTrait for DownloadSongCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// songs preview
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `kantik songs preview <id> [--out FILE]`
///
/// Without `--out` only the preview status is printed.
pub struct PreviewSongCommand {
    pub ctx: CommandContext,
    pub id: String,
    pub out: Option<PathBuf>,
}

impl PreviewSongCommand {
    pub fn new(ctx: CommandContext, id: String, out: Option<PathBuf>) -> Self {
        Self { ctx, id, out }
    }

    async fn run(&self) -> Result<(), CliError> {
        let client = self.ctx.client()?;
        let status = client.preview_status(&self.id).await?;
        if !status.has_preview {
            eprintln!("No preview available for song {}.", self.id);
            return Ok(());
        }

        let Some(out) = &self.out else {
            let origin = if status.auto_generated {
                "auto-generated"
            } else {
                "uploaded"
            };
            println!("Preview available ({origin})");
            return Ok(());
        };

        let preview = client.preview(&self.id).await?;
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(out, &preview.bytes)?;
        eprintln!(
            "✓ Saved preview ({}, {} bytes) to {}",
            preview.content_type.as_deref().unwrap_or("image"),
            preview.bytes.len(),
            out.display()
        );
        Ok(())
    }
}

impl CallableTrait for PreviewSongCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ctx.block_on(self.run())
    }
}
