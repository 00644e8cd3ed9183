//! `kantik` command-line client.
//!
//! ```text
//! kantik login
//! kantik songs list --search "gloire" --language ht
//! kantik songs download <id>
//! kantik playlists move <playlist> <song> <target-song>
//! kantik payments submit --plan standard --provider moncash ...
//! kantik admin payments --status pending
//! ```
//!
//! Settings come from `kantik.{toml,yaml,json}`, `.env` and `KANTIK_*`
//! variables; `--api-url` overrides them all.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kantik::cli::credentials::Language;
use kantik::cli::kantik_client::UserAction;
use kantik::configuration::get_configuration;
use kantik::console::commands::cli::admin::{AdminAction, AdminCommand};
use kantik::console::commands::cli::{account, library, payments, playlists, songs, team};
use kantik::console::commands::cli::CommandContext;
use kantik::console::commands::CallableTrait;
use kantik::models::{
    AccessTier, Currency, PaymentProvider, PaymentRequest, PaymentStatus, Plan, ResourceType,
    ReviewDecision, SongInput, SongLanguage, SongPatch, SongQuery, SongSort, TeamRole,
    UserAdminUpdate, UserRole,
};
use kantik::telemetry::{get_subscriber, init_subscriber};

#[derive(Parser, Debug)]
#[command(
    name = "kantik",
    version,
    about = "Browse and download Kantik chord charts",
    long_about = "Kantik CLI: browse the chord-chart catalog, download charts your plan\n\
        covers, manage playlists and teams, and declare manual payments."
)]
struct Cli {
    /// API base URL (default: http://localhost:8001/api)
    #[arg(long, global = true, env = "KANTIK_API_URL", value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: KantikCommands,
}

#[derive(Debug, Subcommand)]
enum KantikCommands {
    /// Sign in and store the session token
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },
    /// Create an account (starts on the FREE plan)
    Register {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        password_stdin: bool,
    },
    /// Forget the stored session token
    Logout,
    /// Show the signed-in account and its plan
    Whoami {
        #[arg(long)]
        json: bool,
    },
    /// Show or set the interface language (fr, en)
    Language {
        language: Option<Language>,
    },
    /// Browse the song catalog
    Songs {
        #[command(subcommand)]
        command: SongsCommands,
    },
    /// Songs you have downloaded
    Library {
        #[arg(long)]
        json: bool,
    },
    /// Manage personal and team playlists
    Playlists {
        #[command(subcommand)]
        command: PlaylistsCommands,
    },
    /// Manage your team (TEAM plan)
    Team {
        #[command(subcommand)]
        command: TeamCommands,
    },
    /// Declare and track manual payments
    Payments {
        #[command(subcommand)]
        command: PaymentsCommands,
    },
    /// Administration (admin accounts only)
    Admin {
        /// Print raw JSON where the action lists data
        #[arg(long, global = true)]
        json: bool,
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Debug, Subcommand)]
enum SongsCommands {
    /// List the catalog
    List {
        /// Match number, title or tags
        #[arg(long, short)]
        search: Option<String>,
        /// fr, ht
        #[arg(long)]
        language: Option<SongLanguage>,
        /// standard, premium
        #[arg(long)]
        tier: Option<AccessTier>,
        /// Comma separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// number, popular, newest
        #[arg(long, default_value = "number")]
        sort: SongSort,
        #[arg(long)]
        json: bool,
    },
    /// Featured songs
    Featured {
        #[arg(long)]
        json: bool,
    },
    /// Show a song and whether you can download it
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Download the chords PDF (or lyrics with --lyrics)
    Download {
        id: String,
        #[arg(long)]
        lyrics: bool,
        /// Destination directory
        #[arg(long, short, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Save the first-page preview image
    Preview {
        id: String,
        #[arg(long, short, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum PlaylistsCommands {
    List {
        #[arg(long)]
        json: bool,
    },
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    Create {
        name: String,
        /// Share the playlist with your team
        #[arg(long)]
        team: bool,
    },
    Delete {
        id: String,
        #[arg(long, short)]
        yes: bool,
    },
    /// Append a song
    Add { playlist: String, song: String },
    /// Remove a song
    Remove { playlist: String, song: String },
    /// Move a song to where another song currently is
    Move {
        playlist: String,
        song: String,
        target: String,
        /// Reload the server order if saving fails
        #[arg(long)]
        reconcile: bool,
    },
}

#[derive(Debug, Subcommand)]
enum TeamCommands {
    Show {
        #[arg(long)]
        json: bool,
    },
    Create { name: String },
    /// Invite someone by email
    Invite {
        email: String,
        /// member, admin
        #[arg(long, default_value = "member")]
        role: TeamRole,
    },
    /// Accept an invitation
    Accept { invite_id: String },
    /// Remove a member by user id
    Remove { uid: String },
}

#[derive(Debug, Subcommand)]
enum PaymentsCommands {
    List {
        #[arg(long)]
        json: bool,
    },
    /// Declare a MonCash or bank-transfer payment
    Submit(SubmitArgs),
}

#[derive(Debug, Args)]
struct SubmitArgs {
    /// standard, team
    #[arg(long)]
    plan: Plan,
    /// moncash, bank-transfer
    #[arg(long)]
    provider: PaymentProvider,
    /// Required for bank transfers
    #[arg(long)]
    bank: Option<String>,
    #[arg(long)]
    amount: f64,
    /// HTG, USD
    #[arg(long, default_value = "HTG")]
    currency: Currency,
    /// Billing month, YYYY-MM
    #[arg(long)]
    month: String,
    /// Transaction reference
    #[arg(long)]
    reference: String,
    /// Receipt image or PDF
    #[arg(long, value_name = "FILE")]
    receipt: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum AdminCommands {
    /// Dashboard counters
    Stats,
    /// List payments, optionally by status
    Payments {
        /// pending, approved, rejected
        #[arg(long)]
        status: Option<PaymentStatus>,
    },
    /// Show one payment
    Payment { id: String },
    /// Save a payment receipt
    Receipt {
        id: String,
        #[arg(long, short, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Approve or reject a pending payment
    Review {
        id: String,
        #[command(subcommand)]
        decision: ReviewCommands,
    },
    /// List accounts
    Users,
    /// Show one account with its team and payments
    User { id: String },
    /// Change role, plan or dates of an account
    UpdateUser {
        id: String,
        /// user, admin
        #[arg(long)]
        role: Option<UserRole>,
        #[arg(long)]
        plan: Option<Plan>,
        /// Plan expiry, YYYY-MM-DD
        #[arg(long, value_name = "DATE")]
        expires: Option<String>,
        /// End of the grace period, YYYY-MM-DD
        #[arg(long, value_name = "DATE")]
        grace: Option<String>,
    },
    Promote { id: String },
    Demote { id: String },
    /// Put an account back on the FREE plan
    ResetPlan { id: String },
    /// List every song, inactive included
    Songs,
    CreateSong {
        #[arg(long)]
        number: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        language: SongLanguage,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        tempo: Option<u32>,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long, default_value = "standard")]
        tier: AccessTier,
    },
    UpdateSong {
        id: String,
        #[arg(long)]
        number: Option<i64>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        language: Option<SongLanguage>,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        tempo: Option<u32>,
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
        #[arg(long)]
        tier: Option<AccessTier>,
        #[arg(long)]
        active: Option<bool>,
    },
    DeleteSong {
        id: String,
        #[arg(long, short)]
        yes: bool,
    },
    /// Attach a PDF or image to a song
    UploadResource {
        song_id: String,
        /// chords, lyrics, preview
        resource_type: ResourceType,
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum ReviewCommands {
    Approve {
        #[arg(long)]
        note: Option<String>,
        #[arg(long, short)]
        yes: bool,
    },
    Reject {
        #[arg(long)]
        note: Option<String>,
        #[arg(long, short)]
        yes: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = match get_configuration() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Error: failed to read configuration: {}", err);
            std::process::exit(1);
        }
    };
    if let Some(api_url) = cli.api_url.clone() {
        settings.api_url = api_url;
    }

    let subscriber = get_subscriber("kantik".into(), settings.log.clone(), std::io::stderr);
    init_subscriber(subscriber)?;

    let command = get_command(cli, CommandContext::new(settings));
    if let Err(err) = command.call() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
    Ok(())
}

fn get_command(cli: Cli, ctx: CommandContext) -> Box<dyn CallableTrait> {
    match cli.command {
        KantikCommands::Login {
            email,
            password_stdin,
        } => Box::new(account::LoginCommand::new(ctx, email, password_stdin)),
        KantikCommands::Register {
            email,
            name,
            password_stdin,
        } => Box::new(account::RegisterCommand::new(ctx, email, name, password_stdin)),
        KantikCommands::Logout => Box::new(account::LogoutCommand::new(ctx)),
        KantikCommands::Whoami { json } => Box::new(account::WhoamiCommand::new(ctx, json)),
        KantikCommands::Language { language } => {
            Box::new(account::LanguageCommand::new(ctx, language))
        }

        KantikCommands::Songs { command } => match command {
            SongsCommands::List {
                search,
                language,
                tier,
                tags,
                sort,
                json,
            } => {
                let query = SongQuery {
                    search,
                    language,
                    access_tier: tier,
                    tags,
                    sort,
                };
                Box::new(songs::ListSongsCommand::new(ctx, query, json))
            }
            SongsCommands::Featured { json } => {
                Box::new(songs::FeaturedSongsCommand::new(ctx, json))
            }
            SongsCommands::Show { id, json } => Box::new(songs::ShowSongCommand::new(ctx, id, json)),
            SongsCommands::Download { id, lyrics, out } => {
                Box::new(songs::DownloadSongCommand::new(ctx, id, lyrics, out))
            }
            SongsCommands::Preview { id, out } => {
                Box::new(songs::PreviewSongCommand::new(ctx, id, out))
            }
        },

        KantikCommands::Library { json } => Box::new(library::LibraryCommand::new(ctx, json)),

        KantikCommands::Playlists { command } => match command {
            PlaylistsCommands::List { json } => {
                Box::new(playlists::ListPlaylistsCommand::new(ctx, json))
            }
            PlaylistsCommands::Show { id, json } => {
                Box::new(playlists::ShowPlaylistCommand::new(ctx, id, json))
            }
            PlaylistsCommands::Create { name, team } => {
                Box::new(playlists::CreatePlaylistCommand::new(ctx, name, team))
            }
            PlaylistsCommands::Delete { id, yes } => {
                Box::new(playlists::DeletePlaylistCommand::new(ctx, id, yes))
            }
            PlaylistsCommands::Add { playlist, song } => {
                Box::new(playlists::AddPlaylistSongCommand::new(ctx, playlist, song))
            }
            PlaylistsCommands::Remove { playlist, song } => {
                Box::new(playlists::RemovePlaylistSongCommand::new(ctx, playlist, song))
            }
            PlaylistsCommands::Move {
                playlist,
                song,
                target,
                reconcile,
            } => Box::new(playlists::MovePlaylistSongCommand::new(
                ctx, playlist, song, target, reconcile,
            )),
        },

        KantikCommands::Team { command } => match command {
            TeamCommands::Show { json } => Box::new(team::ShowTeamCommand::new(ctx, json)),
            TeamCommands::Create { name } => Box::new(team::CreateTeamCommand::new(ctx, name)),
            TeamCommands::Invite { email, role } => {
                Box::new(team::InviteMemberCommand::new(ctx, email, role))
            }
            TeamCommands::Accept { invite_id } => {
                Box::new(team::AcceptInviteCommand::new(ctx, invite_id))
            }
            TeamCommands::Remove { uid } => Box::new(team::RemoveMemberCommand::new(ctx, uid)),
        },

        KantikCommands::Payments { command } => match command {
            PaymentsCommands::List { json } => {
                Box::new(payments::ListPaymentsCommand::new(ctx, json))
            }
            PaymentsCommands::Submit(args) => {
                let request = PaymentRequest {
                    plan_requested: args.plan,
                    provider: args.provider,
                    bank_name: args.bank,
                    amount: args.amount,
                    currency: args.currency,
                    billing_month: args.month,
                    reference: args.reference,
                };
                Box::new(payments::SubmitPaymentCommand::new(ctx, request, args.receipt))
            }
        },

        KantikCommands::Admin { json, command } => {
            Box::new(AdminCommand::new(ctx, admin_action(command), json))
        }
    }
}

fn admin_action(command: AdminCommands) -> AdminAction {
    match command {
        AdminCommands::Stats => AdminAction::Stats,
        AdminCommands::Payments { status } => AdminAction::Payments { status },
        AdminCommands::Payment { id } => AdminAction::Payment { id },
        AdminCommands::Receipt { id, out } => AdminAction::Receipt { id, out },
        AdminCommands::Review { id, decision } => {
            let (decision, note, yes) = match decision {
                ReviewCommands::Approve { note, yes } => (ReviewDecision::Approved, note, yes),
                ReviewCommands::Reject { note, yes } => (ReviewDecision::Rejected, note, yes),
            };
            AdminAction::Review {
                id,
                decision,
                note,
                yes,
            }
        }
        AdminCommands::Users => AdminAction::Users,
        AdminCommands::User { id } => AdminAction::User { id },
        AdminCommands::UpdateUser {
            id,
            role,
            plan,
            expires,
            grace,
        } => AdminAction::UpdateUser {
            id,
            update: UserAdminUpdate {
                role,
                plan,
                plan_expires_at: expires,
                grace_until: grace,
            },
        },
        AdminCommands::Promote { id } => AdminAction::UserAction {
            id,
            action: UserAction::PromoteAdmin,
        },
        AdminCommands::Demote { id } => AdminAction::UserAction {
            id,
            action: UserAction::DemoteAdmin,
        },
        AdminCommands::ResetPlan { id } => AdminAction::UserAction {
            id,
            action: UserAction::ResetPlan,
        },
        AdminCommands::Songs => AdminAction::Songs,
        AdminCommands::CreateSong {
            number,
            title,
            language,
            key,
            tempo,
            tags,
            tier,
        } => AdminAction::CreateSong {
            input: SongInput {
                number,
                title,
                language,
                key_original: key,
                tempo,
                tags,
                access_tier: tier,
            },
        },
        AdminCommands::UpdateSong {
            id,
            number,
            title,
            language,
            key,
            tempo,
            tags,
            tier,
            active,
        } => AdminAction::UpdateSong {
            id,
            patch: SongPatch {
                number,
                title,
                language,
                key_original: key,
                tempo,
                tags,
                access_tier: tier,
                active,
            },
        },
        AdminCommands::DeleteSong { id, yes } => AdminAction::DeleteSong { id, yes },
        AdminCommands::UploadResource {
            song_id,
            resource_type,
            file,
        } => AdminAction::UploadResource {
            song_id,
            resource_type,
            file,
        },
    }
}
