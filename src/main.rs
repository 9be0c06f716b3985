//! # notekeeper CLI (`notes`)
//!
//! Runs the notes server and talks to it.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `notes init` | Create the SQLite database and run schema migrations |
//! | `notes serve` | Start the HTTP API |
//! | `notes list` | List notes, newest first |
//! | `notes get <id>` | Show one note |
//! | `notes create --title T --content C` | Create a note |
//! | `notes edit <id> [--title T] [--content C]` | Update a note |
//! | `notes delete <id>` | Delete a note |
//! | `notes summarize <id>` | Ask the server for an AI summary |
//!
//! Server commands read `--config`; client commands only need `--api`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use notekeeper::client::{self, NotesClient, DEFAULT_API};
use notekeeper::{config, migrate, server};

#[derive(Parser)]
#[command(
    name = "notes",
    about = "notekeeper: notes with cached AI summaries",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/notes.toml")]
    config: PathBuf,

    /// Base URL of the notes collection, used by client commands.
    #[arg(long, global = true, env = "NOTES_API", default_value = DEFAULT_API)]
    api: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; running it multiple times is safe.
    Init,

    /// Start the HTTP server on `[server].bind` (or `$PORT`).
    Serve,

    /// List all notes, most recently updated first.
    List,

    /// Show a note by ID.
    Get { id: String },

    /// Create a note.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },

    /// Update a note's title and/or content. The cached summary is kept.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },

    /// Delete a note.
    Delete { id: String },

    /// Generate and cache an AI summary for a note.
    Summarize { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal.
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api = NotesClient::new(cli.api.clone());

    match cli.command {
        Commands::Init => {
            let cfg = config::load_config(&cli.config)?;
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            let cfg = config::load_config(&cli.config)?;
            server::run_server(&cfg).await?;
        }
        Commands::List => client::run_list(&api).await?,
        Commands::Get { id } => client::run_get(&api, &id).await?,
        Commands::Create { title, content } => client::run_create(&api, &title, &content).await?,
        Commands::Edit { id, title, content } => {
            client::run_edit(&api, &id, title, content).await?
        }
        Commands::Delete { id } => client::run_delete(&api, &id).await?,
        Commands::Summarize { id } => client::run_summarize(&api, &id).await?,
    }

    Ok(())
}
