//! CLI command definitions and dispatch.
//!
//! Each group of subcommands is implemented in its own submodule:
//! - `songs`: listing, renaming and junkizing songs
//! - `playlists`: listing playlists
//! - `tagging`: recognizing and fixing junk songs
//! - `import`: importing a local audio file
//! - `settings`: showing and saving the configuration

mod import;
mod playlists;
mod settings;
mod songs;
mod tagging;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::library::{Library, SongQuery};
use crate::metadata::LoftyTagStore;

pub use import::{ImportArgs, cmd_import};
pub use playlists::cmd_playlists;
pub use settings::cmd_config;
pub use songs::{cmd_junkize, cmd_list_songs, cmd_rename};
pub use tagging::cmd_tag_junks;

/// Song Minder CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository folder (defaults to the configured one)
    #[arg(short, long, global = true, env = "SONG_MINDER_REPOSITORY")]
    pub repo: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Song selection shared by the song commands
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Playlist position, identifier or URL
    #[arg(short, long)]
    pub playlist: Option<String>,

    /// Keywords to filter songs by artist and title
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// Minimum filter match level (0-100)
    #[arg(short, long = "match", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub match_level: Option<u8>,

    /// Pick a single song: 1-based position, negative from the end, 0 for random
    #[arg(short, long, allow_negative_numbers = true)]
    pub index: Option<i64>,
}

impl SelectionArgs {
    fn query(&self, config: &Config, junk_only: bool) -> SongQuery {
        SongQuery {
            playlist: self.playlist.clone(),
            junk_only,
            keywords: self.filter.clone(),
            threshold: f64::from(
                self.match_level
                    .unwrap_or(config.matching.filter_threshold),
            ),
        }
    }
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List songs
    Songs(SelectionArgs),
    /// List junk songs
    Junks(SelectionArgs),
    /// List playlists with their song counts
    Playlists,
    /// Drop the tags of songs and mark them as junk
    Junkize(SelectionArgs),
    /// Give songs their canonical filename
    Rename(SelectionArgs),
    /// Recognize junk songs and fix their tags, cover art and filename
    TagJunks {
        #[command(flatten)]
        selection: SelectionArgs,
        /// AcoustID API key (or set ACOUSTID_API_KEY env var)
        #[arg(short, long, env = "ACOUSTID_API_KEY")]
        api_key: Option<String>,
        /// Minimum recognition confidence (0-100) to accept a match
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: Option<u8>,
    },
    /// Import a local audio file as a song
    Import {
        /// Audio file to import
        audio: PathBuf,
        /// Song identity (source video id)
        #[arg(long)]
        id: String,
        /// Playlist position, identifier or URL
        #[arg(short, long)]
        playlist: String,
        /// Label of the playlist folder if it has to be created
        #[arg(long, default_value = "Imported")]
        name: String,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        title: Option<String>,
        /// Cover art URL
        #[arg(long)]
        cover: Option<String>,
        /// AcoustID API key (or set ACOUSTID_API_KEY env var)
        #[arg(short, long, env = "ACOUSTID_API_KEY")]
        api_key: Option<String>,
        /// Minimum recognition confidence (0-100) to accept a match
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: Option<u8>,
    },
    /// Show the effective configuration
    Config {
        /// Write it to the configuration file
        #[arg(long)]
        save: bool,
    },
}

/// Loaded configuration and the repository it points at.
pub struct Context {
    pub config: Config,
    pub library: Library,
}

impl Context {
    fn new(cli: &Cli) -> Self {
        let mut config = config::load();
        if let Some(repo) = &cli.repo {
            config.repository.path = repo.clone();
        }
        let library = Library::new(&config.repository.path, Arc::new(LoftyTagStore));
        Self { config, library }
    }
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let ctx = Context::new(cli);

    match &cli.command {
        Commands::Songs(selection) => cmd_list_songs(&ctx, selection, false),
        Commands::Junks(selection) => cmd_list_songs(&ctx, selection, true),
        Commands::Playlists => cmd_playlists(&ctx),
        Commands::Junkize(selection) => cmd_junkize(&ctx, selection),
        Commands::Rename(selection) => cmd_rename(&ctx, selection),
        Commands::TagJunks {
            selection,
            api_key,
            threshold,
        } => {
            let rt = Runtime::new()?;
            cmd_tag_junks(&rt, &ctx, selection, api_key.as_deref(), *threshold)
        }
        Commands::Import {
            audio,
            id,
            playlist,
            name,
            artist,
            title,
            cover,
            api_key,
            threshold,
        } => {
            let rt = Runtime::new()?;
            let args = ImportArgs {
                audio,
                id,
                playlist,
                playlist_name: name,
                artist: artist.as_deref(),
                title: title.as_deref(),
                cover_art_url: cover.as_deref(),
            };
            cmd_import(&rt, &ctx, &args, api_key.as_deref(), *threshold)
        }
        Commands::Config { save } => cmd_config(&ctx, *save),
    }
}
