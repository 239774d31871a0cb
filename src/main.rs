//! Song Minder - keeps a repository of downloaded songs tidy.
//!
//! Each song is an MP3 file whose name, tags and cover art are kept
//! consistent. Songs can be listed and filtered by keywords, recognized
//! through an audio fingerprint service, and renamed to their canonical
//! filename.

pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod importer;
pub mod library;
pub mod matching;
pub mod metadata;
pub mod model;
pub mod organizer;
pub mod scanner;
pub mod song;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("song_minder=info".parse()?))
        .init();

    cli::run_command(&args)
}
