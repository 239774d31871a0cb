//! Local audio import command.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, anyhow};
use tokio::runtime::Runtime;

use super::Context;
use super::tagging::{acoustid_recognizer, display_name};
use crate::enrichment::{
    FfmpegTranscoder, HttpCoverArtFetcher, RecognitionThrottle, TaggingServices, VideoInfo,
};
use crate::importer::{self, ImportOutcome, ImportSources, LocalAudioSource};
use crate::model::SongId;

/// Song metadata given on the command line.
pub struct ImportArgs<'a> {
    pub audio: &'a Path,
    pub id: &'a str,
    pub playlist: &'a str,
    /// Label of the playlist folder when it does not exist yet
    pub playlist_name: &'a str,
    pub artist: Option<&'a str>,
    pub title: Option<&'a str>,
    pub cover_art_url: Option<&'a str>,
}

/// Folder of the playlist, named `Label [identifier]` when new.
fn playlist_folder(ctx: &Context, playlist: &str, name: &str) -> anyhow::Result<PathBuf> {
    let resolved = ctx.library.resolve_playlist(playlist, false)?;
    Ok(match resolved.playlist {
        Some(existing) => existing.path,
        None => ctx
            .library
            .root()
            .join(format!("{} [{}]", name.trim(), resolved.id)),
    })
}

/// Import a local audio file as a song of a playlist.
pub fn cmd_import(
    rt: &Runtime,
    ctx: &Context,
    args: &ImportArgs<'_>,
    api_key: Option<&str>,
    threshold: Option<u8>,
) -> anyhow::Result<()> {
    let id = SongId::new(args.id).ok_or_else(|| anyhow!("Invalid song identity: {:?}", args.id))?;
    let dest = playlist_folder(ctx, args.playlist, args.playlist_name)?;

    let source = LocalAudioSource::new(
        VideoInfo {
            id: id.clone(),
            author: args.artist.map(String::from),
            title: args.title.map(String::from),
            thumbnail_url: args.cover_art_url.map(String::from),
        },
        args.audio,
    );
    let transcoder = FfmpegTranscoder::default();
    let recognizer = acoustid_recognizer(ctx, api_key)?;
    let cover_art = HttpCoverArtFetcher::new().context("Failed to create HTTP client")?;
    let throttle = RecognitionThrottle::from_config(&ctx.config.recognition);
    let services = TaggingServices {
        recognizer: &recognizer,
        throttle: &throttle,
        cover_art: &cover_art,
        match_threshold: threshold.unwrap_or(ctx.config.recognition.match_threshold),
    };
    let sources = ImportSources {
        video: &source,
        transcoder: &transcoder,
    };

    let progress = |fraction: f32| {
        print!("\rEncoding: {:>3.0}%", fraction * 100.0);
        let _ = std::io::stdout().flush();
    };
    let outcome = rt.block_on(importer::import_song(
        &id,
        &dest,
        ctx.library.store(),
        sources,
        services,
        &progress,
    ));
    println!();

    match outcome? {
        ImportOutcome::Imported(song) => {
            println!("Imported: {}", song.filename());
            if let Some(score) = song.shazam_match_score() {
                println!("Match:    {score}%");
            }
        }
        ImportOutcome::AlreadyPresent(path) => {
            println!("Already in playlist: {}", display_name(&path));
        }
    }
    Ok(())
}
