//! Importing a single video as a song.
//!
//! The audio stream is downloaded next to its destination, transcoded to
//! `temp (JUNK).mp3`, and loaded with the video's metadata as overrides.
//! The song then goes through the same tagging steps as a junk song: cover
//! art, recognition, cover art again (recognition may have replaced the
//! reference), and a final rename that keeps the junk marker unless the
//! recognition was confident.

pub mod local;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::enrichment::traits::Progress;
use crate::enrichment::{AudioTranscoder, TaggingServices, VideoMetadataSource};
use crate::error::{Error, Result, ResultExt};
use crate::metadata::TagStore;
use crate::model::{SongId, SongOverrides};
use crate::organizer;
use crate::scanner::{self, ScanFilter};
use crate::song::Song;

pub use local::LocalAudioSource;

/// Name of the transcoded file before it gets its canonical name.
pub const TEMP_FILENAME: &str = "temp (JUNK).mp3";

/// What [`import_song`] did.
#[derive(Debug)]
pub enum ImportOutcome {
    Imported(Song),
    /// The destination already holds a song with this identity
    AlreadyPresent(PathBuf),
}

/// Collaborators fetching and converting the audio.
#[derive(Clone, Copy)]
pub struct ImportSources<'a> {
    pub video: &'a dyn VideoMetadataSource,
    pub transcoder: &'a dyn AudioTranscoder,
}

/// Existing song file with identity `id` in `dir`, if any.
pub fn find_existing(dir: &Path, id: &SongId) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }
    scanner::scan(dir, ScanFilter::All).into_iter().find(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(organizer::extract_id)
            .is_some_and(|found| &found == id)
    })
}

/// Import video `id` into `dest_dir`.
///
/// Video and transcoding failures are [`Error::Import`]. Once the file
/// exists, cover art and recognition failures are logged and the song is
/// kept as junk.
pub async fn import_song(
    id: &SongId,
    dest_dir: &Path,
    store: Arc<dyn TagStore>,
    sources: ImportSources<'_>,
    services: TaggingServices<'_>,
    progress: Progress<'_>,
) -> Result<ImportOutcome> {
    if let Some(existing) = find_existing(dest_dir, id) {
        debug!(id = %id, path = %existing.display(), "Song already imported");
        return Ok(ImportOutcome::AlreadyPresent(existing));
    }

    let video = sources.video.lookup(id).await.map_err(Error::Import)?;
    fs::create_dir_all(dest_dir)
        .with_context(format!("Failed to create playlist folder {}", dest_dir.display()))?;

    let stream = dest_dir.join(format!(".{id}.part"));
    let mp3 = dest_dir.join(TEMP_FILENAME);
    let converted = download_and_transcode(id, &stream, &mp3, sources, progress).await;
    if let Err(e) = fs::remove_file(&stream) {
        debug!(path = %stream.display(), error = %e, "No audio stream to clean up");
    }
    converted?;

    let overrides = SongOverrides {
        id: Some(video.id.clone()),
        artist: video.author.clone(),
        title: video.title.clone(),
        cover_art_url: video.thumbnail_url.clone(),
        shazam_match_score: None,
    };
    let mut song = Song::load_with(&mp3, store, overrides)?;

    refresh_cover_art(&mut song, services).await;
    if let Err(e) = song
        .recognize(services.recognizer, services.throttle, services.match_threshold)
        .await
    {
        warn!(id = %id, error = %e, "Recognition failed, keeping video metadata");
    }
    refresh_cover_art(&mut song, services).await;

    let confident = song
        .shazam_match_score()
        .is_some_and(|score| score >= services.match_threshold);
    song.fix_filename(Some(!confident))?;

    info!(id = %id, filename = %song.filename(), junk = song.is_junk(), "Imported song");
    Ok(ImportOutcome::Imported(song))
}

async fn download_and_transcode(
    id: &SongId,
    stream: &Path,
    mp3: &Path,
    sources: ImportSources<'_>,
    progress: Progress<'_>,
) -> Result<()> {
    sources
        .video
        .download_audio(id, stream)
        .await
        .map_err(Error::Import)?;
    sources
        .transcoder
        .transcode(stream, mp3, progress)
        .await
        .map_err(Error::Import)
}

async fn refresh_cover_art(song: &mut Song, services: TaggingServices<'_>) {
    if let Err(e) = song.update_cover_art(services.cover_art).await {
        warn!(path = %song.path().display(), error = %e, "Cover art not updated");
    }
}
