//! Batch tagging of junk songs.
//!
//! Each junk song is recognized (when it never was), gets its cover art
//! refreshed, and is renamed: clean when recognition was confident and both
//! labels are known, junk otherwise. One bad song never stops the batch; it
//! is logged and reported.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::enrichment::TaggingServices;
use crate::error::{Error, Result};
use crate::metadata::TagStore;
use crate::song::Song;

/// Cooperative cancellation, checked between two songs.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened to each song of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Renamed as clean songs
    pub fixed: Vec<PathBuf>,
    /// Still flagged as junk after processing
    pub still_junk: Vec<PathBuf>,
    /// Songs that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.fixed.len() + self.still_junk.len() + self.failed.len()
    }
}

/// Tag every song of `paths`.
///
/// Returns [`Error::Cancelled`] when `cancel` is raised; songs already
/// processed keep their new state.
pub async fn tag_junk_songs(
    paths: &[PathBuf],
    store: Arc<dyn TagStore>,
    services: TaggingServices<'_>,
    cancel: &CancelFlag,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for (position, path) in paths.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(processed = position, total = paths.len(), "Junk tagging cancelled");
            return Err(Error::Cancelled);
        }

        match tag_song(path, store.clone(), services).await {
            Ok(song) if song.is_junk() => report.still_junk.push(song.path().to_path_buf()),
            Ok(song) => report.fixed.push(song.path().to_path_buf()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping song");
                report.failed.push((path.clone(), e.to_string()));
            }
        }
    }

    info!(
        fixed = report.fixed.len(),
        still_junk = report.still_junk.len(),
        failed = report.failed.len(),
        "Junk tagging done"
    );
    Ok(report)
}

/// Recognize, refresh cover art and rename one song.
///
/// A cover art failure is logged and does not prevent the rename.
pub async fn tag_song(
    path: &Path,
    store: Arc<dyn TagStore>,
    services: TaggingServices<'_>,
) -> Result<Song> {
    let mut song = Song::load(path, store)?;

    if song.status().should_be_shazamed {
        song.recognize(services.recognizer, services.throttle, services.match_threshold)
            .await?;
    }

    if let Err(e) = song.update_cover_art(services.cover_art).await {
        warn!(path = %song.path().display(), error = %e, "Cover art not updated");
    }

    let confident = song
        .shazam_match_score()
        .is_some_and(|score| score >= services.match_threshold);
    song.fix_filename(Some(!confident || song.status().should_be_tagged))?;
    Ok(song)
}
