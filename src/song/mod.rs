//! Song entity: one MP3 file, its tags and its name kept consistent.
//!
//! A [`Song`] is a snapshot derived by [`resolver::reconcile`] from the tag
//! container, the filename and optional overrides. Mutators never patch the
//! snapshot: they write the new fields to the tag container (or rename the
//! file) and derive a fresh snapshot from disk, so the status flags can never
//! drift from what is persisted.
//!
//! Failed operations leave the song as it was.

mod cover;
pub mod recognition;
pub mod resolver;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

pub use cover::CoverArtOutcome;
pub use resolver::{SongState, reconcile};

use crate::enrichment::{RecognitionThrottle, SongRecognizer};
use crate::error::{Error, Result};
use crate::metadata::TagStore;
use crate::model::{SongChanges, SongFields, SongId, SongOverrides, SongStatus};
use crate::organizer;

/// A song file of the repository.
#[derive(Clone)]
pub struct Song {
    path: PathBuf,
    state: SongState,
    store: Arc<dyn TagStore>,
}

impl std::fmt::Debug for Song {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Song")
            .field("path", &self.path)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Song {
    /// Load a song from its file.
    pub fn load(path: impl AsRef<Path>, store: Arc<dyn TagStore>) -> Result<Self> {
        Self::load_with(path, store, SongOverrides::default())
    }

    /// Load a song, letting `overrides` take precedence over tags and filename.
    ///
    /// Tags are written back when they differ from the derived fields, which
    /// covers files that were never tagged.
    pub fn load_with(
        path: impl AsRef<Path>,
        store: Arc<dyn TagStore>,
        overrides: SongOverrides,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let tags = store.load(&path)?;
        let state = resolver::reconcile(&path, &tags, &overrides)?;

        if resolver::persisted_fields(&tags).as_ref() != Some(&state.fields) {
            debug!(path = %path.display(), id = %state.fields.id, "Writing tags");
            store.save(&path, &state.fields)?;
        }

        Ok(Self { path, state, store })
    }

    /// Derive a fresh snapshot from disk.
    fn reload(&mut self) -> Result<()> {
        *self = Self::load(&self.path, self.store.clone())?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    pub fn fields(&self) -> &SongFields {
        &self.state.fields
    }

    pub fn id(&self) -> &SongId {
        &self.state.fields.id
    }

    pub fn artist(&self) -> Option<&str> {
        self.state.fields.artist.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.state.fields.title.as_deref()
    }

    pub fn cover_art_url(&self) -> Option<&str> {
        self.state.fields.cover_art_url.as_deref()
    }

    pub fn shazam_match_score(&self) -> Option<u8> {
        self.state.fields.shazam_match_score
    }

    pub fn status(&self) -> SongStatus {
        self.state.status
    }

    pub fn is_junk(&self) -> bool {
        self.state.junk
    }

    /// Whether an embedded front cover was found in the tags.
    pub fn has_cover_art(&self) -> bool {
        self.state.has_cover_art
    }

    pub fn duration(&self) -> Duration {
        self.state.duration
    }

    /// Duration as `HH:MM:SS`.
    pub fn duration_label(&self) -> String {
        let secs = self.state.duration.as_secs_f64().round() as u64;
        format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
    }

    /// Name of the playlist folder holding the song.
    pub fn playlist(&self) -> Option<&str> {
        self.path
            .parent()
            .and_then(|dir| dir.file_name())
            .and_then(|name| name.to_str())
    }

    /// Page of the source video.
    pub fn video_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id())
    }

    /// `"artist - title"`, with blanks for missing labels.
    pub fn song_name(&self) -> String {
        format!(
            "{} - {}",
            self.artist().unwrap_or_default(),
            self.title().unwrap_or_default()
        )
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Apply field changes, persist them and reload.
    pub fn update(&mut self, changes: &SongChanges) -> Result<()> {
        let fields = changes.apply_to(&self.state.fields);
        if fields == self.state.fields {
            return Ok(());
        }
        self.store.save(&self.path, &fields)?;
        self.reload()
    }

    /// Clear every field except the identity.
    pub fn reset_state(&mut self) -> Result<()> {
        self.update(&SongChanges::clear_all())
    }

    /// Rename the file to its canonical name.
    ///
    /// `junk` of `None` keeps the current junk flag. A song missing a label
    /// is always named as junk.
    pub fn fix_filename(&mut self, junk: Option<bool>) -> Result<()> {
        let junk = self.state.status.should_be_tagged || junk.unwrap_or(self.state.junk);
        let filename = organizer::expected_filename(&self.state.fields, junk);
        let new_path = organizer::rename_song_file(&self.path, &filename)?;
        if new_path != self.path {
            info!(from = %self.filename(), to = %filename, "Renamed song");
        }
        self.path = new_path;
        self.reload()
    }

    /// Drop all tags but the identity and mark the file as junk.
    pub fn junkize(&mut self) -> Result<()> {
        self.reset_state()?;
        self.fix_filename(None)
    }

    /// Submit the song to the recognition service and ingest the answer.
    ///
    /// Service failures surface as [`Error::Recognition`] and leave the song
    /// untouched.
    pub async fn recognize(
        &mut self,
        recognizer: &dyn SongRecognizer,
        throttle: &RecognitionThrottle,
        threshold: u8,
    ) -> Result<()> {
        let path = self.path.clone();
        let candidate = throttle
            .call(|| recognizer.recognize(&path))
            .await
            .map_err(Error::Recognition)?;

        debug!(
            path = %self.path.display(),
            found = candidate.is_some(),
            "Recognition answered"
        );
        let changes =
            recognition::recognition_changes(&self.state.fields, candidate.as_ref(), threshold);
        self.update(&changes)
    }
}
