//! Test utilities and fixtures for song-minder tests.
//!
//! This module provides a file-backed tag store double, a manual clock for
//! the recognition throttle, and fixture builders to reduce boilerplate.
//!
//! # Example
//!
//! ```ignore
//! use song_minder::test_utils::{JsonTagStore, fields, write_song};
//!
//! #[test]
//! fn test_something() {
//!     let dir = tempfile::tempdir().unwrap();
//!     let store = Arc::new(JsonTagStore::default());
//!     let path = write_song(dir.path(), "[XYZ].mp3", Some(fields("XYZ", None, None)));
//!     let song = Song::load(&path, store).unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::enrichment::{Clock, RecognitionThrottle};
use crate::error::{Error, Result};
use crate::metadata::{StoredTags, TagStore};
use crate::model::{SongFields, SongId};

/// What [`JsonTagStore`] keeps in a file body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TagFile {
    fields: Option<SongFields>,
    embedded_cover_url: Option<String>,
    has_front_cover: bool,
    duration_secs: u64,
}

/// Tag store double that serializes tags as JSON into the file body.
///
/// Tags live in the file itself, so renames carry them the way real tags
/// do. An empty file is an untagged song; anything that is not JSON is a
/// corrupt tag container.
#[derive(Debug, Default)]
pub struct JsonTagStore {
    saves: AtomicUsize,
}

impl JsonTagStore {
    fn read(path: &Path) -> Result<TagFile> {
        let body = std::fs::read_to_string(path)?;
        if body.trim().is_empty() {
            return Ok(TagFile::default());
        }
        serde_json::from_str(&body).map_err(|e| Error::tags(path, e.to_string()))
    }

    fn write(path: &Path, file: &TagFile) -> Result<()> {
        let body = serde_json::to_string(file).map_err(|e| Error::tags(path, e.to_string()))?;
        std::fs::write(path, body)?;
        Ok(())
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Fields currently stored in a file.
    pub fn stored(&self, path: &Path) -> Option<SongFields> {
        Self::read(path).ok().and_then(|f| f.fields)
    }

    /// Raw tags of a file. Panics on a corrupt file.
    pub fn load_tags(&self, path: &Path) -> StoredTags {
        self.load(path).expect("readable test tags")
    }

    pub fn set_duration(&self, path: &Path, duration: Duration) {
        let mut file = Self::read(path).expect("readable test tags");
        file.duration_secs = duration.as_secs();
        Self::write(path, &file).expect("writable test tags");
    }
}

impl TagStore for JsonTagStore {
    fn load(&self, path: &Path) -> Result<StoredTags> {
        let file = Self::read(path)?;
        let duration = Duration::from_secs(file.duration_secs);
        let Some(fields) = file.fields else {
            return Ok(StoredTags {
                duration,
                has_front_cover: file.has_front_cover,
                embedded_cover_url: file.embedded_cover_url,
                ..Default::default()
            });
        };
        Ok(StoredTags {
            id: Some(fields.id),
            artist: fields.artist,
            title: fields.title,
            cover_art_url: fields.cover_art_url,
            shazam_artist: fields.shazam_artist,
            shazam_title: fields.shazam_title,
            shazam_cover_art_url: fields.shazam_cover_art_url,
            shazam_match_score: fields.shazam_match_score,
            embedded_cover_url: file.embedded_cover_url,
            has_front_cover: file.has_front_cover,
            duration,
        })
    }

    fn save(&self, path: &Path, fields: &SongFields) -> Result<()> {
        let mut file = Self::read(path)?;
        file.fields = Some(fields.clone());
        Self::write(path, &file)?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn embed_cover(&self, path: &Path, image: &[u8], url: &str) -> Result<()> {
        if image.is_empty() {
            return Err(Error::tags(path, "Unsupported cover image"));
        }
        let mut file = Self::read(path)?;
        file.has_front_cover = true;
        file.embedded_cover_url = Some(url.to_string());
        Self::write(path, &file)
    }

    fn remove_cover(&self, path: &Path) -> Result<()> {
        let mut file = Self::read(path)?;
        file.has_front_cover = false;
        file.embedded_cover_url = None;
        Self::write(path, &file)
    }
}

/// Song fields with an identity and optional labels.
pub fn fields(id: &str, artist: Option<&str>, title: Option<&str>) -> SongFields {
    let mut fields = SongFields::bare(SongId::new(id).expect("valid test identity"));
    fields.artist = artist.map(String::from);
    fields.title = title.map(String::from);
    fields
}

/// Create a song file for [`JsonTagStore`]; `None` leaves it untagged.
pub fn write_song(dir: &Path, filename: &str, fields: Option<SongFields>) -> PathBuf {
    let path = dir.join(filename);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create song folder");
    }
    let body = match fields {
        Some(fields) => serde_json::to_string(&TagFile {
            fields: Some(fields),
            ..Default::default()
        })
        .expect("serializable test tags"),
        None => String::new(),
    };
    std::fs::write(&path, body).expect("Failed to write song file");
    path
}

/// Throttle that never waits.
pub fn instant_throttle() -> RecognitionThrottle {
    RecognitionThrottle::with_clock(Duration::ZERO, Duration::ZERO, Arc::new(ManualClock::new()))
}

/// Clock that only moves when told to. Sleeping advances it.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *self.now.lock() += duration;
    }

    /// Every sleep requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = JsonTagStore::default();
        let path = write_song(dir.path(), "[XYZ].mp3", None);

        assert_eq!(store.load(&path).unwrap(), StoredTags::default());

        store.save(&path, &fields("XYZ", Some("A"), None)).unwrap();
        store.embed_cover(&path, b"img", "https://img").unwrap();
        let tags = store.load(&path).unwrap();
        assert_eq!(tags.artist.as_deref(), Some("A"));
        assert!(tags.has_front_cover);
        assert_eq!(tags.embedded_cover_url.as_deref(), Some("https://img"));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_manual_clock_sleep_advances() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.sleep(Duration::from_secs(5)).await;
        assert_eq!(clock.now() - start, Duration::from_secs(5));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
    }
}
