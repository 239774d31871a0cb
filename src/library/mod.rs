//! Repository queries.
//!
//! The repository is a folder of playlist folders holding song files. A
//! [`Library`] resolves playlists, enumerates songs and filters them by
//! keyword relevance.
//!
//! Songs that fail to load while listing are logged and left out; only
//! errors affecting the whole query (bad playlist designation, unreadable
//! repository) are returned.

pub mod batch;
pub mod playlist;
pub mod sort;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, warn};

pub use batch::{BatchReport, CancelFlag, tag_junk_songs};
pub use playlist::{Playlist, PlaylistRef, PlaylistSelector, PlaylistStats};

use crate::error::{RepositoryError, Result};
use crate::matching;
use crate::metadata::TagStore;
use crate::scanner::{self, ScanFilter};
use crate::song::Song;

/// Criteria for listing songs.
#[derive(Debug, Clone, PartialEq)]
pub struct SongQuery {
    /// Playlist position, identifier or URL; `None` searches the whole repository
    pub playlist: Option<String>,
    pub junk_only: bool,
    /// Whitespace-separated keywords; empty matches everything
    pub keywords: String,
    /// Minimum normalized relevance (0-100)
    pub threshold: f64,
}

impl Default for SongQuery {
    fn default() -> Self {
        Self {
            playlist: None,
            junk_only: false,
            keywords: String::new(),
            threshold: 45.0,
        }
    }
}

/// A song repository on disk.
#[derive(Clone)]
pub struct Library {
    root: PathBuf,
    store: Arc<dyn TagStore>,
}

impl Library {
    pub fn new(root: impl Into<PathBuf>, store: Arc<dyn TagStore>) -> Self {
        Self {
            root: root.into(),
            store,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> Arc<dyn TagStore> {
        self.store.clone()
    }

    /// Every playlist with its song counts, in deterministic order.
    pub fn playlists(&self) -> Result<Vec<PlaylistStats>> {
        let playlists = playlist::list(&self.root)?;
        Ok(playlists
            .into_iter()
            .map(|playlist| {
                let total = scanner::scan(&playlist.path, ScanFilter::All).len();
                let junk = scanner::scan(&playlist.path, ScanFilter::JunkOnly).len();
                PlaylistStats {
                    playlist,
                    total,
                    junk,
                }
            })
            .collect())
    }

    /// Resolve a playlist position, identifier or URL.
    pub fn resolve_playlist(&self, identifier: &str, must_exist: bool) -> Result<PlaylistRef> {
        playlist::resolve(&self.root, identifier, must_exist)
    }

    /// Songs matching `query`, best first.
    ///
    /// Without keywords songs are in natural `"artist - title"` order.
    /// With keywords they are ordered by normalized relevance and those
    /// below the threshold are dropped.
    pub fn find_songs(&self, query: &SongQuery) -> Result<Vec<Song>> {
        let search_root = match &query.playlist {
            Some(identifier) => self
                .resolve_playlist(identifier, true)?
                .playlist
                .map(|p| p.path)
                .ok_or_else(|| RepositoryError::NotFound(identifier.clone()))?,
            None => self.root.clone(),
        };

        let filter = if query.junk_only {
            ScanFilter::JunkOnly
        } else {
            ScanFilter::All
        };
        let mut songs = self.load_songs(scanner::scan(&search_root, filter));

        if query.keywords.trim().is_empty() {
            sort::sort_songs(&mut songs);
            return Ok(songs);
        }

        let scored: Vec<(Song, f64)> = songs
            .into_iter()
            .map(|song| {
                let score = matching::score(song.artist(), song.title(), &query.keywords);
                (song, score)
            })
            .collect();
        let ranked = matching::normalize(scored, query.threshold);
        debug!(keywords = %query.keywords, matches = ranked.len(), "Filtered songs");
        Ok(ranked.into_iter().map(|(song, _)| song).collect())
    }

    /// Songs matching `query`, narrowed to one when `index` is given.
    ///
    /// `index` is 1-based; negative values count from the end and `0` picks
    /// a song at random. Finding no song at all is an error.
    pub fn select_songs(&self, query: &SongQuery, index: Option<i64>) -> Result<Vec<Song>> {
        let mut songs = self.find_songs(query)?;
        if songs.is_empty() {
            return Err(RepositoryError::NoSongs.into());
        }
        let Some(index) = index else {
            return Ok(songs);
        };

        let count = songs.len();
        let position = match index {
            0 => rand::rng().random_range(0..count),
            i if i > 0 && i.unsigned_abs() as usize <= count => (i - 1) as usize,
            i if i < 0 && i.unsigned_abs() as usize <= count => count - i.unsigned_abs() as usize,
            _ => return Err(RepositoryError::SongIndexOutOfRange { index, count }.into()),
        };
        Ok(vec![songs.swap_remove(position)])
    }

    /// Load songs, logging and skipping those that fail.
    fn load_songs(&self, paths: Vec<PathBuf>) -> Vec<Song> {
        paths
            .into_iter()
            .filter_map(|path| match Song::load(&path, self.store.clone()) {
                Ok(song) => Some(song),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping song");
                    None
                }
            })
            .collect()
    }
}
