//! Song file discovery.
//!
//! Walks a folder tree and yields the files that look like songs: the
//! `.mp3` extension and an identity in brackets. Anything else is not a song
//! file and is skipped without complaint.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::organizer;

/// Which song files to enumerate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanFilter {
    #[default]
    All,
    /// Only files carrying the junk marker
    JunkOnly,
}

/// Scans `root` recursively for song files.
///
/// Results come in filesystem walk order; callers sort them. Unreadable
/// entries are logged and skipped.
pub fn scan(root: &Path, filter: ScanFilter) -> Vec<PathBuf> {
    let mut songs = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(target: "scanner", error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(filename) = entry.file_name().to_str() else {
            continue;
        };
        if is_song_file(filename, filter) {
            songs.push(entry.into_path());
        }
    }

    debug!(target: "scanner", root = %root.display(), count = songs.len(), "Scanned song files");
    songs
}

/// Whether a filename names a song file passing `filter`.
pub fn is_song_file(filename: &str, filter: ScanFilter) -> bool {
    if !organizer::is_song_filename(filename) {
        return false;
    }
    if filter == ScanFilter::JunkOnly && !organizer::is_junk_filename(filename) {
        return false;
    }
    organizer::decode(filename).is_some()
}
