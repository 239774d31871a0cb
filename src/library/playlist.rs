//! Playlist folders and identifier resolution.
//!
//! A playlist is a folder of the repository root named `Label [identifier]`.
//! Callers designate one by its 1-based position in the sorted folder list,
//! by its bare identifier, or by a playlist URL.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::sort;
use crate::error::{RepositoryError, Result};
use crate::organizer;

/// A playlist folder found in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    /// Human label, the folder name without its identifier
    pub label: String,
    /// Folder name
    pub folder: String,
    pub path: PathBuf,
}

impl Playlist {
    /// Build a playlist from a folder path, if its name has the right shape.
    pub fn from_path(path: &Path) -> Option<Self> {
        let folder = path.file_name()?.to_str()?.to_string();
        if !folder.ends_with(']') {
            return None;
        }
        let id = organizer::extract_id(&folder)?.to_string();
        let label = folder
            .strip_suffix(&format!("[{id}]"))
            .unwrap_or_default()
            .trim()
            .to_string();
        Some(Self {
            id,
            label,
            folder,
            path: path.to_path_buf(),
        })
    }

    pub fn url(&self) -> String {
        playlist_url(&self.id)
    }
}

/// Outcome of resolving a playlist identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: String,
    pub url: String,
    /// The matching folder, `None` when the playlist is not in the repository
    pub playlist: Option<Playlist>,
}

impl PlaylistRef {
    pub fn exists(&self) -> bool {
        self.playlist.is_some()
    }
}

/// Song counts of a playlist folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistStats {
    pub playlist: Playlist,
    pub total: usize,
    pub junk: usize,
}

impl PlaylistStats {
    /// Songs not flagged as junk.
    pub fn clean(&self) -> usize {
        self.total - self.junk
    }
}

/// How a caller designated a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSelector {
    /// 1-based position in the sorted folder list
    Index(usize),
    Id(String),
}

impl PlaylistSelector {
    /// Parse a position, a bare identifier, or a URL with a `list=` parameter.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            let index = raw
                .parse()
                .map_err(|_| RepositoryError::InvalidIdentifier(raw.to_string()))?;
            return Ok(Self::Index(index));
        }

        let id = match raw.find("list=") {
            Some(start) => raw[start + "list=".len()..]
                .split(['&', '#'])
                .next()
                .unwrap_or_default(),
            None => raw,
        };
        if !is_valid_id(id) {
            return Err(RepositoryError::InvalidIdentifier(raw.to_string()).into());
        }
        Ok(Self::Id(id.to_string()))
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Page of a playlist on the video platform.
pub fn playlist_url(id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={id}")
}

/// Every playlist folder directly under `root`, in deterministic order.
pub fn list(root: &Path) -> Result<Vec<Playlist>> {
    let mut playlists = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(playlist) = Playlist::from_path(&entry.path()) {
            playlists.push(playlist);
        }
    }
    playlists.sort_by(|a, b| sort::folder_cmp(&a.folder, &b.folder));
    Ok(playlists)
}

/// Resolve a playlist designation against the folders under `root`.
///
/// An identifier matches every folder whose name contains it. More than one
/// match is an error. No match is an error only when `must_exist` is set;
/// otherwise the returned reference has no folder.
pub fn resolve(root: &Path, raw: &str, must_exist: bool) -> Result<PlaylistRef> {
    let playlists = list(root)?;

    let id = match PlaylistSelector::parse(raw)? {
        PlaylistSelector::Index(index) => {
            let count = playlists.len();
            let playlist = index
                .checked_sub(1)
                .and_then(|i| playlists.into_iter().nth(i))
                .ok_or(RepositoryError::IndexOutOfRange { index, count })?;
            return Ok(PlaylistRef {
                id: playlist.id.clone(),
                url: playlist.url(),
                playlist: Some(playlist),
            });
        }
        PlaylistSelector::Id(id) => id,
    };

    let mut matches: Vec<Playlist> = playlists
        .into_iter()
        .filter(|p| p.folder.contains(&id))
        .collect();

    if matches.len() > 1 {
        return Err(RepositoryError::Ambiguous(id).into());
    }
    let playlist = matches.pop();
    if playlist.is_none() && must_exist {
        return Err(RepositoryError::NotFound(id).into());
    }

    debug!(id = %id, exists = playlist.is_some(), "Resolved playlist");
    Ok(PlaylistRef {
        url: playlist_url(&id),
        id,
        playlist,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn repo(folders: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for folder in folders {
            fs::create_dir(dir.path().join(folder)).unwrap();
        }
        fs::write(dir.path().join("stray [FILE1].txt"), "").unwrap();
        dir
    }

    #[test]
    fn test_parse_selector() {
        assert_eq!(PlaylistSelector::parse("3").unwrap(), PlaylistSelector::Index(3));
        assert_eq!(
            PlaylistSelector::parse("PLabc-_12").unwrap(),
            PlaylistSelector::Id("PLabc-_12".to_string())
        );
        assert_eq!(
            PlaylistSelector::parse("https://www.youtube.com/playlist?list=PLxyz&index=2").unwrap(),
            PlaylistSelector::Id("PLxyz".to_string())
        );
        assert_eq!(
            PlaylistSelector::parse("https://www.youtube.com/watch?v=abc&list=PLxyz").unwrap(),
            PlaylistSelector::Id("PLxyz".to_string())
        );
        assert!(matches!(
            PlaylistSelector::parse("not an id"),
            Err(Error::Repository(RepositoryError::InvalidIdentifier(_)))
        ));
        assert!(PlaylistSelector::parse("").is_err());
    }

    #[test]
    fn test_playlist_from_folder_name() {
        let playlist = Playlist::from_path(Path::new("/repo/Road Trip [PL123]")).unwrap();
        assert_eq!(playlist.id, "PL123");
        assert_eq!(playlist.label, "Road Trip");
        assert_eq!(playlist.url(), "https://www.youtube.com/playlist?list=PL123");

        assert!(Playlist::from_path(Path::new("/repo/Loose songs")).is_none());
        assert!(Playlist::from_path(Path::new("/repo/Mix [PL1] old")).is_none());
    }

    #[test]
    fn test_list_is_sorted_and_skips_files() {
        let dir = repo(&["zebra [PL3]", "Alpha [PL1]", "misc"]);
        let folders: Vec<String> = list(dir.path()).unwrap().into_iter().map(|p| p.folder).collect();
        assert_eq!(folders, vec!["Alpha [PL1]", "zebra [PL3]"]);
    }

    #[test]
    fn test_resolve_by_index() {
        let dir = repo(&["zebra [PL3]", "Alpha [PL1]"]);

        let resolved = resolve(dir.path(), "2", true).unwrap();
        assert_eq!(resolved.id, "PL3");
        assert!(resolved.exists());

        assert!(matches!(
            resolve(dir.path(), "3", true),
            Err(Error::Repository(RepositoryError::IndexOutOfRange { index: 3, count: 2 }))
        ));
        assert!(matches!(
            resolve(dir.path(), "0", true),
            Err(Error::Repository(RepositoryError::IndexOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_resolve_by_id_and_url() {
        let dir = repo(&["Road Trip [PL123]", "Chill [PL9]"]);

        let by_id = resolve(dir.path(), "PL9", true).unwrap();
        assert_eq!(by_id.playlist.unwrap().label, "Chill");

        let by_url = resolve(dir.path(), "https://youtube.com/playlist?list=PL123", true).unwrap();
        assert_eq!(by_url.playlist.unwrap().folder, "Road Trip [PL123]");
    }

    #[test]
    fn test_resolve_ambiguous_identifier() {
        let dir = repo(&["Road Trip [PL123]", "Road Trip copy [PL1234]"]);

        assert!(matches!(
            resolve(dir.path(), "PL123", false),
            Err(Error::Repository(RepositoryError::Ambiguous(id))) if id == "PL123"
        ));
    }

    #[test]
    fn test_resolve_missing_playlist() {
        let dir = repo(&["Chill [PL9]"]);

        assert!(matches!(
            resolve(dir.path(), "PLnew", true),
            Err(Error::Repository(RepositoryError::NotFound(_)))
        ));

        let pending = resolve(dir.path(), "PLnew", false).unwrap();
        assert!(!pending.exists());
        assert_eq!(pending.url, "https://www.youtube.com/playlist?list=PLnew");
    }
}
