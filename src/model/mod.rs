//! Core data model for songs in the repository.
//!
//! Defines the song identity, the authoritative field set persisted in the
//! tag container, the tri-state [`FieldUpdate`] used by mutations, and the
//! derived [`SongStatus`] flags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque external identifier of a song (the source video id).
///
/// Always non-empty, trimmed, and free of the bracket characters used by the
/// filename grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SongId(String);

impl SongId {
    /// Build an identity from raw text, rejecting values that could not
    /// survive a trip through a filename.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let raw = raw.as_ref().trim();
        let valid = !raw.is_empty()
            && !raw
                .chars()
                .any(|c| matches!(c, '[' | ']' | '/' | '\\') || c.is_control());
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SongId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SongId::new(&value).ok_or_else(|| format!("invalid song identity: {value:?}"))
    }
}

impl From<SongId> for String {
    fn from(id: SongId) -> Self {
        id.0
    }
}

/// How a single field changes in an update.
///
/// `Clear` and `Unchanged` are distinct: clearing writes an empty value,
/// leaving a field unchanged keeps whatever the song currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Unchanged,
    Clear,
    Set(T),
}

impl<T: Clone> FieldUpdate<T> {
    /// Apply the update to the current value of a field.
    pub fn apply(&self, current: Option<T>) -> Option<T> {
        match self {
            FieldUpdate::Unchanged => current,
            FieldUpdate::Clear => None,
            FieldUpdate::Set(value) => Some(value.clone()),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// `Some` sets the value, `None` clears it.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldUpdate::Set(v),
            None => FieldUpdate::Clear,
        }
    }
}

/// Authoritative song fields, as persisted in the tag container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongFields {
    pub id: SongId,
    /// Working artist
    pub artist: Option<String>,
    /// Working title
    pub title: Option<String>,
    /// Working cover art reference
    pub cover_art_url: Option<String>,
    /// Artist from the last recognition attempt
    pub shazam_artist: Option<String>,
    /// Title from the last recognition attempt
    pub shazam_title: Option<String>,
    /// Cover art reference from the last recognition attempt
    pub shazam_cover_art_url: Option<String>,
    /// `None`: never attempted. `Some(0)`: attempted, no match.
    pub shazam_match_score: Option<u8>,
}

impl SongFields {
    /// Fields for a song that only has its identity.
    pub fn bare(id: SongId) -> Self {
        Self {
            id,
            artist: None,
            title: None,
            cover_art_url: None,
            shazam_artist: None,
            shazam_title: None,
            shazam_cover_art_url: None,
            shazam_match_score: None,
        }
    }
}

/// Field deltas applied by `Song::update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongChanges {
    pub artist: FieldUpdate<String>,
    pub title: FieldUpdate<String>,
    pub cover_art_url: FieldUpdate<String>,
    pub shazam_artist: FieldUpdate<String>,
    pub shazam_title: FieldUpdate<String>,
    pub shazam_cover_art_url: FieldUpdate<String>,
    pub shazam_match_score: FieldUpdate<u8>,
}

impl SongChanges {
    /// Changes that clear every field except the identity.
    pub fn clear_all() -> Self {
        Self {
            artist: FieldUpdate::Clear,
            title: FieldUpdate::Clear,
            cover_art_url: FieldUpdate::Clear,
            shazam_artist: FieldUpdate::Clear,
            shazam_title: FieldUpdate::Clear,
            shazam_cover_art_url: FieldUpdate::Clear,
            shazam_match_score: FieldUpdate::Clear,
        }
    }

    /// Produce the new field set. Text values are label-normalized so an
    /// update can never store something a reload would read differently.
    pub fn apply_to(&self, fields: &SongFields) -> SongFields {
        SongFields {
            id: fields.id.clone(),
            artist: normalized(self.artist.apply(fields.artist.clone())),
            title: normalized(self.title.apply(fields.title.clone())),
            cover_art_url: trimmed(self.cover_art_url.apply(fields.cover_art_url.clone())),
            shazam_artist: normalized(self.shazam_artist.apply(fields.shazam_artist.clone())),
            shazam_title: normalized(self.shazam_title.apply(fields.shazam_title.clone())),
            shazam_cover_art_url: trimmed(
                self.shazam_cover_art_url
                    .apply(fields.shazam_cover_art_url.clone()),
            ),
            shazam_match_score: self.shazam_match_score.apply(fields.shazam_match_score),
        }
    }
}

/// Caller-supplied values that take precedence over tags and filename when
/// a song is first loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongOverrides {
    pub id: Option<SongId>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub cover_art_url: Option<String>,
    pub shazam_match_score: Option<u8>,
}

/// Status flags derived from the fields and the filename. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SongStatus {
    /// Artist or title is missing
    pub should_be_tagged: bool,
    /// Recognition was never attempted
    pub should_be_shazamed: bool,
    /// Current filename differs from the canonical one
    pub should_be_renamed: bool,
}

/// Collapse whitespace runs and trim. Blank labels become `None`.
pub fn normalize_label(label: &str) -> Option<String> {
    let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

fn normalized(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(normalize_label)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
