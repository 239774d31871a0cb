//! Pure derivation of a song's state from its sources.
//!
//! Every field is resolved from an ordered list of sources, first present
//! value wins: caller override, then tag container, then filename. The
//! filename only contributes labels while the file has never been tagged
//! with an identity, so stale names never override tagged data.

use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::metadata::StoredTags;
use crate::model::{SongFields, SongOverrides, SongStatus, normalize_label};
use crate::organizer;

/// Immutable snapshot of a song, recomputed after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongState {
    pub fields: SongFields,
    /// Read from the filename, never from tags
    pub junk: bool,
    pub status: SongStatus,
    pub has_cover_art: bool,
    pub embedded_cover_url: Option<String>,
    pub duration: Duration,
}

/// First present value wins.
fn first_of<T>(sources: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    sources.into_iter().flatten().next()
}

fn label(value: Option<&str>) -> Option<String> {
    value.and_then(normalize_label)
}

fn url(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Merge overrides, stored tags and filename into a song state.
///
/// Fails with [`Error::Identity`] when none of the three carries an identity.
pub fn reconcile(path: &Path, tags: &StoredTags, overrides: &SongOverrides) -> Result<SongState> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::Identity(path.to_path_buf()))?;
    let decoded = organizer::decode(filename);
    let junk = organizer::is_junk_filename(filename);

    let id = first_of([
        overrides.id.clone(),
        tags.id.clone(),
        decoded.as_ref().map(|d| d.id.clone()),
    ])
    .ok_or_else(|| Error::Identity(path.to_path_buf()))?;

    let from_filename = decoded.filter(|d| tags.id.is_none() && d.id == id);
    let filename_artist = from_filename.as_ref().and_then(|d| d.artist.as_deref());
    let filename_title = from_filename.as_ref().and_then(|d| d.title.as_deref());

    let fields = SongFields {
        artist: first_of([
            label(overrides.artist.as_deref()),
            tags.artist.clone(),
            label(filename_artist),
        ]),
        title: first_of([
            label(overrides.title.as_deref()),
            tags.title.clone(),
            label(filename_title),
        ]),
        cover_art_url: first_of([
            url(overrides.cover_art_url.as_deref()),
            tags.cover_art_url.clone(),
        ]),
        shazam_artist: tags.shazam_artist.clone(),
        shazam_title: tags.shazam_title.clone(),
        shazam_cover_art_url: tags.shazam_cover_art_url.clone(),
        shazam_match_score: first_of([overrides.shazam_match_score, tags.shazam_match_score]),
        id,
    };

    let status = SongStatus {
        should_be_tagged: fields.artist.is_none() || fields.title.is_none(),
        should_be_shazamed: fields.shazam_match_score.is_none(),
        should_be_renamed: filename != organizer::expected_filename(&fields, junk),
    };

    Ok(SongState {
        fields,
        junk,
        status,
        has_cover_art: tags.has_front_cover,
        embedded_cover_url: tags.embedded_cover_url.clone(),
        duration: tags.duration,
    })
}

/// The song fields a tag container currently holds, if it was ever tagged.
pub fn persisted_fields(tags: &StoredTags) -> Option<SongFields> {
    Some(SongFields {
        id: tags.id.clone()?,
        artist: tags.artist.clone(),
        title: tags.title.clone(),
        cover_art_url: tags.cover_art_url.clone(),
        shazam_artist: tags.shazam_artist.clone(),
        shazam_title: tags.shazam_title.clone(),
        shazam_cover_art_url: tags.shazam_cover_art_url.clone(),
        shazam_match_score: tags.shazam_match_score,
    })
}
