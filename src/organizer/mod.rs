//! Canonical song filenames and guarded renames.
//!
//! A song file is named after its identity and labels:
//!
//! ```text
//! ARTIST - Title [identity] (JUNK).mp3
//! ```
//!
//! The `ARTIST - ` part is only present when both labels are, the space
//! before the bracket only when at least one label is, and ` (JUNK)` only for
//! songs flagged as junk. Decoding recovers the identity and junk flag
//! exactly; artist and title are a best-effort fallback used when the tag
//! container has nothing better.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{SongFields, SongId};

/// Extension of every song file.
pub const EXTENSION: &str = "mp3";

/// Marker inserted before the extension of junk songs.
pub const JUNK_MARKER: &str = " (JUNK)";

const LABEL_SEPARATOR: &str = " - ";

/// Labels and flags recovered from a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFilename {
    pub id: SongId,
    pub junk: bool,
    /// Everything before the bracketed identity, trimmed
    pub song_name: String,
    pub artist: Option<String>,
    pub title: Option<String>,
}

/// Sanitizes a label for use in a filename.
///
/// Characters that are unsafe in filenames become separators, runs of
/// whitespace collapse to a single space, and the result is trimmed.
pub fn sanitize(label: &str) -> String {
    let replaced: String = label
        .chars()
        .map(|c| match c {
            '\\' | '<' | '>' | '*' | '/' | '"' | ':' | '+' | '`' | '|' | '=' => ' ',
            c if c.is_control() => ' ',
            _ => c,
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Artist as it appears in a filename: sanitized and uppercased.
pub fn artist_label(artist: Option<&str>) -> String {
    artist.map(sanitize).unwrap_or_default().to_uppercase()
}

/// Title as it appears in a filename: sanitized with a capital first letter.
pub fn title_label(title: Option<&str>) -> String {
    capitalize_first(&title.map(sanitize).unwrap_or_default())
}

/// Uppercase the first character, leave the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Produce the canonical filename for a song.
pub fn encode(id: &SongId, artist: Option<&str>, title: Option<&str>, junk: bool) -> String {
    let artist = artist_label(artist);
    let title = title_label(title);

    let mut name = String::new();
    name.push_str(&artist);
    if !artist.is_empty() && !title.is_empty() {
        name.push_str(LABEL_SEPARATOR);
    }
    name.push_str(&title);
    if !artist.is_empty() || !title.is_empty() {
        name.push(' ');
    }
    name.push('[');
    name.push_str(id.as_str());
    name.push(']');
    if junk {
        name.push_str(JUNK_MARKER);
    }
    name.push('.');
    name.push_str(EXTENSION);
    name
}

/// Canonical filename for a field set.
///
/// A song missing either label is named by its identity alone and always
/// carries the junk marker.
pub fn expected_filename(fields: &SongFields, junk: bool) -> String {
    match (fields.artist.as_deref(), fields.title.as_deref()) {
        (Some(artist), Some(title)) => encode(&fields.id, Some(artist), Some(title), junk),
        _ => encode(&fields.id, None, None, true),
    }
}

/// Whether a filename carries the junk marker.
pub fn is_junk_filename(filename: &str) -> bool {
    filename.ends_with(&format!("{JUNK_MARKER}.{EXTENSION}"))
}

/// Whether a filename has the song file extension.
pub fn is_song_filename(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == EXTENSION)
}

/// Extract the identity between the last pair of brackets of a name.
///
/// Works for song filenames (`... [id].mp3`) as well as playlist folder
/// names (`Label [id]`). Nothing after the closing bracket may contain
/// another closing bracket.
pub fn extract_id(name: &str) -> Option<SongId> {
    bracketed_tail(name).and_then(|(_, id, _)| SongId::new(id))
}

/// Split a name into (before, inside, after) around its last bracket pair.
fn bracketed_tail(name: &str) -> Option<(&str, &str, &str)> {
    let close = name.rfind(']')?;
    let open = name[..close].rfind('[')?;
    let inside = &name[open + 1..close];
    if inside.is_empty() || inside.contains(']') {
        return None;
    }
    Some((&name[..open], inside, &name[close + 1..]))
}

/// Decode a song filename.
///
/// Returns `None` when the name carries no identity, meaning the file is not
/// a song file.
pub fn decode(filename: &str) -> Option<DecodedFilename> {
    if !filename.ends_with(&format!(".{EXTENSION}")) {
        return None;
    }
    let junk = is_junk_filename(filename);
    let suffix_len = if junk {
        JUNK_MARKER.len() + EXTENSION.len() + 1
    } else {
        EXTENSION.len() + 1
    };
    let stem = filename.get(..filename.len().checked_sub(suffix_len)?)?;

    let (before, inside, after) = bracketed_tail(stem)?;
    if !after.is_empty() {
        return None;
    }
    let id = SongId::new(inside)?;

    let song_name = before.trim().to_string();
    // Labels are only trusted when separated from the identity by a space
    let (artist, title) = if before.ends_with(char::is_whitespace) && !song_name.is_empty() {
        match song_name.split_once(LABEL_SEPARATOR) {
            Some((artist, title)) => (non_empty(artist), non_empty(title)),
            None => (None, non_empty(&song_name)),
        }
    } else {
        (None, None)
    };

    Some(DecodedFilename {
        id,
        junk,
        song_name,
        artist,
        title,
    })
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Rename a song file within its folder.
///
/// Refuses to overwrite an existing file. Renaming to the current name is a
/// no-op. On failure the source file is left where it was.
pub fn rename_song_file(source: &Path, filename: &str) -> Result<PathBuf> {
    let destination = source
        .parent()
        .map(|dir| dir.join(filename))
        .unwrap_or_else(|| PathBuf::from(filename));

    if destination == source {
        return Ok(destination);
    }

    // Case-only renames on case-insensitive filesystems report the source
    // itself as existing
    let same_file = fs::canonicalize(source).ok().is_some_and(|src| {
        fs::canonicalize(&destination).ok().is_some_and(|dst| dst == src)
    });
    if destination.exists() && !same_file {
        return Err(Error::rename(
            source,
            &destination,
            "destination already exists",
        ));
    }

    fs::rename(source, &destination)
        .map_err(|e| Error::rename(source, &destination, e.to_string()))?;

    debug!(from = %source.display(), to = %destination.display(), "Renamed song file");
    Ok(destination)
}
