//! Tag container access for song files.
//!
//! [`TagStore`] is the typed view the song engine works against: every field
//! is an optional accessor, never an existence check that may throw.
//! [`LoftyTagStore`] is the production implementation on top of lofty's
//! ID3v2 support.
//!
//! # Layout
//!
//! Labels live in the standard artist/title frames. Everything else lives in
//! user text frames (`TXXX`) keyed by the descriptions below. Tags are always
//! written as ID3v2.3 and any ID3v1 tag is dropped.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::id3::v2::{Frame, Id3v2Tag};
use lofty::mpeg::MpegFile;
use lofty::picture::{Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, TagExt, TagType};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{SongFields, SongId, normalize_label};

pub const ID_KEY: &str = "YouTube ID";
pub const COVER_ART_URL_KEY: &str = "Cover art URL";
pub const SHAZAM_SCORE_KEY: &str = "Shazam match level";
pub const SHAZAM_ARTIST_KEY: &str = "Shazam artist";
pub const SHAZAM_TITLE_KEY: &str = "Shazam title";
pub const SHAZAM_COVER_ART_URL_KEY: &str = "Shazam cover art URL";
/// URL the currently embedded front cover was fetched from
pub const EMBEDDED_COVER_URL_KEY: &str = "Stored cover art URL";
const COVER_DESCRIPTION: &str = "Cover art";

/// Everything the song engine reads from a tag container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredTags {
    pub id: Option<SongId>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub cover_art_url: Option<String>,
    pub shazam_artist: Option<String>,
    pub shazam_title: Option<String>,
    pub shazam_cover_art_url: Option<String>,
    pub shazam_match_score: Option<u8>,
    pub embedded_cover_url: Option<String>,
    /// Probed from the embedded pictures, not from the stored URL
    pub has_front_cover: bool,
    pub duration: Duration,
}

/// Typed tag container.
///
/// All writes are whole-operation: an error leaves the file as it was.
pub trait TagStore: Send + Sync {
    /// Read every field the engine cares about.
    fn load(&self, path: &Path) -> Result<StoredTags>;

    /// Persist the song fields. The embedded cover and its URL are untouched.
    fn save(&self, path: &Path, fields: &SongFields) -> Result<()>;

    /// Replace the front cover and remember the URL it came from.
    fn embed_cover(&self, path: &Path, image: &[u8], url: &str) -> Result<()>;

    /// Drop every embedded picture and the remembered URL.
    fn remove_cover(&self, path: &Path) -> Result<()>;
}

/// ID3v2 tag store backed by lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagStore;

impl LoftyTagStore {
    fn read_mpeg(path: &Path) -> Result<MpegFile> {
        let mut file = File::open(path)?;
        MpegFile::read_from(&mut file, ParseOptions::new())
            .map_err(|e| Error::tags(path, format!("Failed to read MP3 file: {e}")))
    }

    fn read_tag(path: &Path) -> Result<Id3v2Tag> {
        Ok(Self::read_mpeg(path)?.id3v2().cloned().unwrap_or_default())
    }

    fn write_tag(path: &Path, tag: &Id3v2Tag) -> Result<()> {
        tag.save_to_path(path, WriteOptions::default().use_id3v23(true))
            .map_err(|e| Error::tags(path, format!("Failed to write ID3v2 tag: {e}")))?;
        TagType::Id3v1
            .remove_from_path(path)
            .map_err(|e| Error::tags(path, format!("Failed to remove ID3v1 tag: {e}")))?;
        Ok(())
    }

    fn has_front_cover(path: &Path) -> bool {
        let Ok(tagged_file) = Probe::open(path).and_then(|probe| probe.read()) else {
            return false;
        };
        tagged_file.tags().iter().any(|tag| {
            tag.pictures()
                .iter()
                .any(|p| p.pic_type() == PictureType::CoverFront)
        })
    }
}

fn user_text(tag: &Id3v2Tag, key: &str) -> Option<String> {
    tag.get_user_text(key).and_then(normalize_label)
}

fn set_user_text(tag: &mut Id3v2Tag, key: &str, value: Option<&str>) {
    match value {
        Some(v) => {
            tag.insert_user_text(key.to_string(), v.to_string());
        }
        None => {
            tag.remove_user_text(key);
        }
    }
}

impl TagStore for LoftyTagStore {
    fn load(&self, path: &Path) -> Result<StoredTags> {
        let mpeg = Self::read_mpeg(path)?;
        let duration = mpeg.properties().duration();

        let Some(tag) = mpeg.id3v2() else {
            debug!(path = %path.display(), "No ID3v2 tag");
            return Ok(StoredTags {
                duration,
                ..Default::default()
            });
        };

        let shazam_match_score = tag.get_user_text(SHAZAM_SCORE_KEY).and_then(|raw| {
            let parsed = raw.trim().parse::<u8>().ok();
            if parsed.is_none() {
                debug!(path = %path.display(), raw, "Ignoring unparsable match level");
            }
            parsed.map(|score| score.min(100))
        });

        Ok(StoredTags {
            id: tag.get_user_text(ID_KEY).and_then(SongId::new),
            artist: tag.artist().as_deref().and_then(normalize_label),
            title: tag.title().as_deref().and_then(normalize_label),
            cover_art_url: user_text(tag, COVER_ART_URL_KEY),
            shazam_artist: user_text(tag, SHAZAM_ARTIST_KEY),
            shazam_title: user_text(tag, SHAZAM_TITLE_KEY),
            shazam_cover_art_url: user_text(tag, SHAZAM_COVER_ART_URL_KEY),
            shazam_match_score,
            embedded_cover_url: user_text(tag, EMBEDDED_COVER_URL_KEY),
            has_front_cover: Self::has_front_cover(path),
            duration,
        })
    }

    fn save(&self, path: &Path, fields: &SongFields) -> Result<()> {
        let mut tag = Self::read_tag(path)?;

        match &fields.artist {
            Some(artist) => tag.set_artist(artist.clone()),
            None => tag.remove_artist(),
        }
        match &fields.title {
            Some(title) => tag.set_title(title.clone()),
            None => tag.remove_title(),
        }

        let score = fields.shazam_match_score.map(|s| s.to_string());
        set_user_text(&mut tag, ID_KEY, Some(fields.id.as_str()));
        set_user_text(&mut tag, COVER_ART_URL_KEY, fields.cover_art_url.as_deref());
        set_user_text(&mut tag, SHAZAM_SCORE_KEY, score.as_deref());
        set_user_text(&mut tag, SHAZAM_ARTIST_KEY, fields.shazam_artist.as_deref());
        set_user_text(&mut tag, SHAZAM_TITLE_KEY, fields.shazam_title.as_deref());
        set_user_text(
            &mut tag,
            SHAZAM_COVER_ART_URL_KEY,
            fields.shazam_cover_art_url.as_deref(),
        );

        Self::write_tag(path, &tag)?;
        debug!(path = %path.display(), id = %fields.id, "Saved tags");
        Ok(())
    }

    fn embed_cover(&self, path: &Path, image: &[u8], url: &str) -> Result<()> {
        let mut picture = Picture::from_reader(&mut Cursor::new(image))
            .map_err(|e| Error::tags(path, format!("Unsupported cover image: {e}")))?;
        picture.set_pic_type(PictureType::CoverFront);
        // Frames without a description do not read back once written as v2.3
        picture.set_description(Some(COVER_DESCRIPTION.to_string()));

        let mut tag = Self::read_tag(path)?;
        tag.remove_picture_type(PictureType::CoverFront);
        tag.insert_picture(picture);
        set_user_text(&mut tag, EMBEDDED_COVER_URL_KEY, Some(url));
        Self::write_tag(path, &tag)
    }

    fn remove_cover(&self, path: &Path) -> Result<()> {
        let mut tag = Self::read_tag(path)?;
        tag.retain(|frame| !matches!(frame, Frame::Picture(_)));
        set_user_text(&mut tag, EMBEDDED_COVER_URL_KEY, None);
        Self::write_tag(path, &tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    /// A few silent MPEG-1 Layer III frames (128 kbps, 44.1 kHz).
    fn silent_mp3(dir: &TempDir) -> std::path::PathBuf {
        const FRAME_LEN: usize = 417;
        let mut data = Vec::with_capacity(FRAME_LEN * 20);
        for _ in 0..20 {
            let mut frame = vec![0u8; FRAME_LEN];
            frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
            data.extend_from_slice(&frame);
        }
        let path = dir.path().join("song [XYZ].mp3");
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_load_non_audio_file_is_tag_error() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "Not an audio file").expect("Failed to write");

        let result = LoftyTagStore.load(file.path());
        assert!(matches!(result, Err(Error::Tags { .. })));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = LoftyTagStore.load(Path::new("/nonexistent/song.mp3"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_untagged_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = silent_mp3(&dir);

        let tags = LoftyTagStore.load(&path).unwrap();
        assert_eq!(tags.id, None);
        assert_eq!(tags.artist, None);
        assert!(!tags.has_front_cover);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = silent_mp3(&dir);

        let mut fields = SongFields::bare(SongId::new("XYZ").unwrap());
        fields.artist = Some("Queen".to_string());
        fields.title = Some("Bohemian Rhapsody".to_string());
        fields.shazam_match_score = Some(0);
        LoftyTagStore.save(&path, &fields).unwrap();

        let tags = LoftyTagStore.load(&path).unwrap();
        assert_eq!(tags.id.as_ref().map(SongId::as_str), Some("XYZ"));
        assert_eq!(tags.artist.as_deref(), Some("Queen"));
        assert_eq!(tags.title.as_deref(), Some("Bohemian Rhapsody"));
        assert_eq!(tags.shazam_match_score, Some(0));
        assert_eq!(tags.cover_art_url, None);

        // Clearing a field removes it
        fields.artist = None;
        LoftyTagStore.save(&path, &fields).unwrap();
        assert_eq!(LoftyTagStore.load(&path).unwrap().artist, None);
    }

    /// Smallest valid PNG: one transparent pixel.
    const PIXEL_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn tagged_mp3(dir: &TempDir) -> std::path::PathBuf {
        let path = silent_mp3(dir);
        let mut fields = SongFields::bare(SongId::new("XYZ").unwrap());
        fields.artist = Some("Queen".to_string());
        fields.title = Some("Uprising".to_string());
        LoftyTagStore.save(&path, &fields).unwrap();
        path
    }

    #[test]
    fn test_embed_then_remove_cover() {
        let dir = TempDir::new().unwrap();
        let path = tagged_mp3(&dir);

        LoftyTagStore
            .embed_cover(&path, PIXEL_PNG, "https://img/q.png")
            .unwrap();
        let tags = LoftyTagStore.load(&path).unwrap();
        assert!(tags.has_front_cover);
        assert_eq!(tags.embedded_cover_url.as_deref(), Some("https://img/q.png"));
        assert_eq!(tags.artist.as_deref(), Some("Queen"));

        LoftyTagStore.remove_cover(&path).unwrap();
        let tags = LoftyTagStore.load(&path).unwrap();
        assert!(!tags.has_front_cover);
        assert_eq!(tags.embedded_cover_url, None);
        assert_eq!(tags.id.as_ref().map(SongId::as_str), Some("XYZ"));
    }

    #[test]
    fn test_save_keeps_embedded_cover() {
        let dir = TempDir::new().unwrap();
        let path = tagged_mp3(&dir);
        LoftyTagStore
            .embed_cover(&path, PIXEL_PNG, "https://img/q.png")
            .unwrap();

        let mut fields = SongFields::bare(SongId::new("XYZ").unwrap());
        fields.title = Some("Uprising".to_string());
        LoftyTagStore.save(&path, &fields).unwrap();

        let tags = LoftyTagStore.load(&path).unwrap();
        assert!(tags.has_front_cover);
        assert_eq!(tags.embedded_cover_url.as_deref(), Some("https://img/q.png"));
        assert_eq!(tags.artist, None);
    }

    #[test]
    fn test_remove_cover_drops_every_picture() {
        let dir = TempDir::new().unwrap();
        let path = tagged_mp3(&dir);

        let mut tag = LoftyTagStore::read_tag(&path).unwrap();
        let mut back = Picture::from_reader(&mut Cursor::new(PIXEL_PNG)).unwrap();
        back.set_pic_type(PictureType::Artist);
        back.set_description(Some("Band".to_string()));
        tag.insert_picture(back);
        LoftyTagStore::write_tag(&path, &tag).unwrap();

        LoftyTagStore.remove_cover(&path).unwrap();

        let tag = LoftyTagStore::read_tag(&path).unwrap();
        assert!(!tag.into_iter().any(|frame| matches!(frame, Frame::Picture(_))));
    }

    #[test]
    fn test_embed_rejects_non_image() {
        let dir = TempDir::new().unwrap();
        let path = tagged_mp3(&dir);

        let result = LoftyTagStore.embed_cover(&path, b"not an image", "https://img/x");
        assert!(matches!(result, Err(Error::Tags { .. })));
        assert_eq!(LoftyTagStore.load(&path).unwrap().embedded_cover_url, None);
    }
}
