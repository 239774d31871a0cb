//! Keeping the embedded front cover in line with the working cover reference.

use tracing::{debug, info};

use super::Song;
use crate::enrichment::CoverArtFetcher;
use crate::error::{Error, Result};

/// What [`Song::update_cover_art`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverArtOutcome {
    /// Embedded cover already matches the reference
    Unchanged,
    /// A new image was fetched and embedded
    Embedded,
    /// The song has no reference, the old image was dropped
    Removed,
}

impl Song {
    /// Embed the image behind `cover_art_url`, or drop the embedded image
    /// when there is no reference.
    ///
    /// The image is fetched before anything is written, so a failed fetch
    /// leaves the tags untouched.
    pub async fn update_cover_art(&mut self, fetcher: &dyn CoverArtFetcher) -> Result<CoverArtOutcome> {
        let Some(url) = self.state.fields.cover_art_url.clone() else {
            if !self.state.has_cover_art && self.state.embedded_cover_url.is_none() {
                return Ok(CoverArtOutcome::Unchanged);
            }
            self.store.remove_cover(&self.path)?;
            self.reload()?;
            info!(path = %self.path.display(), "Removed cover art");
            return Ok(CoverArtOutcome::Removed);
        };

        if self.state.has_cover_art && self.state.embedded_cover_url.as_deref() == Some(url.as_str()) {
            debug!(path = %self.path.display(), "Cover art up to date");
            return Ok(CoverArtOutcome::Unchanged);
        }

        let image = fetcher.fetch(&url).await.map_err(Error::CoverArt)?;
        self.store.embed_cover(&self.path, &image, &url)?;
        self.reload()?;
        info!(path = %self.path.display(), url = %url, "Embedded cover art");
        Ok(CoverArtOutcome::Embedded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::ServiceError;
    use crate::enrichment::traits::mocks::MockCoverArt;
    use crate::model::{FieldUpdate, SongChanges};
    use crate::test_utils::{JsonTagStore, fields, write_song};
    use std::sync::Arc;
    use tempfile::TempDir;

    const URL: &str = "https://img/cover.jpg";

    fn song_with_cover_url(dir: &TempDir, url: Option<&str>) -> (Song, Arc<JsonTagStore>) {
        let store = Arc::new(JsonTagStore::default());
        let mut f = fields("XYZ", Some("Queen"), Some("Uprising"));
        f.cover_art_url = url.map(String::from);
        let path = write_song(dir.path(), "QUEEN - Uprising [XYZ].mp3", Some(f));
        (Song::load(&path, store.clone()).unwrap(), store)
    }

    #[tokio::test]
    async fn test_embeds_then_skips_same_url() {
        let dir = TempDir::new().unwrap();
        let (mut song, _store) = song_with_cover_url(&dir, Some(URL));
        let fetcher = MockCoverArt::serving(URL, b"jpeg bytes");

        assert_eq!(song.update_cover_art(&fetcher).await.unwrap(), CoverArtOutcome::Embedded);
        assert!(song.has_cover_art());

        assert_eq!(song.update_cover_art(&fetcher).await.unwrap(), CoverArtOutcome::Unchanged);
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_new_url_is_fetched_again() {
        let dir = TempDir::new().unwrap();
        let (mut song, _store) = song_with_cover_url(&dir, Some(URL));
        let mut fetcher = MockCoverArt::serving(URL, b"first");
        fetcher.images.insert("https://img/other.jpg".to_string(), b"second".to_vec());
        song.update_cover_art(&fetcher).await.unwrap();

        song.update(&SongChanges {
            cover_art_url: FieldUpdate::Set("https://img/other.jpg".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(song.update_cover_art(&fetcher).await.unwrap(), CoverArtOutcome::Embedded);
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_reference_removes_image() {
        let dir = TempDir::new().unwrap();
        let (mut song, _store) = song_with_cover_url(&dir, Some(URL));
        song.update_cover_art(&MockCoverArt::serving(URL, b"jpeg")).await.unwrap();

        song.update(&SongChanges {
            cover_art_url: FieldUpdate::Clear,
            ..Default::default()
        })
        .unwrap();
        let fetcher = MockCoverArt::default();

        assert_eq!(song.update_cover_art(&fetcher).await.unwrap(), CoverArtOutcome::Removed);
        assert!(!song.has_cover_art());
        assert_eq!(song.update_cover_art(&fetcher).await.unwrap(), CoverArtOutcome::Unchanged);
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_commits_nothing() {
        let dir = TempDir::new().unwrap();
        let (mut song, store) = song_with_cover_url(&dir, Some(URL));
        let fetcher = MockCoverArt::with_error(ServiceError::Network("timeout".to_string()));

        let result = song.update_cover_art(&fetcher).await;

        assert!(matches!(result, Err(Error::CoverArt(_))));
        assert!(!song.has_cover_art());
        assert_eq!(store.load_tags(song.path()).embedded_cover_url, None);
    }
}
