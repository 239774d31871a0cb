//! Trait definitions for external collaborators.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real implementations, while tests
//! substitute the mocks below.
//!
//! # Example
//!
//! ```ignore
//! use song_minder::enrichment::traits::SongRecognizer;
//!
//! async fn identify<R: SongRecognizer>(recognizer: &R, path: &Path) {
//!     let candidate = recognizer.recognize(path).await?;
//! }
//! ```

use std::path::Path;

use async_trait::async_trait;

use super::domain::{RecognizedSong, ServiceError, VideoInfo};
use crate::model::SongId;

/// Fetches raw image bytes for a cover art reference.
#[async_trait]
pub trait CoverArtFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError>;
}

/// Audio recognition service.
///
/// `Ok(None)` means the service answered but found nothing.
#[async_trait]
pub trait SongRecognizer: Send + Sync {
    async fn recognize(&self, path: &Path) -> Result<Option<RecognizedSong>, ServiceError>;
}

/// Remote video platform.
#[async_trait]
pub trait VideoMetadataSource: Send + Sync {
    /// Look up the metadata of a video.
    async fn lookup(&self, id: &SongId) -> Result<VideoInfo, ServiceError>;

    /// Download the best audio stream of a video to `dest`.
    async fn download_audio(&self, id: &SongId, dest: &Path) -> Result<(), ServiceError>;
}

/// Progress callback, called with a fraction in `[0, 1]`.
pub type Progress<'a> = &'a (dyn Fn(f32) + Send + Sync);

/// Converts a raw audio stream into an MP3 file.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    async fn transcode(
        &self,
        source: &Path,
        dest: &Path,
        progress: Progress<'_>,
    ) -> Result<(), ServiceError>;
}

/// Mock collaborators for testing.
///
/// Return configurable responses and count their calls.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock image fetcher serving a fixed set of URLs.
    #[derive(Default)]
    pub struct MockCoverArt {
        pub images: HashMap<String, Vec<u8>>,
        /// Error to return (takes precedence over images)
        pub error: Option<ServiceError>,
        pub calls: AtomicUsize,
    }

    impl MockCoverArt {
        pub fn serving(url: &str, bytes: &[u8]) -> Self {
            let mut images = HashMap::new();
            images.insert(url.to_string(), bytes.to_vec());
            Self {
                images,
                ..Default::default()
            }
        }

        pub fn with_error(error: ServiceError) -> Self {
            Self {
                error: Some(error),
                ..Default::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CoverArtFetcher for MockCoverArt {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ref err) = self.error {
                return Err(err.clone());
            }
            self.images
                .get(url)
                .cloned()
                .ok_or(ServiceError::NoMatches)
        }
    }

    /// Mock recognizer replaying a scripted list of answers.
    ///
    /// Once the script is exhausted every call finds nothing.
    #[derive(Default)]
    pub struct MockRecognizer {
        answers: Mutex<VecDeque<Result<Option<RecognizedSong>, ServiceError>>>,
        pub calls: AtomicUsize,
    }

    impl MockRecognizer {
        pub fn scripted(
            answers: impl IntoIterator<Item = Result<Option<RecognizedSong>, ServiceError>>,
        ) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().collect()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn finding(artist: &str, title: &str, cover_art_url: Option<&str>) -> Self {
            Self::scripted([Ok(Some(RecognizedSong {
                title: title.to_string(),
                artist: artist.to_string(),
                cover_art_url: cover_art_url.map(String::from),
            }))])
        }

        pub fn finding_nothing() -> Self {
            Self::scripted([Ok(None)])
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SongRecognizer for MockRecognizer {
        async fn recognize(&self, _path: &Path) -> Result<Option<RecognizedSong>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers.lock().pop_front().unwrap_or(Ok(None))
        }
    }

    /// Mock video platform writing fixed bytes as the audio stream.
    pub struct MockVideoSource {
        pub info: VideoInfo,
        pub audio: Vec<u8>,
    }

    #[async_trait]
    impl VideoMetadataSource for MockVideoSource {
        async fn lookup(&self, id: &SongId) -> Result<VideoInfo, ServiceError> {
            if *id != self.info.id {
                return Err(ServiceError::NoMatches);
            }
            Ok(self.info.clone())
        }

        async fn download_audio(&self, _id: &SongId, dest: &Path) -> Result<(), ServiceError> {
            std::fs::write(dest, &self.audio).map_err(|e| ServiceError::Network(e.to_string()))
        }
    }

    /// Mock transcoder copying the source as-is.
    #[derive(Default)]
    pub struct MockTranscoder;

    #[async_trait]
    impl AudioTranscoder for MockTranscoder {
        async fn transcode(
            &self,
            source: &Path,
            dest: &Path,
            progress: Progress<'_>,
        ) -> Result<(), ServiceError> {
            std::fs::copy(source, dest).map_err(|e| ServiceError::Tool(e.to_string()))?;
            progress(1.0);
            Ok(())
        }
    }
}
