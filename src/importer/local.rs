//! Video source backed by an audio file already on disk.
//!
//! Lets a song be imported from a local recording when the metadata is
//! known but there is no platform client to fetch it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::enrichment::{ServiceError, VideoInfo, VideoMetadataSource};
use crate::model::SongId;

/// Serves one video: fixed metadata and a local audio file.
#[derive(Debug, Clone)]
pub struct LocalAudioSource {
    info: VideoInfo,
    audio: PathBuf,
}

impl LocalAudioSource {
    pub fn new(info: VideoInfo, audio: impl Into<PathBuf>) -> Self {
        Self {
            info,
            audio: audio.into(),
        }
    }
}

#[async_trait]
impl VideoMetadataSource for LocalAudioSource {
    async fn lookup(&self, id: &SongId) -> Result<VideoInfo, ServiceError> {
        if *id != self.info.id {
            return Err(ServiceError::NoMatches);
        }
        Ok(self.info.clone())
    }

    async fn download_audio(&self, id: &SongId, dest: &Path) -> Result<(), ServiceError> {
        if *id != self.info.id {
            return Err(ServiceError::NoMatches);
        }
        tokio::fs::copy(&self.audio, dest)
            .await
            .map(|_| ())
            .map_err(|e| ServiceError::Tool(format!("{}: {e}", self.audio.display())))
    }
}
