//! External collaborators of the song engine.
//!
//! # Architecture
//!
//! - **Domain models** (`domain.rs`) - our types, independent of any API
//! - **Traits** (`traits.rs`) - seams the engine depends on, with mocks for tests
//! - **Throttle** (`throttle.rs`) - the shared recognition rate limit
//! - **Clients** - HTTP cover art download, AcoustID recognition, ffmpeg transcoding
//!
//! The video platform itself is only a trait: fetching video metadata and
//! audio streams is left to whatever implementation the caller plugs in.

pub mod acoustid;
pub mod coverart;
pub mod domain;
pub mod fingerprint;
pub mod throttle;
pub mod traits;
pub mod transcode;

pub use acoustid::AcoustIdRecognizer;
pub use coverart::HttpCoverArtFetcher;
pub use domain::{RecognizedSong, ServiceError, VideoInfo};
pub use throttle::{Clock, RecognitionThrottle, TokioClock};
pub use traits::{AudioTranscoder, CoverArtFetcher, SongRecognizer, VideoMetadataSource};
pub use transcode::FfmpegTranscoder;

/// Collaborators needed to tag a song, borrowed for one operation.
#[derive(Clone, Copy)]
pub struct TaggingServices<'a> {
    pub recognizer: &'a dyn SongRecognizer,
    pub throttle: &'a RecognitionThrottle,
    pub cover_art: &'a dyn CoverArtFetcher,
    /// Minimum recognition confidence for a candidate to replace the labels
    pub match_threshold: u8,
}
