//! Application-wide error types.
//!
//! Library modules return [`Result`] with the [`Error`] enum below, while the
//! CLI layer uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! The variants follow the failure classes of the song engine:
//!
//! - [`Error::Identity`]: a file has no recoverable song identity (fatal for that file)
//! - [`Error::Tags`]: the tag container is unreadable or could not be written
//! - [`Error::Rename`]: a rename failed; the song keeps its previous state
//! - [`Error::CoverArt`]: an image fetch failed; nothing was committed
//! - [`Error::Recognition`]: the recognition service failed after its retry
//! - [`Error::Repository`]: a playlist or song selection could not be resolved
//!
//! Batch operations catch per-song errors at the batch boundary and log them;
//! single-song operations propagate them to the caller.

use std::path::PathBuf;

use crate::enrichment::ServiceError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No identity in the tags, the filename, or the caller's overrides
    #[error("Song identity is missing in file: {}", .0.display())]
    Identity(PathBuf),

    /// Tag container could not be read or written
    #[error("Tag error for {}: {message}", path.display())]
    Tags { path: PathBuf, message: String },

    /// Rename of a song file failed
    #[error("Failed to rename {} to {}: {reason}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    /// Cover art could not be fetched or embedded
    #[error("Cover art error: {0}")]
    CoverArt(#[source] ServiceError),

    /// Recognition service failed after its retry
    #[error("Recognition service seems out of service: {0}")]
    Recognition(#[source] ServiceError),

    /// Video lookup, audio download or transcoding failed
    #[error("Import failed: {0}")]
    Import(#[source] ServiceError),

    /// Playlist or song selection error
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A batch operation was interrupted between two songs
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Errors raised while resolving playlists and selecting songs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Invalid playlist identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Playlist index is out of range: {index} (found {count} playlists)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Multiple playlists match identifier {0:?} in repository")]
    Ambiguous(String),

    #[error("Playlist {0:?} does not exist in repository")]
    NotFound(String),

    #[error("Song index is out of range: {index} (found {count} songs)")]
    SongIndexOutOfRange { index: i64, count: usize },

    #[error("No songs found")]
    NoSongs,
}

impl Error {
    /// Create a tag error.
    pub fn tags(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Tags {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a rename error.
    pub fn rename(
        from: impl Into<PathBuf>,
        to: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Rename {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_error_names_file() {
        let err = Error::Identity(PathBuf::from("/music/untitled.mp3"));
        assert!(err.to_string().contains("/music/untitled.mp3"));
    }

    #[test]
    fn test_rename_error_display() {
        let err = Error::rename("/a/old.mp3", "/a/new.mp3", "destination already exists");
        let msg = err.to_string();
        assert!(msg.contains("old.mp3"));
        assert!(msg.contains("new.mp3"));
        assert!(msg.contains("destination already exists"));
    }

    #[test]
    fn test_repository_error_converts() {
        let err: Error = RepositoryError::Ambiguous("PL123".to_string()).into();
        assert!(matches!(
            err,
            Error::Repository(RepositoryError::Ambiguous(_))
        ));
        assert!(err.to_string().contains("PL123"));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::tags("/x.mp3", "corrupt frame"));
        let with_ctx = result.with_context("while loading song");
        let msg = with_ctx.unwrap_err().to_string();
        assert!(msg.contains("while loading song"));
        assert!(msg.contains("corrupt frame"));
    }
}
