//! Error types for project tracking.

use camino::Utf8PathBuf;

/// Errors surfaced by tracker operations.
///
/// Most trouble during tracking (watcher hiccups, per-file analysis
/// failures, artifact writes) is logged and absorbed; these variants are
/// the failures a caller can actually act on.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The path is already being tracked.
    #[error("project already tracked: {0}")]
    AlreadyTracked(Utf8PathBuf),

    /// The path cannot be tracked.
    #[error("invalid project path '{path}': {reason}")]
    InvalidPath {
        /// The rejected path.
        path: Utf8PathBuf,
        /// Explanation of the rejection.
        reason: String,
    },

    /// The update channel's consumer is gone.
    #[error("update channel closed")]
    ChannelClosed,
}

impl TrackerError {
    /// Creates a new [`TrackerError::InvalidPath`] error.
    #[inline]
    pub fn invalid_path(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
