//! Error types for file watching.

use camino::Utf8PathBuf;

/// Errors that can occur while setting up or running a file watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The underlying notify watcher failed.
    #[error("watcher backend error: {0}")]
    Notify(#[from] notify::Error),

    /// The path to watch does not exist.
    #[error("watch path not found: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The event channel closed unexpectedly.
    #[error("watcher event channel closed")]
    ChannelClosed,

    /// A path contained invalid UTF-8.
    #[error("path contains invalid UTF-8: {0}")]
    NonUtf8Path(std::path::PathBuf),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Creates a new [`WatchError::NonUtf8Path`] error.
    #[inline]
    pub fn non_utf8_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self::NonUtf8Path(path.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_not_found_display() {
        let error = WatchError::path_not_found("/missing/project");
        assert!(error.to_string().contains("/missing/project"));
    }

    #[test]
    fn test_channel_closed_display() {
        assert_eq!(
            WatchError::ChannelClosed.to_string(),
            "watcher event channel closed"
        );
    }
}
