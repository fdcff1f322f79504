//! Error types for scanning operations.

use camino::Utf8PathBuf;

/// Errors that can occur while scanning a project.
///
/// Most filesystem trouble during a walk is handled in place (logged and
/// skipped, or a branch truncated); these variants cover the failures that
/// surface to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Failed to read a file or directory.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// The path that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a generated file.
    #[error("failed to write '{path}': {source}")]
    Write {
        /// The path that could not be written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The scan target is invalid.
    #[error("invalid scan target: {0}")]
    Config(String),
}

impl ScanError {
    /// Creates a new [`ScanError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Write`] error.
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => Some(path),
            Self::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = ScanError::read("/some/path", io);
        let msg = error.to_string();
        assert!(msg.contains("/some/path"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_path_accessor() {
        let io = std::io::Error::other("boom");
        let error = ScanError::write("/out/repomap.md", io);
        assert_eq!(
            error.path().map(|p| p.as_str()),
            Some("/out/repomap.md")
        );
        assert!(ScanError::config("bad target").path().is_none());
    }
}
