//! Error types for per-file analysis.

use camino::Utf8PathBuf;

/// Errors that can occur while analyzing a single file.
///
/// Analysis failures are always per-file: the tracker logs them and moves
/// on to the next file, they never fail a scan.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// Failed to read the file.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// The path that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file exceeds the analyzer's size limit.
    #[error("file too large to analyze: '{path}' ({size} bytes, limit {limit})")]
    TooLarge {
        /// The oversized file.
        path: Utf8PathBuf,
        /// Actual size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// The file's language is not supported by this analyzer.
    #[error("unsupported file type: '{0}'")]
    Unsupported(Utf8PathBuf),
}

impl AnalyzeError {
    /// Creates a new [`AnalyzeError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_large_display() {
        let error = AnalyzeError::TooLarge {
            path: Utf8PathBuf::from("/p/big.py"),
            size: 2_000_000,
            limit: 1_048_576,
        };
        let msg = error.to_string();
        assert!(msg.contains("/p/big.py"));
        assert!(msg.contains("2000000"));
    }
}
