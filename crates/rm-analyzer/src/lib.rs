//! Pluggable per-file code analysis.
//!
//! # Overview
//!
//! The tracker treats analysis as an optional capability: an [`Analyzer`]
//! can be installed, swapped at runtime, or absent entirely. Scans that
//! run while no analyzer is installed simply skip the analysis pass.
//!
//! [`HeuristicAnalyzer`] is the built-in implementation. It scans
//! declaration keywords line by line, with no parser and no external
//! service behind it.
//!
//! # Examples
//!
//! ```
//! use camino::Utf8Path;
//! use rm_analyzer::{Analyzer, HeuristicAnalyzer};
//!
//! let analyzer = HeuristicAnalyzer::new();
//! let analysis = analyzer.analyze(Utf8Path::new("lib.rs"), "pub fn run() {}\n")?;
//! assert_eq!(analysis.functions.len(), 1);
//! # Ok::<(), rm_analyzer::AnalyzeError>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod heuristic;

pub use error::AnalyzeError;
pub use heuristic::HeuristicAnalyzer;

use camino::Utf8Path;
use rm_core::FileAnalysis;

/// Extracts functions and classes from source files.
///
/// Implementations must be `Send + Sync`; the tracker shares one analyzer
/// across concurrent scans and swaps it atomically, so in-flight scans
/// keep whichever analyzer they started with.
pub trait Analyzer: Send + Sync {
    /// Short identifier for logging.
    fn name(&self) -> &'static str;

    /// Returns `true` if files with this extension (lowercased, with its
    /// leading dot) can be analyzed.
    fn supports_extension(&self, ext: &str) -> bool;

    /// Analyzes already-read source contents.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Unsupported`] for file types this analyzer
    /// does not handle.
    fn analyze(&self, path: &Utf8Path, contents: &str) -> Result<FileAnalysis, AnalyzeError>;

    /// Reads a file and analyzes it, enforcing the given size limit.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::TooLarge`] for oversized files and
    /// [`AnalyzeError::Read`] when the file cannot be read.
    fn analyze_file(&self, path: &Utf8Path, max_size: u64) -> Result<FileAnalysis, AnalyzeError> {
        let size = std::fs::metadata(path)
            .map_err(|e| AnalyzeError::read(path, e))?
            .len();
        if size > max_size {
            return Err(AnalyzeError::TooLarge {
                path: path.to_owned(),
                size,
                limit: max_size,
            });
        }
        let contents =
            std::fs::read_to_string(path).map_err(|e| AnalyzeError::read(path, e))?;
        self.analyze(path, &contents)
    }
}

impl<A: Analyzer + ?Sized> Analyzer for Box<A> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn supports_extension(&self, ext: &str) -> bool {
        (**self).supports_extension(ext)
    }

    fn analyze(&self, path: &Utf8Path, contents: &str) -> Result<FileAnalysis, AnalyzeError> {
        (**self).analyze(path, contents)
    }
}

impl<A: Analyzer + ?Sized> Analyzer for std::sync::Arc<A> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn supports_extension(&self, ext: &str) -> bool {
        (**self).supports_extension(ext)
    }

    fn analyze(&self, path: &Utf8Path, contents: &str) -> Result<FileAnalysis, AnalyzeError> {
        (**self).analyze(path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn test_analyze_file_respects_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path =
            Utf8PathBuf::from_path_buf(dir.path().join("big.py")).unwrap();
        std::fs::write(&path, "def f():\n    pass\n".repeat(100)).unwrap();

        let analyzer = HeuristicAnalyzer::new();
        let result = analyzer.analyze_file(&path, 10);
        assert!(matches!(result, Err(AnalyzeError::TooLarge { .. })));

        let analysis = analyzer.analyze_file(&path, 1024 * 1024).unwrap();
        assert_eq!(analysis.functions.len(), 50);
    }

    #[test]
    fn test_boxed_analyzer_delegates() {
        let analyzer: Box<dyn Analyzer> = Box::new(HeuristicAnalyzer::new());
        assert_eq!(analyzer.name(), "heuristic");
        assert!(analyzer.supports_extension(".rs"));
    }
}
