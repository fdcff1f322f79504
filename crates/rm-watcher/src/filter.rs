//! Event filtering at the watcher source.
//!
//! Filtering happens on the blocking watcher thread, before events reach
//! the async channel. The one filter every tracked project needs is
//! [`GeneratedArtifactFilter`]: each scan rewrites `repomap.md` inside
//! the watched root, and without the filter that write would trigger the
//! watcher, which would schedule a rescan, which would write the artifact
//! again, forever.
//!
//! # Examples
//!
//! ```
//! use rm_watcher::{FileFilter, GeneratedArtifactFilter};
//! use camino::Utf8Path;
//!
//! let filter = GeneratedArtifactFilter;
//! assert!(filter.should_process(Utf8Path::new("src/app.py")));
//! assert!(!filter.should_process(Utf8Path::new("repomap.md")));
//! assert!(!filter.should_process(Utf8Path::new("sub/dir/.ignore")));
//! ```

use camino::Utf8Path;
use smallvec::SmallVec;

use rm_core::GENERATED_FILES;

/// A predicate deciding which file events reach the event channel.
///
/// Filters run on the blocking watcher thread, so they must be `Send`,
/// `Sync`, and `'static`.
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if the event for this path should be forwarded.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// A filter that accepts all files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl FileFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _path: &Utf8Path) -> bool {
        true
    }
}

/// Drops events for files this tool generates itself.
///
/// Without this filter, writing `repomap.md` after a scan would re-trigger
/// the watcher and the project would rescan in a loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratedArtifactFilter;

impl FileFilter for GeneratedArtifactFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        path.file_name()
            .is_none_or(|name| !GENERATED_FILES.contains(&name))
    }
}

/// A filter accepting only files with the given extensions.
///
/// # Examples
///
/// ```
/// use rm_watcher::{ExtensionFilter, FileFilter};
/// use camino::Utf8Path;
///
/// let filter = ExtensionFilter::new(&["py", "rs"]);
/// assert!(filter.should_process(Utf8Path::new("src/main.py")));
/// assert!(!filter.should_process(Utf8Path::new("styles.css")));
/// ```
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: SmallVec<[String; 8]>,
}

impl ExtensionFilter {
    /// Creates a filter for the given extensions (without leading dots).
    #[must_use]
    pub fn new(extensions: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Creates a filter from owned extension strings.
    #[must_use]
    pub fn from_owned(extensions: Vec<String>) -> Self {
        Self {
            extensions: extensions.into_iter().collect(),
        }
    }
}

impl FileFilter for ExtensionFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        path.extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

/// Combines multiple filters with AND logic.
///
/// An empty composite accepts everything.
///
/// # Examples
///
/// ```
/// use rm_watcher::{CompositeFilter, ExtensionFilter, FileFilter, GeneratedArtifactFilter};
/// use camino::Utf8Path;
///
/// let filter = CompositeFilter::new()
///     .and(GeneratedArtifactFilter)
///     .and(ExtensionFilter::new(&["py", "md"]));
///
/// assert!(filter.should_process(Utf8Path::new("docs/notes.md")));
/// assert!(!filter.should_process(Utf8Path::new("repomap.md")));
/// ```
#[derive(Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
    /// Creates an empty composite filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the composite.
    #[must_use]
    pub fn and<F: FileFilter>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl FileFilter for CompositeFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        self.filters.is_empty() || self.filters.iter().all(|f| f.should_process(path))
    }
}

impl<F: FileFilter + ?Sized> FileFilter for Box<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

impl<F: FileFilter + ?Sized> FileFilter for std::sync::Arc<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all_filter() {
        let filter = AcceptAllFilter;
        assert!(filter.should_process(Utf8Path::new("anything.txt")));
        assert!(filter.should_process(Utf8Path::new("repomap.md")));
    }

    #[test]
    fn test_generated_artifact_filter() {
        let filter = GeneratedArtifactFilter;
        assert!(!filter.should_process(Utf8Path::new("repomap.md")));
        assert!(!filter.should_process(Utf8Path::new("/abs/project/repomap.md")));
        assert!(!filter.should_process(Utf8Path::new(".ignore")));
        assert!(filter.should_process(Utf8Path::new("src/main.py")));
        assert!(filter.should_process(Utf8Path::new("notes.md")));
    }

    #[test]
    fn test_extension_filter() {
        let filter = ExtensionFilter::new(&["py", "rs"]);
        assert!(filter.should_process(Utf8Path::new("src/main.py")));
        assert!(filter.should_process(Utf8Path::new("lib.rs")));
        assert!(!filter.should_process(Utf8Path::new("app.js")));
        assert!(!filter.should_process(Utf8Path::new("Makefile")));
    }

    #[test]
    fn test_composite_filter() {
        let filter = CompositeFilter::new()
            .and(GeneratedArtifactFilter)
            .and(ExtensionFilter::new(&["md"]));

        assert!(filter.should_process(Utf8Path::new("docs/guide.md")));
        assert!(!filter.should_process(Utf8Path::new("repomap.md")));
        assert!(!filter.should_process(Utf8Path::new("main.py")));
    }

    #[test]
    fn test_composite_filter_empty_accepts_all() {
        assert!(CompositeFilter::new().should_process(Utf8Path::new("anything")));
    }

    #[test]
    fn test_boxed_and_arc_filters() {
        let boxed: Box<dyn FileFilter> = Box::new(GeneratedArtifactFilter);
        assert!(!boxed.should_process(Utf8Path::new(".ignore")));

        let shared = std::sync::Arc::new(GeneratedArtifactFilter);
        assert!(shared.should_process(Utf8Path::new("src/app.py")));
    }
}
