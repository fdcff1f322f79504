//! Recursive directory walking.
//!
//! # Overview
//!
//! The walker turns a project root into a [`FileNode`] tree plus totals,
//! honoring ignore rules and resource limits along the way. Limits never
//! fail a scan: an over-deep branch or a project over the file cap is
//! truncated with a warning and the walk keeps going.
//!
//! The walk is deliberately single-threaded. Its two shared caps (depth
//! and total file count) make ordering matter, and child entries are
//! visited in case-insensitive name order with directories first so the
//! same tree always produces the same totals and the same artifact.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use rm_core::{FileNode, FxHashMap, Limits};

use crate::error::ScanError;
use crate::language::{detect_frameworks, detect_primary_language};
use crate::rules::IgnoreRules;
use crate::stats::ScanStats;

/// Receives human-readable progress lines during a walk.
///
/// Implementations must be cheap and non-blocking; the walker calls them
/// from its (blocking) scan thread.
pub trait ProgressReporter: Send + Sync {
    /// Reports one progress line.
    fn report(&self, message: &str);
}

/// A [`ProgressReporter`] that discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _message: &str) {}
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for Box<R> {
    fn report(&self, message: &str) {
        (**self).report(message);
    }
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for std::sync::Arc<R> {
    fn report(&self, message: &str) {
        (**self).report(message);
    }
}

/// Everything a completed walk produces.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// The scanned file tree, rooted at the project directory.
    pub tree: FileNode,
    /// Number of files counted.
    pub total_files: u64,
    /// Sum of line counts across counted files.
    pub total_lines: u64,
    /// File counts per lowercased extension (empty string for none).
    pub file_types: FxHashMap<String, u64>,
    /// Dominant language, or `"Unknown"`.
    pub primary_language: String,
    /// Frameworks detected at the project root.
    pub frameworks: Vec<String>,
}

struct WalkState {
    total_files: u64,
    total_lines: u64,
    file_types: FxHashMap<String, u64>,
    last_progress_at: u64,
}

/// Scans project directories into [`ScanOutcome`] values.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use rm_core::Limits;
/// use rm_scanner::{IgnoreRules, NoProgress, Scanner};
///
/// let scanner = Scanner::new(Limits::default());
/// let rules = IgnoreRules::default();
/// let outcome = scanner.scan(Utf8Path::new("/projects/demo"), &rules, &NoProgress)?;
/// println!("{} files, {} lines", outcome.total_files, outcome.total_lines);
/// # Ok::<(), rm_scanner::ScanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Scanner {
    limits: Limits,
    progress_interval: u64,
    stats: Arc<ScanStats>,
}

impl Scanner {
    /// Creates a scanner with the given resource limits.
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            progress_interval: 100,
            stats: Arc::new(ScanStats::new()),
        }
    }

    /// Sets how often (in files) a "Processed N files..." progress line is
    /// emitted.
    #[must_use]
    pub const fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Returns a handle to the live scan statistics.
    #[must_use]
    pub fn stats(&self) -> Arc<ScanStats> {
        Arc::clone(&self.stats)
    }

    /// Walks `root` and returns the resulting tree and totals.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if `root` is not a directory. All
    /// other filesystem trouble is logged and skipped in place.
    pub fn scan(
        &self,
        root: &Utf8Path,
        rules: &IgnoreRules,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanOutcome, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::config(format!("not a directory: {root}")));
        }
        self.stats.reset();

        let mut state = WalkState {
            total_files: 0,
            total_lines: 0,
            file_types: FxHashMap::default(),
            last_progress_at: 0,
        };
        let tree = self.walk_dir(root, root, 0, rules, reporter, &mut state);

        let primary_language = detect_primary_language(&state.file_types);
        let frameworks = detect_frameworks(root);

        Ok(ScanOutcome {
            tree,
            total_files: state.total_files,
            total_lines: state.total_lines,
            file_types: state.file_types,
            primary_language,
            frameworks,
        })
    }

    fn walk_dir(
        &self,
        dir: &Utf8Path,
        root: &Utf8Path,
        depth: usize,
        rules: &IgnoreRules,
        reporter: &dyn ProgressReporter,
        state: &mut WalkState,
    ) -> FileNode {
        let mut node = FileNode::new_dir();

        if depth > self.limits.max_depth {
            warn!(path = %dir, depth, "maximum depth reached, truncating branch");
            self.stats.record_truncated();
            return node;
        }
        if state.total_files >= self.limits.max_files {
            warn!(path = %dir, files = state.total_files, "file limit reached, truncating branch");
            self.stats.record_truncated();
            return node;
        }

        self.stats.record_dir();
        if depth <= 2 {
            let rel = relative_label(dir, root);
            reporter.report(&format!("Scanning: {rel}"));
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir, error = %e, "cannot read directory, skipping subtree");
                return node;
            }
        };

        let mut subdirs: Vec<Utf8PathBuf> = Vec::new();
        let mut files: Vec<Utf8PathBuf> = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = %dir, error = %e, "unreadable directory entry, skipping");
                    continue;
                }
            };
            let path = match Utf8PathBuf::from_path_buf(entry.path()) {
                Ok(path) => path,
                Err(raw) => {
                    warn!(path = %raw.display(), "non-UTF-8 path, skipping");
                    continue;
                }
            };
            // metadata() follows symlinks, same as the directory check the
            // rest of the walk relies on. Broken links just vanish.
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => subdirs.push(path),
                Ok(_) => files.push(path),
                Err(e) => {
                    debug!(path = %path, error = %e, "cannot stat entry, skipping");
                }
            }
        }
        sort_case_insensitive(&mut subdirs);
        sort_case_insensitive(&mut files);

        for subdir in subdirs {
            let rel = relative_slash_path(&subdir, root);
            if rules.is_ignored(&rel, true) {
                self.stats.record_ignored();
                continue;
            }
            let child = self.walk_dir(&subdir, root, depth + 1, rules, reporter, state);
            // Directories emptied by filtering disappear from the tree.
            if !child.is_empty_dir() {
                if let Some(name) = subdir.file_name() {
                    node.insert_child(name, child);
                }
            }
        }

        for file in files {
            // The cap applies per file, not just per directory, so one
            // large directory cannot blow past it.
            if state.total_files >= self.limits.max_files {
                warn!(path = %dir, files = state.total_files, "file limit reached, truncating branch");
                self.stats.record_truncated();
                break;
            }
            let rel = relative_slash_path(&file, root);
            if rules.is_ignored(&rel, false) {
                self.stats.record_ignored();
                continue;
            }
            let lines = self.count_lines(&file);
            let ext = extension_key(&file);
            *state.file_types.entry(ext).or_insert(0) += 1;
            state.total_files += 1;
            state.total_lines += lines;
            self.stats.record_file(lines);

            if self.progress_interval > 0
                && state.total_files - state.last_progress_at >= self.progress_interval
            {
                state.last_progress_at = state.total_files;
                reporter.report(&format!("Processed {} files...", state.total_files));
            }

            if let Some(name) = file.file_name() {
                node.insert_child(name, FileNode::new_file(lines));
            }
        }

        node
    }

    /// Counts lines in a file. Files over the size limit report zero
    /// lines; unreadable files likewise.
    fn count_lines(&self, path: &Utf8Path) -> u64 {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > self.limits.max_file_size_bytes => {
                warn!(path = %path, size = meta.len(), "file too large to line-count");
                self.stats.record_oversized();
                return 0;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(path = %path, error = %e, "cannot stat file");
                return 0;
            }
        }
        match std::fs::read(path) {
            Ok(bytes) => count_line_endings(&bytes),
            Err(e) => {
                warn!(path = %path, error = %e, "cannot read file");
                0
            }
        }
    }
}

/// Lines are newline-terminated; a trailing unterminated chunk still
/// counts as one line.
fn count_line_endings(bytes: &[u8]) -> u64 {
    let newlines: u64 = bytes.iter().map(|b| u64::from(*b == b'\n')).sum();
    if bytes.last().is_some_and(|b| *b != b'\n') {
        newlines + 1
    } else {
        newlines
    }
}

fn sort_case_insensitive(paths: &mut [Utf8PathBuf]) {
    paths.sort_by_key(|path| path.file_name().unwrap_or("").to_lowercase());
}

/// Root-relative path with forward slashes, for ignore matching.
fn relative_slash_path(path: &Utf8Path, root: &Utf8Path) -> String {
    path.strip_prefix(root)
        .map_or_else(|_| path.as_str().to_owned(), |rel| rel.as_str().to_owned())
        .replace('\\', "/")
}

/// Progress label for a directory, `"root"` for the root itself.
fn relative_label(dir: &Utf8Path, root: &Utf8Path) -> String {
    let rel = relative_slash_path(dir, root);
    if rel.is_empty() { "root".to_owned() } else { rel }
}

/// Lowercased extension with its leading dot, or an empty string for
/// files without one.
#[must_use]
pub fn extension_key(path: &Utf8Path) -> String {
    path.extension()
        .map_or_else(String::new, |ext| format!(".{}", ext.to_lowercase()))
}
