//! Scan statistics tracking.
//!
//! Counters use relaxed atomics so a scan running on a blocking thread can
//! be observed from async code without locking. [`ScanStats::snapshot`]
//! produces a consistent-enough point-in-time copy for logging and
//! progress display.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for a scan in progress.
#[derive(Debug, Default)]
pub struct ScanStats {
    files_counted: AtomicU64,
    lines_counted: AtomicU64,
    dirs_visited: AtomicU64,
    entries_ignored: AtomicU64,
    branches_truncated: AtomicU64,
    oversized_files: AtomicU64,
}

impl ScanStats {
    /// Creates a new zeroed stats instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a counted file and its lines.
    #[inline]
    pub fn record_file(&self, lines: u64) {
        self.files_counted.fetch_add(1, Ordering::Relaxed);
        self.lines_counted.fetch_add(lines, Ordering::Relaxed);
    }

    /// Records a visited directory.
    #[inline]
    pub fn record_dir(&self) {
        self.dirs_visited.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an entry skipped by ignore rules.
    #[inline]
    pub fn record_ignored(&self) {
        self.entries_ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a branch dropped by a resource limit.
    #[inline]
    pub fn record_truncated(&self) {
        self.branches_truncated.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a file too large to line-count.
    #[inline]
    pub fn record_oversized(&self) {
        self.oversized_files.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of files counted so far.
    #[inline]
    #[must_use]
    pub fn files_counted(&self) -> u64 {
        self.files_counted.load(Ordering::Relaxed)
    }

    /// Takes a point-in-time snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            files_counted: self.files_counted.load(Ordering::Relaxed),
            lines_counted: self.lines_counted.load(Ordering::Relaxed),
            dirs_visited: self.dirs_visited.load(Ordering::Relaxed),
            entries_ignored: self.entries_ignored.load(Ordering::Relaxed),
            branches_truncated: self.branches_truncated.load(Ordering::Relaxed),
            oversized_files: self.oversized_files.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero for a fresh scan.
    pub fn reset(&self) {
        self.files_counted.store(0, Ordering::Relaxed);
        self.lines_counted.store(0, Ordering::Relaxed);
        self.dirs_visited.store(0, Ordering::Relaxed);
        self.entries_ignored.store(0, Ordering::Relaxed);
        self.branches_truncated.store(0, Ordering::Relaxed);
        self.oversized_files.store(0, Ordering::Relaxed);
    }
}

/// Owned copy of the counters at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Files counted.
    pub files_counted: u64,
    /// Lines counted across all files.
    pub lines_counted: u64,
    /// Directories visited.
    pub dirs_visited: u64,
    /// Entries skipped by ignore rules.
    pub entries_ignored: u64,
    /// Branches dropped by depth or file-count limits.
    pub branches_truncated: u64,
    /// Files too large to line-count.
    pub oversized_files: u64,
}

impl StatsSnapshot {
    /// Returns `true` if any branch was dropped by a resource limit.
    #[must_use]
    pub const fn was_truncated(&self) -> bool {
        self.branches_truncated > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_snapshot() {
        let stats = ScanStats::new();
        stats.record_file(10);
        stats.record_file(5);
        stats.record_dir();
        stats.record_ignored();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.files_counted, 2);
        assert_eq!(snapshot.lines_counted, 15);
        assert_eq!(snapshot.dirs_visited, 1);
        assert_eq!(snapshot.entries_ignored, 1);
        assert!(!snapshot.was_truncated());
    }

    #[test]
    fn test_reset() {
        let stats = ScanStats::new();
        stats.record_file(100);
        stats.record_truncated();
        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }
}
