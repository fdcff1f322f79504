//! Per-project tracking state.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::types::status::ProjectStatus;

/// Snapshot of everything known about a tracked project root.
///
/// The tracker hands out owned copies of this struct; mutating a copy
/// never affects the tracker's internal state.
///
/// # Examples
///
/// ```
/// use rm_core::{ProjectStatus, TrackedProject};
/// use camino::Utf8PathBuf;
///
/// let project = TrackedProject::new("demo", Utf8PathBuf::from("/tmp/demo"));
/// assert_eq!(project.status, ProjectStatus::Processing);
/// assert_eq!(project.total_files, 0);
/// assert_eq!(project.primary_language, "Unknown");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedProject {
    /// Display name, normally the root directory's base name.
    pub name: String,

    /// Absolute path of the project root.
    pub path: Utf8PathBuf,

    /// Current lifecycle status.
    pub status: ProjectStatus,

    /// Number of files counted by the latest scan.
    pub total_files: u64,

    /// Sum of line counts across all counted files.
    pub total_lines: u64,

    /// Number of files that went through per-file analysis.
    pub analyzed_files: u64,

    /// Total functions found across analyzed files.
    pub total_functions: u64,

    /// Dominant language by file count, or `"Unknown"`.
    pub primary_language: String,

    /// Frameworks detected from marker files at the project root.
    pub frameworks: Vec<String>,

    /// Error description when `status` is [`ProjectStatus::Error`].
    pub error_message: Option<String>,

    /// Unix timestamp (seconds) of the last state change.
    pub last_updated: u64,

    /// Whether per-file analysis is enabled for this project.
    pub analysis_enabled: bool,
}

impl TrackedProject {
    /// Creates a freshly-added project in the [`ProjectStatus::Processing`]
    /// state with empty scan results.
    #[must_use]
    pub fn new(name: impl Into<String>, path: Utf8PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
            status: ProjectStatus::Processing,
            total_files: 0,
            total_lines: 0,
            analyzed_files: 0,
            total_functions: 0,
            primary_language: "Unknown".to_owned(),
            frameworks: Vec::new(),
            error_message: None,
            last_updated: unix_now(),
            analysis_enabled: false,
        }
    }

    /// Updates `last_updated` to the current time.
    pub fn touch(&mut self) {
        self.last_updated = unix_now();
    }

    /// Moves the project into a new status, clearing any stale error
    /// message unless the new status is [`ProjectStatus::Error`].
    pub fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
        if status != ProjectStatus::Error {
            self.error_message = None;
        }
        self.touch();
    }
}

/// Current Unix time in seconds. Clock-before-epoch is treated as zero.
#[must_use]
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_defaults() {
        let project = TrackedProject::new("demo", Utf8PathBuf::from("/tmp/demo"));
        assert_eq!(project.name, "demo");
        assert_eq!(project.status, ProjectStatus::Processing);
        assert_eq!(project.primary_language, "Unknown");
        assert!(project.frameworks.is_empty());
        assert!(project.error_message.is_none());
        assert!(project.last_updated > 0);
    }

    #[test]
    fn test_set_status_clears_error_message() {
        let mut project = TrackedProject::new("demo", Utf8PathBuf::from("/tmp/demo"));
        project.error_message = Some("scan failed".to_owned());
        project.set_status(ProjectStatus::Ready);
        assert!(project.error_message.is_none());

        project.error_message = Some("scan failed".to_owned());
        project.set_status(ProjectStatus::Error);
        assert_eq!(project.error_message.as_deref(), Some("scan failed"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let project = TrackedProject::new("demo", Utf8PathBuf::from("/tmp/demo"));
        let json = serde_json::to_string(&project).unwrap();
        let back: TrackedProject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, project);
    }
}
