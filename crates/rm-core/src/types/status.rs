//! Project lifecycle status.
//!
//! Every tracked project moves through a small state machine:
//!
//! ```text
//!                ┌──────────────┐
//!     add/change │  Processing  │◄──────────┐
//!                └──────┬───────┘           │
//!                       │ (analysis on)     │ file change
//!                ┌──────▼───────┐           │
//!                │  Analyzing   │           │
//!                └──────┬───────┘           │
//!                       │                   │
//!           ┌───────────┴──────────┐        │
//!     ┌─────▼─────┐          ┌─────▼─────┐  │
//!     │   Ready   │          │   Error   │──┘
//!     └───────────┘          └───────────┘
//! ```
//!
//! `Ready` and `Error` are terminal for a given scan: a consumer sees
//! exactly one of them per scan, after zero or more progress updates.

use serde::{Deserialize, Serialize};

/// The lifecycle status of a tracked project.
///
/// # Examples
///
/// ```
/// use rm_core::ProjectStatus;
///
/// let status = ProjectStatus::Processing;
/// assert!(!status.is_terminal());
/// assert_eq!(status.label(), "Processing");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// A scan is in progress.
    #[default]
    Processing,
    /// The scan finished and per-file analysis is running.
    Analyzing,
    /// The latest scan completed successfully.
    Ready,
    /// The latest scan failed.
    Error,
}

impl ProjectStatus {
    /// Returns a human-readable label for this status.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Analyzing => "Analyzing",
            Self::Ready => "Ready",
            Self::Error => "Error",
        }
    }

    /// Returns `true` if this status ends a scan cycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }

    /// Returns `true` if a scan is currently running for this project.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Processing | Self::Analyzing)
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_processing() {
        assert_eq!(ProjectStatus::default(), ProjectStatus::Processing);
    }

    #[test]
    fn test_terminal_states() {
        assert!(ProjectStatus::Ready.is_terminal());
        assert!(ProjectStatus::Error.is_terminal());
        assert!(!ProjectStatus::Processing.is_terminal());
        assert!(!ProjectStatus::Analyzing.is_terminal());
    }

    #[test]
    fn test_busy_states() {
        assert!(ProjectStatus::Processing.is_busy());
        assert!(ProjectStatus::Analyzing.is_busy());
        assert!(!ProjectStatus::Ready.is_busy());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&ProjectStatus::Processing).unwrap();
        assert_eq!(json, r#""processing""#);
        let back: ProjectStatus = serde_json::from_str(r#""ready""#).unwrap();
        assert_eq!(back, ProjectStatus::Ready);
    }

    #[test]
    fn test_display() {
        assert_eq!(ProjectStatus::Analyzing.to_string(), "Analyzing");
    }
}
