//! Configuration types and persistence for the repomap engine.
//!
//! # Overview
//!
//! Configuration lives in a single JSON file under the platform data
//! directory (see [`default_config_dir`]). All fields carry defaults so a
//! missing or partial file always deserializes into something usable. A
//! corrupt file is logged and replaced by defaults rather than failing
//! startup.
//!
//! # Examples
//!
//! ```
//! use rm_core::{Config, Limits};
//!
//! let config = Config::default();
//! assert_eq!(config.limits.max_depth, Limits::default().max_depth);
//! assert!(config.tracked_roots.is_empty());
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::ConfigError;

/// File name of the generated Markdown artifact written into each project
/// root.
pub const ARTIFACT_FILE_NAME: &str = "repomap.md";

/// File name of the per-project ignore rules file.
pub const IGNORE_FILE_NAME: &str = ".ignore";

/// Base names of files this tool generates itself. These are always
/// excluded from scans regardless of ignore rules, so a scan never feeds
/// on its own output.
pub const GENERATED_FILES: [&str; 2] = [ARTIFACT_FILE_NAME, IGNORE_FILE_NAME];

/// File name of the persisted configuration.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Resource limits applied to every directory scan.
///
/// All limits are soft: hitting one truncates the affected branch and logs
/// a warning, it never fails the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum directory nesting depth. Branches deeper than this are
    /// dropped.
    pub max_depth: usize,

    /// Maximum number of files counted across the whole project. Once
    /// reached, remaining directories are skipped.
    pub max_files: u64,

    /// Files larger than this (in bytes) report zero lines instead of
    /// being read.
    pub max_file_size_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 20,
            max_files: 10_000,
            max_file_size_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Configuration for the file watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window in milliseconds for coalescing raw filesystem
    /// events before they reach the tracker.
    pub debounce_ms: u64,

    /// Whether to watch directories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            recursive: true,
        }
    }
}

/// Configuration for the project tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Quiet period in milliseconds after the last filesystem change
    /// before a rescan is triggered.
    pub rescan_delay_ms: u64,

    /// Capacity of the bounded update channel between the tracker and its
    /// consumer.
    pub channel_capacity: usize,

    /// Maximum number of messages a consumer drains per tick.
    pub batch_size: usize,

    /// Emit a progress update every N files during a scan.
    pub progress_interval: u64,

    /// Maximum number of files analyzed per scan.
    pub analyzer_file_limit: usize,

    /// Files larger than this (in bytes) are skipped by the analyzer.
    pub analyzer_max_file_size: u64,

    /// Maximum number of functions reported per analyzed file.
    pub analyzer_max_functions: usize,

    /// How long to wait in milliseconds for a watcher task to stop before
    /// force-detaching it.
    pub watcher_stop_timeout_ms: u64,

    /// Hard deadline in milliseconds for a full tracker shutdown.
    pub shutdown_timeout_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            rescan_delay_ms: 1_000,
            channel_capacity: 1_000,
            batch_size: 50,
            progress_interval: 100,
            analyzer_file_limit: 100,
            analyzer_max_file_size: 1024 * 1024,
            analyzer_max_functions: 50,
            watcher_stop_timeout_ms: 2_000,
            shutdown_timeout_ms: 5_000,
        }
    }
}

/// Top-level application configuration.
///
/// Every field has a default, so partial configuration files deserialize
/// cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan resource limits.
    pub limits: Limits,

    /// File watcher settings.
    pub watch: WatchConfig,

    /// Tracker settings.
    pub tracker: TrackerConfig,

    /// Project roots tracked across restarts.
    pub tracked_roots: Vec<Utf8PathBuf>,

    /// Whether per-file analysis runs during scans.
    pub analysis_enabled: bool,
}

impl Config {
    /// Loads configuration from the given file.
    ///
    /// A missing file yields defaults silently. An unreadable or corrupt
    /// file logs an error and yields defaults, so a bad config never
    /// prevents startup.
    #[must_use]
    pub fn load(path: &Utf8Path) -> Self {
        if !path.exists() {
            debug!(path = %path, "no configuration file, using defaults");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path, "loaded configuration");
                    config
                }
                Err(e) => {
                    error!(path = %path, error = %e, "invalid configuration file, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                error!(path = %path, error = %e, "failed to read configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Saves configuration to the given file, creating parent directories
    /// as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file or its parent directories
    /// cannot be written, or [`ConfigError::Parse`] if serialization fails.
    pub fn save(&self, path: &Utf8Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        debug!(path = %path, "saved configuration");
        Ok(())
    }

    /// Returns the default configuration file path under the platform data
    /// directory, or `None` if no home directory can be determined.
    #[must_use]
    pub fn default_path() -> Option<Utf8PathBuf> {
        default_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
    }
}

/// Returns the platform-specific data directory for this application.
///
/// - Windows: `%LOCALAPPDATA%` (or `%APPDATA%`) `\Repomap`
/// - macOS: `~/Library/Application Support/Repomap`
/// - other: `$XDG_DATA_HOME/repomap` or `~/.local/share/repomap`
///
/// Returns `None` when the relevant environment variables are unset.
#[must_use]
pub fn default_config_dir() -> Option<Utf8PathBuf> {
    if cfg!(target_os = "windows") {
        let base = std::env::var("LOCALAPPDATA")
            .or_else(|_| std::env::var("APPDATA"))
            .ok()?;
        Some(Utf8PathBuf::from(base).join("Repomap"))
    } else if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").ok()?;
        Some(Utf8PathBuf::from(home).join("Library/Application Support/Repomap"))
    } else {
        match std::env::var("XDG_DATA_HOME") {
            Ok(xdg) if !xdg.is_empty() => Some(Utf8PathBuf::from(xdg).join("repomap")),
            _ => {
                let home = std::env::var("HOME").ok()?;
                Some(Utf8PathBuf::from(home).join(".local/share/repomap"))
            }
        }
    }
}
