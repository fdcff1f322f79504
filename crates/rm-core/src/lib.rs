//! Core types, errors, and configuration for the repomap engine.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`ProjectStatus`] and [`TrackedProject`] - the per-root lifecycle state
//! - [`FileNode`] - the owned file tree produced by each scan
//! - [`Config`], [`Limits`] and friends - configuration with JSON persistence
//! - [`ConfigError`] - configuration failure modes
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)
//!
//! # Crate Dependencies
//!
//! ```text
//! rm-cli ──► rm-tracker ──► rm-scanner ──► rm-core
//!                       ├─► rm-watcher ──────────►
//!                       └─► rm-analyzer ─────────►
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{
    default_config_dir, Config, Limits, TrackerConfig, WatchConfig, ARTIFACT_FILE_NAME,
    GENERATED_FILES, IGNORE_FILE_NAME,
};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet};
pub use types::{ClassInfo, FileAnalysis, FileNode, FunctionInfo, ProjectStatus, TrackedProject};
