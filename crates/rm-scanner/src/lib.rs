//! Directory scanning for the repomap engine.
//!
//! # Overview
//!
//! This crate turns a project root into everything a tracker needs to
//! describe it: a file tree with line counts, per-extension totals,
//! language and framework detection, and the rendered `repomap.md`
//! artifact. Ignore rules come from a per-project `.ignore` file with
//! gitignore-flavored patterns.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐    ┌──────────────┐    ┌───────────────┐
//! │ IgnoreRules │───►│   Scanner    │───►│  ScanOutcome  │
//! │  (.ignore)  │    │  (walk_dir)  │    │ tree + totals │
//! └─────────────┘    └──────┬───────┘    └───────┬───────┘
//!                           │                    │
//!                    ┌──────▼───────┐    ┌───────▼───────┐
//!                    │  ScanStats   │    │  repomap.md   │
//!                    │  (atomics)   │    │  (artifact)   │
//!                    └──────────────┘    └───────────────┘
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use rm_core::Limits;
//! use rm_scanner::{ensure_ignore_file, IgnoreRules, NoProgress, Scanner};
//!
//! let root = Utf8Path::new("/projects/demo");
//! ensure_ignore_file(root)?;
//! let rules = IgnoreRules::load(&root.join(".ignore"));
//! let outcome = Scanner::new(Limits::default()).scan(root, &rules, &NoProgress)?;
//! println!("{}: {} files", outcome.primary_language, outcome.total_files);
//! # Ok::<(), rm_scanner::ScanError>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod language;
pub mod rules;
pub mod stats;
pub mod walker;

pub use artifact::{render_artifact, render_tree, write_artifact, ArtifactInput};
pub use error::ScanError;
pub use language::{detect_frameworks, detect_primary_language};
pub use rules::{default_ignore_contents, ensure_ignore_file, IgnoreRules};
pub use stats::{ScanStats, StatsSnapshot};
pub use walker::{extension_key, NoProgress, ProgressReporter, ScanOutcome, Scanner};
