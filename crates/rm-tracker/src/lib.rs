//! Project tracking and scan orchestration for the repomap engine.
//!
//! # Overview
//!
//! This crate ties the lower layers together into a long-lived service:
//!
//! ```text
//! rm-watcher ──events──► rm-tracker ──walk──► rm-scanner
//!                            │
//!                            ├──analyze──► rm-analyzer
//!                            │
//!                            └──updates──► consumer (CLI, UI)
//! ```
//!
//! [`ProjectTracker`] is the entry point: register a project root, and
//! the tracker scans it, writes its `repomap.md`, watches it for changes,
//! and rescans once it goes quiet. Every state change flows to the
//! consumer through the bounded update channel as an owned snapshot.
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use rm_core::Config;
//! use rm_tracker::ProjectTracker;
//!
//! # async fn demo() -> Result<(), rm_tracker::TrackerError> {
//! let (tracker, mut updates) = ProjectTracker::new(Config::default());
//! tracker.add_project(Utf8Path::new("/home/me/project")).await?;
//!
//! while let Some(message) = updates.recv().await {
//!     println!("{message:?}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod message;
mod scan;
pub mod tracker;

pub use error::TrackerError;
pub use message::{channel, MessageReceiver, MessageSender, UpdateMessage};
pub use tracker::ProjectTracker;
