//! File watching and change debouncing for the repomap engine.
//!
//! # Overview
//!
//! Two building blocks live here:
//!
//! - [`FileWatcher`] bridges the synchronous `notify` watcher to tokio,
//!   streaming filtered, debounced [`FileEvent`]s per project root.
//! - [`DebounceScheduler`] coalesces those events into at most one
//!   pending rescan per project.
//!
//! The watcher's short debounce window (100ms) absorbs editor write
//! storms; the scheduler's longer delay (1s) decides when a project has
//! actually gone quiet.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod debounce;
pub mod error;
pub mod events;
pub mod filter;
pub mod watcher;

pub use debounce::DebounceScheduler;
pub use error::WatchError;
pub use events::FileEvent;
pub use filter::{
    AcceptAllFilter, CompositeFilter, ExtensionFilter, FileFilter, GeneratedArtifactFilter,
};
pub use watcher::FileWatcher;
