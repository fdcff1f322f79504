//! File watcher with async event streaming.
//!
//! # Architecture
//!
//! The synchronous `notify` watcher runs on a blocking thread and feeds a
//! tokio channel, so the tracker consumes changes from async code:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                 Blocking Thread (spawn_blocking)               │
//! │  ┌───────────────────┐   ┌───────────────┐   ┌─────────────┐  │
//! │  │ RecommendedWatcher│──►│ Debouncer     │──►│ FileFilter  │  │
//! │  │ (notify)          │   │ (100ms window)│   │ (artifacts) │  │
//! │  └───────────────────┘   └───────────────┘   └──────┬──────┘  │
//! └──────────────────────────────────────────────────────│─────────┘
//!                                          blocking_send │
//!                                                        ▼
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     Async Runtime (tokio)                      │
//! │  ┌───────────────────┐   ┌────────────────┐                    │
//! │  │ FileWatcher       │   │ mpsc::Receiver │──► tracker pump    │
//! │  │ (shutdown ctrl)   │   │ (events)       │                    │
//! │  └───────────────────┘   └────────────────┘                    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use rm_core::WatchConfig;

use crate::error::WatchError;
use crate::events::FileEvent;
use crate::filter::FileFilter;

/// Default channel capacity for file events.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// A file watcher that streams debounced change events to async code.
///
/// # Lifecycle
///
/// 1. **Creation**: `FileWatcher::new()` validates the path, creates the
///    channels, and spawns a blocking task running the notify watcher.
/// 2. **Reception**: `recv()`/`try_recv()` yield already-filtered events.
/// 3. **Shutdown**: `shutdown()` stops the blocking task and awaits it;
///    dropping the watcher sends the stop signal without awaiting.
///
/// # Examples
///
/// ```no_run
/// use rm_watcher::{FileWatcher, GeneratedArtifactFilter};
/// use rm_core::WatchConfig;
/// use camino::Utf8Path;
///
/// # async fn example() -> Result<(), rm_watcher::WatchError> {
/// let mut watcher = FileWatcher::new(
///     Utf8Path::new("/projects/demo"),
///     &WatchConfig::default(),
///     GeneratedArtifactFilter,
/// ).await?;
///
/// while let Some(event) = watcher.recv().await {
///     println!("changed: {}", event.path);
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileWatcher {
    /// Signals the blocking task to stop. `None` once shutdown started.
    shutdown_tx: Option<oneshot::Sender<()>>,

    /// Handle to the blocking watcher task, awaited during shutdown.
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,

    /// Event receiver for async consumption.
    event_rx: mpsc::Receiver<FileEvent>,

    /// The path being watched.
    watch_path: Utf8PathBuf,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("watch_path", &self.watch_path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Creates a watcher for the given project root.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if the path does not exist and
    /// [`WatchError::Notify`] if the backend fails to initialize.
    pub async fn new<F: FileFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
    ) -> Result<Self, WatchError> {
        Self::with_capacity(path, config, filter, DEFAULT_CHANNEL_CAPACITY).await
    }

    /// Creates a watcher with a custom event channel capacity.
    ///
    /// Larger capacities absorb bursts of changes without back-pressuring
    /// the watcher thread.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`FileWatcher::new`].
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn with_capacity<F: FileFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        if !path.exists() {
            return Err(WatchError::path_not_found(path));
        }

        let watch_path = path.canonicalize_utf8().map_err(WatchError::Io)?;

        let (event_tx, event_rx) = mpsc::channel(channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_path = watch_path.clone();
        let debounce_ms = config.debounce_ms;
        let recursive = config.recursive;

        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(
                task_path,
                debounce_ms,
                recursive,
                event_tx,
                shutdown_rx,
                filter,
            )
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            watch_path,
        })
    }

    /// Receives the next file event.
    ///
    /// Returns `None` once the watcher has shut down.
    pub async fn recv(&mut self) -> Option<FileEvent> {
        self.event_rx.recv().await
    }

    /// Tries to receive a file event without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`mpsc::error::TryRecvError::Empty`] when no event is
    /// queued and `Disconnected` after shutdown.
    pub fn try_recv(&mut self) -> Result<FileEvent, mpsc::error::TryRecvError> {
        self.event_rx.try_recv()
    }

    /// Returns the event receiver for direct use with `tokio::select!`.
    pub fn events(&mut self) -> &mut mpsc::Receiver<FileEvent> {
        &mut self.event_rx
    }

    /// Returns the path being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns `true` if the watcher task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Gracefully shuts down the watcher and awaits the blocking task.
    ///
    /// # Errors
    ///
    /// Propagates any error the watcher task ended with, or
    /// [`WatchError::ChannelClosed`] if the task panicked.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // Receiver may already be gone.
            let _ = tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(WatchError::ChannelClosed),
            }
        }

        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        // Drop is sync, so signal the task and let it stop on its own.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Runs the notify debouncer on a blocking thread, forwarding filtered
/// events into the async channel until the shutdown signal arrives.
#[allow(clippy::needless_pass_by_value)] // Path must be owned for the blocking task lifetime
fn run_watcher_loop<F: FileFilter>(
    path: Utf8PathBuf,
    debounce_ms: u64,
    recursive: bool,
    event_tx: mpsc::Sender<FileEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    filter: F,
) -> Result<(), WatchError> {
    let window = Duration::from_millis(debounce_ms);

    let tx = event_tx;
    let debouncer_result: Result<Debouncer<notify::RecommendedWatcher>, notify::Error> =
        new_debouncer(window, move |res: DebounceEventResult| match res {
            Ok(events) => {
                for event in events {
                    let utf8_path = match Utf8PathBuf::try_from(event.path) {
                        Ok(p) => p,
                        Err(e) => {
                            let invalid_path = e.into_path_buf();
                            tracing::warn!(
                                path = %invalid_path.display(),
                                "skipping non-UTF-8 path in file event"
                            );
                            continue;
                        }
                    };

                    if !filter.should_process(&utf8_path) {
                        tracing::trace!(path = %utf8_path, "filtered out file event");
                        continue;
                    }

                    if tx.blocking_send(FileEvent::new(utf8_path)).is_err() {
                        tracing::debug!("event channel closed, stopping watcher");
                        break;
                    }
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "debouncer error");
            }
        });

    let mut debouncer = debouncer_result?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    debouncer.watcher().watch(path.as_std_path(), mode)?;

    tracing::info!(path = %path, recursive, "file watcher started");

    // Block until the shutdown signal; the debouncer keeps running on its
    // own threads until dropped.
    let _ = shutdown_rx.blocking_recv();

    tracing::info!(path = %path, "file watcher stopped");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AcceptAllFilter, GeneratedArtifactFilter};
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp directory")
    }

    fn fast_config() -> WatchConfig {
        WatchConfig {
            debounce_ms: 50,
            recursive: true,
        }
    }

    #[tokio::test]
    async fn test_watcher_creation() {
        let temp_dir = create_temp_dir();
        let path = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let watcher = FileWatcher::new(path, &WatchConfig::default(), AcceptAllFilter).await;

        assert!(watcher.is_ok());
        let watcher = watcher.expect("Watcher should be created");
        assert!(watcher.is_running());
    }

    #[tokio::test]
    async fn test_watcher_path_not_found() {
        let path = Utf8Path::new("/nonexistent/path/that/does/not/exist");

        let result = FileWatcher::new(path, &WatchConfig::default(), AcceptAllFilter).await;

        match result {
            Err(WatchError::PathNotFound(_)) => {}
            other => panic!("Expected PathNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_watcher_shutdown() {
        let temp_dir = create_temp_dir();
        let path = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let watcher = FileWatcher::new(path, &WatchConfig::default(), AcceptAllFilter)
            .await
            .expect("Failed to create watcher");

        let result = watcher.shutdown().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_watcher_receives_events() {
        let temp_dir = create_temp_dir();
        let path = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let mut watcher = FileWatcher::new(path, &fast_config(), AcceptAllFilter)
            .await
            .expect("Failed to create watcher");

        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "hello").expect("Failed to write file");

        let event = tokio::time::timeout(Duration::from_secs(2), watcher.recv()).await;

        watcher.shutdown().await.expect("Shutdown failed");

        // Timing-dependent; only assert on the event when one arrived.
        if let Ok(Some(event)) = event {
            assert!(event.path.as_str().contains("test.txt"));
        }
    }

    #[tokio::test]
    async fn test_watcher_filters_generated_artifacts() {
        let temp_dir = create_temp_dir();
        let path = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let mut watcher = FileWatcher::new(path, &fast_config(), GeneratedArtifactFilter)
            .await
            .expect("Failed to create watcher");

        fs::write(temp_dir.path().join("repomap.md"), "# generated").expect("write failed");

        let event = tokio::time::timeout(Duration::from_millis(400), watcher.recv()).await;
        assert!(event.is_err(), "artifact write must not produce an event");

        watcher.shutdown().await.expect("Shutdown failed");
    }

    #[tokio::test]
    async fn test_watcher_with_capacity() {
        let temp_dir = create_temp_dir();
        let path = Utf8Path::from_path(temp_dir.path()).expect("Invalid path");

        let watcher =
            FileWatcher::with_capacity(path, &WatchConfig::default(), AcceptAllFilter, 50)
                .await
                .expect("Failed to create watcher");

        assert!(watcher.is_running());
        assert!(!watcher.watch_path().as_str().is_empty());
    }
}
