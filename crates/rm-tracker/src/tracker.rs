//! The project registry and its lifecycle operations.
//!
//! # Overview
//!
//! [`ProjectTracker`] owns every tracked project: its snapshot, its file
//! watcher, and the debounced rescans that file changes schedule.
//!
//! # Architecture
//!
//! ```text
//!           add_project / remove_project / mark_changed
//!                            │
//!                     ProjectTracker
//!                            │
//!          ┌─────────────────┼──────────────────┐
//!          ▼                 ▼                  ▼
//!    projects map     watcher per root    DebounceScheduler
//!    (snapshots)      (pump task each)    (one pending rescan
//!          │                 │             per project)
//!          │                 └── change ──────┘
//!          ▼                                  │
//!    update channel ◄── scan pipeline ◄───────┘
//! ```
//!
//! The tracker is cheap to clone; clones share the same registry. All
//! public accessors hand out owned snapshots, so consumers can never
//! mutate tracked state from outside.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use rm_analyzer::Analyzer;
use rm_core::{Config, FxHashMap, TrackedProject, GENERATED_FILES};
use rm_watcher::{DebounceScheduler, FileWatcher, GeneratedArtifactFilter};

use crate::error::TrackerError;
use crate::message::{channel, MessageReceiver, MessageSender, UpdateMessage};
use crate::scan::run_scan;

/// A running watcher for one project root.
struct WatchHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Shared state behind every [`ProjectTracker`] clone.
pub(crate) struct TrackerInner {
    pub(crate) projects: Mutex<FxHashMap<Utf8PathBuf, TrackedProject>>,
    watchers: Mutex<FxHashMap<Utf8PathBuf, WatchHandle>>,
    pub(crate) scheduler: DebounceScheduler,
    pub(crate) sender: MessageSender,
    pub(crate) analyzer: RwLock<Option<Arc<dyn Analyzer>>>,
    pub(crate) config: Config,
    pub(crate) shutting_down: AtomicBool,
}

/// Tracks projects, watches them for changes, and keeps their artifacts
/// current.
#[derive(Clone)]
pub struct ProjectTracker {
    inner: Arc<TrackerInner>,
}

impl std::fmt::Debug for ProjectTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectTracker")
            .field("projects", &self.inner.projects.lock().len())
            .field("watchers", &self.inner.watchers.lock().len())
            .finish_non_exhaustive()
    }
}

impl ProjectTracker {
    /// Creates a tracker and the receiving half of its update channel.
    #[must_use]
    pub fn new(config: Config) -> (Self, MessageReceiver) {
        let (sender, receiver) = channel(config.tracker.channel_capacity);
        let tracker = Self {
            inner: Arc::new(TrackerInner {
                projects: Mutex::new(FxHashMap::default()),
                watchers: Mutex::new(FxHashMap::default()),
                scheduler: DebounceScheduler::new(),
                sender,
                analyzer: RwLock::new(None),
                config,
                shutting_down: AtomicBool::new(false),
            }),
        };
        (tracker, receiver)
    }

    /// Starts tracking a project.
    ///
    /// Publishes a `Processing` snapshot immediately, starts a file
    /// watcher for the root, and kicks off the initial scan in the
    /// background. A watcher that fails to start is logged; the project
    /// is tracked and scanned regardless, it just will not auto-rescan.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidPath`] if the path is not a
    /// directory and [`TrackerError::AlreadyTracked`] if the root is
    /// already registered. Neither leaves any side effects behind.
    pub async fn add_project(&self, path: &Utf8Path) -> Result<(), TrackerError> {
        if !path.is_dir() {
            return Err(TrackerError::invalid_path(path, "not a directory"));
        }
        let root = canonical_key(path);
        let name = root.file_name().unwrap_or("project").to_owned();

        let snapshot = {
            let mut projects = self.inner.projects.lock();
            if projects.contains_key(&root) {
                return Err(TrackerError::AlreadyTracked(root));
            }
            let mut project = TrackedProject::new(name, root.clone());
            project.analysis_enabled = self.inner.analyzer.read().is_some();
            projects.insert(root.clone(), project.clone());
            project
        };
        info!(path = %root, "tracking project");
        self.inner.sender.try_publish(UpdateMessage::Status {
            text: format!("Tracking {name}", name = snapshot.name),
        });

        self.inner
            .sender
            .publish(UpdateMessage::ProjectUpdate {
                path: root.clone(),
                project: Box::new(snapshot),
            })
            .await?;

        self.start_watcher(&root).await;
        tokio::spawn(run_scan(Arc::clone(&self.inner), root));
        Ok(())
    }

    /// Stops tracking a project.
    ///
    /// Stops its watcher within the configured timeout (detaching it if
    /// it will not stop), cancels any pending rescan, and drops the
    /// registry entry. Removing an untracked path is a no-op. With
    /// `delete_artifacts`, the generated files in the project root are
    /// deleted as well.
    pub async fn remove_project(&self, path: &Utf8Path, delete_artifacts: bool) {
        let root = canonical_key(path);
        self.inner.scheduler.cancel(&root);
        self.stop_watcher(&root, self.watcher_stop_timeout()).await;

        if self.inner.projects.lock().remove(&root).is_none() {
            debug!(path = %root, "remove for untracked project, nothing to do");
            return;
        }
        info!(path = %root, "stopped tracking project");

        if delete_artifacts {
            for name in GENERATED_FILES {
                let file = root.join(name);
                match std::fs::remove_file(&file) {
                    Ok(()) => debug!(path = %file, "deleted generated file"),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => warn!(path = %file, error = %e, "could not delete generated file"),
                }
            }
        }
    }

    /// Flags a project as changed, scheduling a debounced rescan.
    ///
    /// Rapid calls for the same root coalesce into a single rescan once
    /// the project has been quiet for the configured delay. Projects
    /// that are mid-scan when the delay fires are skipped; the running
    /// scan will pick up the state on disk anyway.
    pub fn mark_changed(&self, path: &Utf8Path) {
        schedule_rescan(&self.inner, &canonical_key(path));
    }

    /// Returns a snapshot of one tracked project.
    #[must_use]
    pub fn get_project(&self, path: &Utf8Path) -> Option<TrackedProject> {
        self.inner.projects.lock().get(&canonical_key(path)).cloned()
    }

    /// Returns snapshots of every tracked project.
    #[must_use]
    pub fn get_all_projects(&self) -> Vec<TrackedProject> {
        self.inner.projects.lock().values().cloned().collect()
    }

    /// Installs or removes the analyzer used by future scans.
    ///
    /// Scans already past their walk keep the analyzer they captured;
    /// the swap takes effect from the next scan on.
    pub fn set_analyzer(&self, analyzer: Option<Arc<dyn Analyzer>>) {
        let name = analyzer.as_ref().map(|a| a.name().to_owned());
        *self.inner.analyzer.write() = analyzer;
        match name {
            Some(name) => info!(analyzer = %name, "analyzer installed"),
            None => info!("analyzer removed"),
        }
    }

    /// Returns `true` while analysis capability is installed.
    #[must_use]
    pub fn analysis_enabled(&self) -> bool {
        self.inner.analyzer.read().is_some()
    }

    /// Shuts the tracker down.
    ///
    /// Cancels every pending rescan and stops every watcher against a
    /// shared deadline. Watchers that miss the deadline are detached
    /// with a warning; shutdown itself never fails.
    pub async fn shutdown(&self) {
        self.inner.shutting_down.store(true, Ordering::Relaxed);
        self.inner.scheduler.cancel_all();

        let handles: Vec<(Utf8PathBuf, WatchHandle)> =
            self.inner.watchers.lock().drain().collect();
        let deadline = tokio::time::Instant::now()
            + Duration::from_millis(self.inner.config.tracker.shutdown_timeout_ms);

        for (root, handle) in handles {
            let _ = handle.stop_tx.send(());
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if tokio::time::timeout(remaining, handle.task).await.is_err() {
                warn!(path = %root, "watcher missed shutdown deadline, detaching");
            }
        }
        info!("tracker shut down");
    }

    fn watcher_stop_timeout(&self) -> Duration {
        Duration::from_millis(self.inner.config.tracker.watcher_stop_timeout_ms)
    }

    async fn start_watcher(&self, root: &Utf8Path) {
        let watcher =
            FileWatcher::new(root, &self.inner.config.watch, GeneratedArtifactFilter).await;
        match watcher {
            Ok(watcher) => {
                let (stop_tx, stop_rx) = oneshot::channel();
                let task = tokio::spawn(run_watch_pump(
                    Arc::clone(&self.inner),
                    root.to_owned(),
                    watcher,
                    stop_rx,
                ));
                self.inner
                    .watchers
                    .lock()
                    .insert(root.to_owned(), WatchHandle { stop_tx, task });
            }
            Err(e) => {
                warn!(path = %root, error = %e, "watcher failed to start, project will not auto-rescan");
            }
        }
    }

    async fn stop_watcher(&self, root: &Utf8Path, timeout: Duration) {
        let handle = self.inner.watchers.lock().remove(root);
        let Some(handle) = handle else { return };
        let _ = handle.stop_tx.send(());
        if tokio::time::timeout(timeout, handle.task).await.is_err() {
            warn!(path = %root, "watcher did not stop in time, detaching");
        }
    }
}

/// Normalizes a path into the registry key form.
///
/// Falls back to the path as given when it no longer resolves, so
/// removal still finds projects whose directory was deleted.
fn canonical_key(path: &Utf8Path) -> Utf8PathBuf {
    path.canonicalize_utf8().unwrap_or_else(|_| path.to_owned())
}

/// Schedules a debounced rescan of `root`.
pub(crate) fn schedule_rescan(inner: &Arc<TrackerInner>, root: &Utf8Path) {
    if inner.shutting_down.load(Ordering::Relaxed) {
        return;
    }
    let delay = Duration::from_millis(inner.config.tracker.rescan_delay_ms);
    let task_inner = Arc::clone(inner);
    let task_root = root.to_owned();
    inner.scheduler.debounce(root.to_owned(), delay, async move {
        rescan_if_idle(task_inner, task_root).await;
    });
}

enum RescanDecision {
    Run(TrackedProject),
    Busy,
    Gone,
}

/// Rescans a project once it has gone quiet.
///
/// A trigger that fires while a scan is still running is not dropped:
/// the files behind it may already have been walked, so the trigger is
/// re-debounced and retried until the project is idle again.
async fn rescan_if_idle(inner: Arc<TrackerInner>, root: Utf8PathBuf) {
    let decision = {
        let mut projects = inner.projects.lock();
        match projects.get_mut(&root) {
            Some(project) if project.status.is_terminal() => {
                project.set_status(rm_core::ProjectStatus::Processing);
                RescanDecision::Run(project.clone())
            }
            Some(project) => {
                debug!(path = %root, status = %project.status, "scan in progress, keeping rescan pending");
                RescanDecision::Busy
            }
            None => {
                debug!(path = %root, "change for untracked project ignored");
                RescanDecision::Gone
            }
        }
    };
    let snapshot = match decision {
        RescanDecision::Run(snapshot) => snapshot,
        RescanDecision::Busy => {
            schedule_rescan(&inner, &root);
            return;
        }
        RescanDecision::Gone => return,
    };

    if inner
        .sender
        .publish(UpdateMessage::ProjectUpdate {
            path: root.clone(),
            project: Box::new(snapshot),
        })
        .await
        .is_err()
    {
        debug!(path = %root, "consumer gone, snapshot not delivered");
    }
    run_scan(inner, root).await;
}

/// Drains one watcher into the rescan scheduler until told to stop.
async fn run_watch_pump(
    inner: Arc<TrackerInner>,
    root: Utf8PathBuf,
    mut watcher: FileWatcher,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            event = watcher.recv() => match event {
                Some(event) => {
                    trace!(path = %event.path, project = %root, "file change observed");
                    schedule_rescan(&inner, &root);
                }
                None => {
                    debug!(path = %root, "watcher stream ended");
                    break;
                }
            },
            _ = &mut stop_rx => {
                if let Err(e) = watcher.shutdown().await {
                    debug!(path = %root, error = %e, "watcher shutdown reported an error");
                }
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use rm_analyzer::HeuristicAnalyzer;
    use rm_core::{ProjectStatus, ARTIFACT_FILE_NAME, IGNORE_FILE_NAME};

    fn test_config() -> Config {
        let mut config = Config::default();
        config.tracker.rescan_delay_ms = 50;
        config.watch.debounce_ms = 20;
        config
    }

    fn utf8_temp(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    /// Drains the channel until a terminal snapshot for `root` arrives,
    /// returning every snapshot seen for it along the way.
    async fn wait_for_terminal(
        rx: &mut MessageReceiver,
        root: &Utf8Path,
    ) -> Vec<TrackedProject> {
        let mut snapshots = Vec::new();
        let deadline = Duration::from_secs(10);
        loop {
            let message = tokio::time::timeout(deadline, rx.recv())
                .await
                .expect("timed out waiting for terminal snapshot")
                .expect("channel closed before terminal snapshot");
            if let UpdateMessage::ProjectUpdate { path, project } = message {
                if path == root {
                    let terminal = project.status.is_terminal();
                    snapshots.push(*project);
                    if terminal {
                        return snapshots;
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_add_project_rejects_non_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);
        std::fs::write(root.join("file.txt"), "x\n").unwrap();

        let (tracker, _rx) = ProjectTracker::new(test_config());
        let result = tracker.add_project(&root.join("file.txt")).await;
        assert!(matches!(result, Err(TrackerError::InvalidPath { .. })));
        assert!(tracker.get_all_projects().is_empty());
    }

    #[tokio::test]
    async fn test_add_project_twice_fails_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.add_project(&root).await.unwrap();
        let result = tracker.add_project(&root).await;
        assert!(matches!(result, Err(TrackerError::AlreadyTracked(_))));
        assert_eq!(tracker.get_all_projects().len(), 1);

        wait_for_terminal(&mut rx, &canonical_key(&root)).await;
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_scan_of_empty_directory_reaches_ready() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.add_project(&root).await.unwrap();

        let key = canonical_key(&root);
        let snapshots = wait_for_terminal(&mut rx, &key).await;
        let first = snapshots.first().unwrap();
        assert_eq!(first.status, ProjectStatus::Processing);

        let last = snapshots.last().unwrap();
        assert_eq!(last.status, ProjectStatus::Ready);
        assert_eq!(last.total_files, 0);
        assert_eq!(last.total_lines, 0);
        assert_eq!(last.primary_language, "Unknown");

        // the scan leaves its generated files behind
        assert!(key.join(IGNORE_FILE_NAME).is_file());
        assert!(key.join(ARTIFACT_FILE_NAME).is_file());
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_scan_counts_files_and_detects_language() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);
        std::fs::write(root.join("main.py"), "print('a')\n".repeat(10)).unwrap();

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.add_project(&root).await.unwrap();

        let key = canonical_key(&root);
        let snapshots = wait_for_terminal(&mut rx, &key).await;
        let last = snapshots.last().unwrap();
        assert_eq!(last.status, ProjectStatus::Ready);
        assert_eq!(last.total_files, 1);
        assert_eq!(last.total_lines, 10);
        assert_eq!(last.primary_language, "Python");
        assert!(!last.analysis_enabled);
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_scan_with_analyzer_counts_functions() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);
        std::fs::write(
            root.join("app.py"),
            "def first():\n    pass\n\ndef second(x):\n    return x\n",
        )
        .unwrap();

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.set_analyzer(Some(Arc::new(HeuristicAnalyzer::new())));
        tracker.add_project(&root).await.unwrap();

        let key = canonical_key(&root);
        let snapshots = wait_for_terminal(&mut rx, &key).await;
        let last = snapshots.last().unwrap();
        assert_eq!(last.status, ProjectStatus::Ready);
        assert!(last.analysis_enabled);
        assert_eq!(last.analyzed_files, 1);
        assert_eq!(last.total_functions, 2);
        assert!(snapshots
            .iter()
            .any(|p| p.status == ProjectStatus::Analyzing));
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_remove_project_deletes_artifacts_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.add_project(&root).await.unwrap();
        let key = canonical_key(&root);
        wait_for_terminal(&mut rx, &key).await;

        tracker.remove_project(&root, true).await;
        assert!(tracker.get_project(&root).is_none());
        assert!(!key.join(ARTIFACT_FILE_NAME).exists());
        assert!(!key.join(IGNORE_FILE_NAME).exists());
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_remove_project_keeps_artifacts_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.add_project(&root).await.unwrap();
        let key = canonical_key(&root);
        wait_for_terminal(&mut rx, &key).await;

        tracker.remove_project(&root, false).await;
        assert!(key.join(ARTIFACT_FILE_NAME).is_file());
        assert!(key.join(IGNORE_FILE_NAME).is_file());
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_remove_untracked_project_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);

        let (tracker, _rx) = ProjectTracker::new(test_config());
        tracker.remove_project(&root, true).await;
        assert!(tracker.get_all_projects().is_empty());
    }

    #[tokio::test]
    async fn test_snapshots_are_defensive_copies() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.add_project(&root).await.unwrap();
        let key = canonical_key(&root);
        wait_for_terminal(&mut rx, &key).await;

        let mut copy = tracker.get_project(&root).unwrap();
        copy.name = "mutated".to_owned();
        copy.total_files = 999;

        let fresh = tracker.get_project(&root).unwrap();
        assert_ne!(fresh.name, "mutated");
        assert_ne!(fresh.total_files, 999);
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_mark_changed_triggers_rescan() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.add_project(&root).await.unwrap();
        let key = canonical_key(&root);
        wait_for_terminal(&mut rx, &key).await;

        std::fs::write(key.join("new.rs"), "fn main() {}\n").unwrap();
        tracker.mark_changed(&root);

        let snapshots = wait_for_terminal(&mut rx, &key).await;
        let last = snapshots.last().unwrap();
        assert_eq!(last.status, ProjectStatus::Ready);
        assert_eq!(last.total_files, 1);
        assert_eq!(last.primary_language, "Rust");
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_file_change_schedules_rescan_through_watcher() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.add_project(&root).await.unwrap();
        let key = canonical_key(&root);
        wait_for_terminal(&mut rx, &key).await;

        std::fs::write(key.join("touched.py"), "x = 1\n").unwrap();

        let snapshots = wait_for_terminal(&mut rx, &key).await;
        let last = snapshots.last().unwrap();
        assert_eq!(last.total_files, 1);
        assert_eq!(last.primary_language, "Python");
        tracker.shutdown().await;
    }

    /// Analyzer that stalls each file, keeping scans in `Analyzing` long
    /// enough for a change to land mid-scan.
    struct SlowAnalyzer {
        inner: HeuristicAnalyzer,
        delay: Duration,
    }

    impl rm_analyzer::Analyzer for SlowAnalyzer {
        fn name(&self) -> &'static str {
            "slow-heuristic"
        }

        fn supports_extension(&self, ext: &str) -> bool {
            self.inner.supports_extension(ext)
        }

        fn analyze(
            &self,
            path: &Utf8Path,
            contents: &str,
        ) -> Result<rm_core::FileAnalysis, rm_analyzer::AnalyzeError> {
            std::thread::sleep(self.delay);
            self.inner.analyze(path, contents)
        }
    }

    #[tokio::test]
    async fn test_change_during_scan_is_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);
        std::fs::write(root.join("first.py"), "def a():\n    pass\n").unwrap();

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.set_analyzer(Some(Arc::new(SlowAnalyzer {
            inner: HeuristicAnalyzer::new(),
            delay: Duration::from_millis(400),
        })));
        tracker.add_project(&root).await.unwrap();
        let key = canonical_key(&root);

        // wait until the first scan is held in its analysis pass
        loop {
            let message = tokio::time::timeout(Duration::from_secs(10), rx.recv())
                .await
                .expect("timed out waiting for analysis to start")
                .expect("channel closed early");
            if let UpdateMessage::ProjectUpdate { path, project } = message {
                if path == key && project.status == ProjectStatus::Analyzing {
                    break;
                }
            }
        }

        // a change lands while the scan is mid-flight
        std::fs::write(key.join("second.py"), "x = 1\n").unwrap();
        tracker.mark_changed(&root);

        let first = wait_for_terminal(&mut rx, &key).await;
        assert_eq!(first.last().unwrap().total_files, 1);

        // the pending trigger must survive the busy scan and fire after it
        let second = wait_for_terminal(&mut rx, &key).await;
        assert_eq!(second.last().unwrap().total_files, 2);
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_scan_finishing_after_removal_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8_temp(&dir);
        std::fs::write(root.join("late.py"), "x = 1\n").unwrap();

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.add_project(&root).await.unwrap();
        let key = canonical_key(&root);
        wait_for_terminal(&mut rx, &key).await;

        tracker.remove_project(&root, false).await;
        crate::scan::run_scan(Arc::clone(&tracker.inner), key.clone()).await;

        assert!(tracker.get_project(&root).is_none());
        for message in rx.try_receive_batch(100) {
            assert!(
                !matches!(message, UpdateMessage::ProjectUpdate { ref path, .. } if *path == key),
                "discarded scan must not publish a snapshot"
            );
        }
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_all_watchers() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();

        let (tracker, mut rx) = ProjectTracker::new(test_config());
        tracker.add_project(&utf8_temp(&dir_a)).await.unwrap();
        tracker.add_project(&utf8_temp(&dir_b)).await.unwrap();

        // wait for both projects to settle, in whatever order they finish
        let mut settled = std::collections::HashSet::new();
        while settled.len() < 2 {
            let message = tokio::time::timeout(Duration::from_secs(10), rx.recv())
                .await
                .expect("timed out waiting for terminal snapshots")
                .expect("channel closed early");
            if let UpdateMessage::ProjectUpdate { path, project } = message {
                if project.status.is_terminal() {
                    settled.insert(path);
                }
            }
        }

        tracker.shutdown().await;
        assert_eq!(tracker.inner.watchers.lock().len(), 0);
        assert_eq!(tracker.inner.scheduler.pending_count(), 0);
    }
}
