//! The scan pipeline.
//!
//! # Overview
//!
//! One scan turns a project root into a terminal snapshot:
//!
//! ```text
//! ensure .ignore ──► walk (spawn_blocking) ──► analysis pass (optional)
//!                                                     │
//!        publish Ready/Error ◄── write repomap.md ◄───┘
//! ```
//!
//! The walk and the analysis pass run on blocking threads; the registry
//! lock is only taken briefly to swap snapshots in and out. A project
//! removed mid-scan simply has its results discarded.

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use rm_analyzer::Analyzer;
use rm_core::{FileAnalysis, FileNode, ProjectStatus, IGNORE_FILE_NAME};
use rm_scanner::{
    ensure_ignore_file, extension_key, render_artifact, write_artifact, ArtifactInput,
    IgnoreRules, ProgressReporter, ScanOutcome, Scanner,
};

use crate::message::{MessageSender, UpdateMessage};
use crate::tracker::TrackerInner;

/// Forwards walker progress into the lossy half of the update channel.
struct ChannelProgress {
    sender: MessageSender,
    path: Utf8PathBuf,
}

impl ProgressReporter for ChannelProgress {
    fn report(&self, message: &str) {
        self.sender.try_publish(UpdateMessage::Progress {
            path: self.path.clone(),
            text: message.to_owned(),
            percent: None,
        });
    }
}

/// Runs one full scan of `root` and publishes its terminal snapshot.
pub(crate) async fn run_scan(inner: Arc<TrackerInner>, root: Utf8PathBuf) {
    if inner.shutting_down.load(Ordering::Relaxed) {
        debug!(path = %root, "shutting down, skipping scan");
        return;
    }

    // A missing ignore file is created with defaults before the first
    // walk; rules are re-read fresh on every scan so edits apply.
    if let Err(e) = ensure_ignore_file(&root) {
        warn!(path = %root, error = %e, "could not create ignore file");
    }
    let rules = IgnoreRules::load(&root.join(IGNORE_FILE_NAME));

    let scanner = Scanner::new(inner.config.limits)
        .with_progress_interval(inner.config.tracker.progress_interval);
    let reporter = ChannelProgress {
        sender: inner.sender.clone(),
        path: root.clone(),
    };

    let walk_root = root.clone();
    let walk_result =
        tokio::task::spawn_blocking(move || scanner.scan(&walk_root, &rules, &reporter)).await;

    let outcome = match walk_result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            fail_scan(&inner, &root, e.to_string()).await;
            return;
        }
        Err(join_error) => {
            fail_scan(&inner, &root, format!("scan task failed: {join_error}")).await;
            return;
        }
    };

    let ScanOutcome {
        tree,
        total_files,
        total_lines,
        file_types,
        primary_language,
        frameworks,
    } = outcome;

    // In-flight scans keep whichever analyzer was installed when they
    // reached this point; hot swaps affect the next scan.
    let analyzer = inner.analyzer.read().clone();
    let analysis_enabled = analyzer.is_some();

    let (tree, analyses, analyzed_files, total_functions) = match analyzer {
        Some(analyzer) => {
            let published = transition(&inner, &root, ProjectStatus::Analyzing).await;
            if !published {
                debug!(path = %root, "project removed before analysis, discarding results");
                return;
            }
            let task_inner = Arc::clone(&inner);
            let task_root = root.clone();
            let analysis_result = tokio::task::spawn_blocking(move || {
                analyze_tree(&task_inner, &task_root, tree, analyzer.as_ref())
            })
            .await;
            match analysis_result {
                Ok(result) => result,
                Err(join_error) => {
                    fail_scan(&inner, &root, format!("analysis task failed: {join_error}")).await;
                    return;
                }
            }
        }
        None => (tree, BTreeMap::new(), 0, 0),
    };

    let terminal = {
        let mut projects = inner.projects.lock();
        match projects.get_mut(&root) {
            Some(project) => {
                project.total_files = total_files;
                project.total_lines = total_lines;
                project.analyzed_files = analyzed_files;
                project.total_functions = total_functions;
                project.primary_language = primary_language;
                project.frameworks = frameworks;
                project.analysis_enabled = analysis_enabled;
                project.set_status(ProjectStatus::Ready);
                project.clone()
            }
            None => {
                debug!(path = %root, "project removed during scan, discarding results");
                return;
            }
        }
    };

    let contents = render_artifact(&ArtifactInput {
        project: &terminal,
        tree: &tree,
        file_types: &file_types,
        analyses: &analyses,
    });
    if let Err(e) = write_artifact(&root, &contents) {
        // The scan itself succeeded; a missing artifact is recoverable
        // on the next scan.
        warn!(path = %root, error = %e, "artifact write failed");
    }

    publish_snapshot(&inner.sender, &root, terminal).await;
}

/// Sequential per-file analysis over the scanned tree.
///
/// Runs on a blocking thread. Returns the tree with analyzed files
/// marked, the per-file results keyed by relative path, and the totals.
fn analyze_tree(
    inner: &TrackerInner,
    root: &Utf8Path,
    mut tree: FileNode,
    analyzer: &dyn Analyzer,
) -> (FileNode, BTreeMap<String, FileAnalysis>, u64, u64) {
    let mut candidates = Vec::new();
    collect_analyzable(&tree, String::new(), analyzer, &mut candidates);
    candidates.sort();
    candidates.truncate(inner.config.tracker.analyzer_file_limit);

    let total = candidates.len();
    let mut analyses = BTreeMap::new();
    let mut analyzed_files = 0_u64;
    let mut total_functions = 0_u64;

    for (index, rel) in candidates.iter().enumerate() {
        let basename = rel.rsplit('/').next().unwrap_or(rel);
        inner.sender.try_publish(UpdateMessage::Progress {
            path: root.to_owned(),
            text: format!("Analyzing {basename}... ({}/{total})", index + 1),
            percent: progress_percent(index + 1, total),
        });

        let absolute = root.join(rel);
        match analyzer.analyze_file(&absolute, inner.config.tracker.analyzer_max_file_size) {
            Ok(analysis) => {
                let functions = analysis.function_count();
                if let Some(node) = node_at_mut(&mut tree, rel) {
                    node.mark_analyzed(functions);
                }
                analyzed_files += 1;
                total_functions += functions;
                inner.sender.try_publish(UpdateMessage::AnalysisUpdate {
                    path: root.to_owned(),
                    file: Utf8PathBuf::from(rel),
                    analysis: Box::new(analysis.clone()),
                });
                analyses.insert(rel.clone(), analysis);
            }
            Err(e) => {
                debug!(path = %absolute, error = %e, "analysis failed, skipping file");
            }
        }
    }

    (tree, analyses, analyzed_files, total_functions)
}

/// Collects root-relative paths of files the analyzer can handle.
fn collect_analyzable(
    node: &FileNode,
    prefix: String,
    analyzer: &dyn Analyzer,
    out: &mut Vec<String>,
) {
    let Some(children) = node.children() else {
        return;
    };
    for (name, child) in children {
        let rel = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        match child {
            FileNode::Directory { .. } => collect_analyzable(child, rel, analyzer, out),
            FileNode::File { .. } => {
                if analyzer.supports_extension(&extension_key(Utf8Path::new(name))) {
                    out.push(rel);
                }
            }
        }
    }
}

/// Finds a node by root-relative path.
fn node_at_mut<'a>(tree: &'a mut FileNode, rel: &str) -> Option<&'a mut FileNode> {
    let mut current = tree;
    for segment in rel.split('/') {
        current = current.children_mut()?.get_mut(segment)?;
    }
    Some(current)
}

#[allow(clippy::cast_possible_truncation)]
fn progress_percent(done: usize, total: usize) -> Option<u8> {
    if total == 0 {
        return None;
    }
    Some(((done * 100) / total).min(100) as u8)
}

/// Moves the project into `status` and publishes the snapshot. Returns
/// `false` if the project is no longer tracked.
async fn transition(inner: &Arc<TrackerInner>, root: &Utf8Path, status: ProjectStatus) -> bool {
    let snapshot = {
        let mut projects = inner.projects.lock();
        projects.get_mut(root).map(|project| {
            project.set_status(status);
            project.clone()
        })
    };
    match snapshot {
        Some(snapshot) => {
            publish_snapshot(&inner.sender, root, snapshot).await;
            true
        }
        None => false,
    }
}

/// Records a failed scan and publishes the Error snapshot.
pub(crate) async fn fail_scan(inner: &Arc<TrackerInner>, root: &Utf8Path, message: String) {
    warn!(path = %root, error = %message, "scan failed");
    let snapshot = {
        let mut projects = inner.projects.lock();
        match projects.get_mut(root) {
            Some(project) => {
                project.set_status(ProjectStatus::Error);
                project.error_message = Some(message);
                Some(project.clone())
            }
            None => None,
        }
    };
    if let Some(snapshot) = snapshot {
        publish_snapshot(&inner.sender, root, snapshot).await;
    }
}

/// Reliable snapshot publish; a closed channel is logged, not raised.
async fn publish_snapshot(
    sender: &MessageSender,
    root: &Utf8Path,
    project: rm_core::TrackedProject,
) {
    let message = UpdateMessage::ProjectUpdate {
        path: root.to_owned(),
        project: Box::new(project),
    };
    if sender.publish(message).await.is_err() {
        debug!(path = %root, "consumer gone, snapshot not delivered");
    }
}
