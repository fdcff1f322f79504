//! Keyed debounce scheduling.
//!
//! # Overview
//!
//! A [`DebounceScheduler`] coalesces bursts of work per key: each call to
//! [`debounce`](DebounceScheduler::debounce) cancels any pending action
//! for the same key and schedules the new one after the delay. Out of N
//! rapid calls, only the last action runs, no earlier than the last
//! call's deadline. Keys are project roots in practice, so a save-storm
//! in one project collapses into a single rescan without delaying other
//! projects.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::trace;

use rm_core::FxHashMap;

struct Pending {
    id: u64,
    handle: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct SchedulerInner {
    pending: Mutex<FxHashMap<Utf8PathBuf, Pending>>,
    next_id: AtomicU64,
}

/// Cancel-and-replace timers keyed by path.
///
/// Cloning is cheap; clones share the same pending set.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use camino::Utf8PathBuf;
/// use rm_watcher::DebounceScheduler;
///
/// # async fn example() {
/// let scheduler = DebounceScheduler::new();
/// let key = Utf8PathBuf::from("/projects/demo");
/// scheduler.debounce(key, Duration::from_millis(1000), async {
///     println!("rescan");
/// });
/// # }
/// ```
#[derive(Clone, Default)]
pub struct DebounceScheduler {
    inner: Arc<SchedulerInner>,
}

impl std::fmt::Debug for DebounceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebounceScheduler")
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl DebounceScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to run after `delay`, replacing any action
    /// already pending for `key`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn debounce<F>(&self, key: Utf8PathBuf, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        // Claim the slot before spawning so a zero-delay timer cannot
        // fire before it is registered.
        {
            let mut pending = self.inner.pending.lock();
            if let Some(previous) = pending.insert(key.clone(), Pending { id, handle: None }) {
                trace!(key = %key, "replacing pending debounced action");
                if let Some(handle) = previous.handle {
                    handle.abort();
                }
            }
        }

        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let still_current = {
                let mut pending = inner.pending.lock();
                match pending.get(&task_key) {
                    Some(current) if current.id == id => {
                        pending.remove(&task_key);
                        true
                    }
                    _ => false,
                }
            };
            if still_current {
                action.await;
            }
        });

        let mut pending = self.inner.pending.lock();
        match pending.get_mut(&key) {
            Some(current) if current.id == id => current.handle = Some(handle),
            // Already replaced again; our timer will see the newer id and
            // do nothing, but there is no reason to let it sleep.
            _ => handle.abort(),
        }
    }

    /// Cancels the pending action for `key`, if any. Returns `true` if
    /// one was cancelled.
    pub fn cancel(&self, key: &Utf8Path) -> bool {
        let removed = self.inner.pending.lock().remove(key);
        match removed {
            Some(previous) => {
                if let Some(handle) = previous.handle {
                    handle.abort();
                }
                trace!(key = %key, "cancelled pending debounced action");
                true
            }
            None => false,
        }
    }

    /// Cancels every pending action.
    pub fn cancel_all(&self) {
        let mut pending = self.inner.pending.lock();
        for (_, previous) in pending.drain() {
            if let Some(handle) = previous.handle {
                handle.abort();
            }
        }
    }

    /// Number of actions currently waiting for their delay to elapse.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn key(s: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(s)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_action_runs_after_delay() {
        let scheduler = DebounceScheduler::new();
        let counter = Arc::new(AtomicU32::new(0));

        let c = Arc::clone(&counter);
        scheduler.debounce(key("/p"), Duration::from_millis(100), async move {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_calls_run_only_last() {
        let scheduler = DebounceScheduler::new();
        let last_seen = Arc::new(AtomicU32::new(0));
        let runs = Arc::new(AtomicU32::new(0));

        for i in 1..=10_u32 {
            let last = Arc::clone(&last_seen);
            let runs = Arc::clone(&runs);
            scheduler.debounce(key("/p"), Duration::from_millis(100), async move {
                last.store(i, Ordering::SeqCst);
                runs.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(last_seen.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let scheduler = DebounceScheduler::new();
        let runs = Arc::new(AtomicU32::new(0));

        for name in ["/a", "/b", "/c"] {
            let runs = Arc::clone(&runs);
            scheduler.debounce(key(name), Duration::from_millis(50), async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(scheduler.pending_count(), 3);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_run() {
        let scheduler = DebounceScheduler::new();
        let runs = Arc::new(AtomicU32::new(0));

        let c = Arc::clone(&runs);
        scheduler.debounce(key("/p"), Duration::from_millis(50), async move {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(scheduler.cancel(Utf8Path::new("/p")));
        assert!(!scheduler.cancel(Utf8Path::new("/p")));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let scheduler = DebounceScheduler::new();
        let runs = Arc::new(AtomicU32::new(0));

        for name in ["/a", "/b"] {
            let runs = Arc::clone(&runs);
            scheduler.debounce(key(name), Duration::from_millis(50), async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
        }
        scheduler.cancel_all();
        assert_eq!(scheduler.pending_count(), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
