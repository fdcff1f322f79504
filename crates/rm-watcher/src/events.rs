//! File change events.

use std::time::Instant;

use camino::Utf8PathBuf;

/// A single debounced file change.
///
/// Events carry the changed path and the moment the watcher observed it,
/// so consumers can reason about staleness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// The path that changed.
    pub path: Utf8PathBuf,

    /// When the watcher observed the change.
    pub timestamp: Instant,
}

impl FileEvent {
    /// Creates an event observed now.
    #[must_use]
    pub fn new(path: Utf8PathBuf) -> Self {
        Self {
            path,
            timestamp: Instant::now(),
        }
    }

    /// How long ago this event was observed.
    #[must_use]
    pub fn age(&self) -> std::time::Duration {
        self.timestamp.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_age_increases() {
        let event = FileEvent::new(Utf8PathBuf::from("/p/main.py"));
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(event.age() >= std::time::Duration::from_millis(5));
    }
}
