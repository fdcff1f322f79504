//! The bounded update channel between tracker and consumer.
//!
//! # Overview
//!
//! The tracker is the producer, a UI or CLI loop is the consumer. The
//! channel is bounded, and the send discipline depends on what is being
//! sent:
//!
//! - **Project snapshots** ([`UpdateMessage::ProjectUpdate`]) are the
//!   source of truth for a project's state, so they are sent with
//!   back-pressure and never dropped.
//! - **Progress and status chatter** is decorative. When the channel is
//!   full it is dropped with a warning; a slow consumer loses progress
//!   lines, never state.
//!
//! The consumer drains in bounded batches per tick so one chatty project
//! cannot starve the rest of the loop.

use camino::Utf8PathBuf;
use tokio::sync::mpsc;
use tracing::warn;

use rm_core::{FileAnalysis, TrackedProject};

use crate::error::TrackerError;

/// A message from the tracker to its consumer.
#[derive(Debug, Clone)]
pub enum UpdateMessage {
    /// A full project snapshot. Sent on add, on every status transition,
    /// and exactly once with a terminal status per scan.
    ProjectUpdate {
        /// The project root this snapshot describes.
        path: Utf8PathBuf,
        /// Owned snapshot; mutating it affects nothing.
        project: Box<TrackedProject>,
    },

    /// A progress line for one project. Lossy.
    Progress {
        /// The project root reporting progress.
        path: Utf8PathBuf,
        /// Human-readable progress text.
        text: String,
        /// Completion percentage when known.
        percent: Option<u8>,
    },

    /// A general status line not tied to one project. Lossy.
    Status {
        /// Human-readable status text.
        text: String,
    },

    /// Analysis finished for one file. Lossy.
    AnalysisUpdate {
        /// The project root.
        path: Utf8PathBuf,
        /// Root-relative path of the analyzed file.
        file: Utf8PathBuf,
        /// The extracted analysis.
        analysis: Box<FileAnalysis>,
    },
}

impl UpdateMessage {
    /// Returns `true` for messages that must never be dropped.
    #[must_use]
    pub const fn is_reliable(&self) -> bool {
        matches!(self, Self::ProjectUpdate { .. })
    }
}

/// Producer half of the update channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MessageSender {
    tx: mpsc::Sender<UpdateMessage>,
}

impl MessageSender {
    /// Sends a message with back-pressure. Use for project snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ChannelClosed`] if the consumer is gone.
    pub async fn publish(&self, message: UpdateMessage) -> Result<(), TrackerError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| TrackerError::ChannelClosed)
    }

    /// Sends a message if there is room, dropping it otherwise. Use for
    /// progress and status chatter.
    pub fn try_publish(&self, message: UpdateMessage) {
        if let Err(e) = self.tx.try_send(message) {
            match e {
                mpsc::error::TrySendError::Full(dropped) => {
                    warn!(?dropped, "update channel full, dropping message");
                }
                mpsc::error::TrySendError::Closed(_) => {
                    warn!("update channel closed, dropping message");
                }
            }
        }
    }
}

/// Consumer half of the update channel.
#[derive(Debug)]
pub struct MessageReceiver {
    rx: mpsc::Receiver<UpdateMessage>,
}

impl MessageReceiver {
    /// Receives the next message, waiting if none is queued.
    ///
    /// Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<UpdateMessage> {
        self.rx.recv().await
    }

    /// Drains up to `max_count` already-queued messages without waiting.
    pub fn try_receive_batch(&mut self, max_count: usize) -> Vec<UpdateMessage> {
        let mut batch = Vec::new();
        while batch.len() < max_count {
            match self.rx.try_recv() {
                Ok(message) => batch.push(message),
                Err(_) => break,
            }
        }
        batch
    }
}

/// Creates a bounded update channel.
#[must_use]
pub fn channel(capacity: usize) -> (MessageSender, MessageReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (MessageSender { tx }, MessageReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(path: &str, text: &str) -> UpdateMessage {
        UpdateMessage::Progress {
            path: Utf8PathBuf::from(path),
            text: text.to_owned(),
            percent: None,
        }
    }

    #[tokio::test]
    async fn test_publish_and_recv() {
        let (tx, mut rx) = channel(4);
        tx.publish(UpdateMessage::Status {
            text: "hello".to_owned(),
        })
        .await
        .unwrap();

        match rx.recv().await {
            Some(UpdateMessage::Status { text }) => assert_eq!(text, "hello"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_try_publish_drops_when_full() {
        let (tx, mut rx) = channel(2);
        for i in 0..5 {
            tx.try_publish(progress("/p", &format!("line {i}")));
        }

        let batch = rx.try_receive_batch(10);
        assert_eq!(batch.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_respects_max_count() {
        let (tx, mut rx) = channel(50);
        for i in 0..20 {
            tx.try_publish(progress("/p", &format!("line {i}")));
        }

        assert_eq!(rx.try_receive_batch(8).len(), 8);
        assert_eq!(rx.try_receive_batch(50).len(), 12);
        assert!(rx.try_receive_batch(50).is_empty());
    }

    #[tokio::test]
    async fn test_publish_fails_after_consumer_drops() {
        let (tx, rx) = channel(2);
        drop(rx);
        let result = tx
            .publish(UpdateMessage::Status {
                text: "late".to_owned(),
            })
            .await;
        assert!(matches!(result, Err(TrackerError::ChannelClosed)));
    }

    #[test]
    fn test_reliability_classification() {
        let snapshot = UpdateMessage::ProjectUpdate {
            path: Utf8PathBuf::from("/p"),
            project: Box::new(rm_core::TrackedProject::new("p", Utf8PathBuf::from("/p"))),
        };
        assert!(snapshot.is_reliable());
        assert!(!progress("/p", "x").is_reliable());
    }
}
