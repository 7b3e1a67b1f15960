//! Structured notifications handed to whatever displays them.
//!
//! The engine only supplies values; wording and layout belong to the sink.

use std::sync::{Mutex, PoisonError};

use crate::model::{ContentDefect, MaterialId};
use crate::session::{PassSummary, QuizScope, QuizScore};

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Notification {
    QuizCompleted {
        scope: QuizScope,
        score: QuizScore,
    },
    FlashcardsCompleted {
        material_id: Option<MaterialId>,
        summary: PassSummary,
    },
    /// Generated content failed integrity checks.
    ContentDefects {
        material_id: Option<MaterialId>,
        defects: Vec<ContentDefect>,
    },
    /// A collaborator operation finished successfully.
    Succeeded { action: &'static str },
    /// A collaborator operation failed.
    Failed {
        action: &'static str,
        reason: String,
    },
}

/// Receiver of completion and error notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that keeps every notification in memory, for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    received: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the notifications received so far, oldest first.
    #[must_use]
    pub fn received(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drains the received notifications.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.received.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order_and_drains() {
        let sink = RecordingSink::new();
        sink.notify(Notification::Succeeded { action: "upload" });
        sink.notify(Notification::Failed {
            action: "analyze",
            reason: "timeout".into(),
        });

        assert_eq!(sink.received().len(), 2);
        let drained = sink.take();
        assert_eq!(drained[0], Notification::Succeeded { action: "upload" });
        assert!(sink.received().is_empty());
    }
}
