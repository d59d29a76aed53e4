//! User-facing notifications for mutation outcomes.
//!
//! Rendering (toasts, banners) is the UI's concern; the data layer only
//! emits [`Notification`] values through a [`Notifier`].

use std::sync::Arc;

use parking_lot::Mutex;

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Neutral confirmation.
    Default,
    /// Destructive action or failure.
    Destructive,
}

/// A notification naming what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short headline.
    pub title: String,
    /// One-sentence detail.
    pub description: String,
    /// Visual weight.
    pub variant: Variant,
}

impl Notification {
    fn new(title: &str, description: impl Into<String>, variant: Variant) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            variant,
        }
    }

    /// Confirmation after a task was created.
    pub fn task_added() -> Self {
        Self::new(
            "Task added",
            "Your new task has been added successfully.",
            Variant::Default,
        )
    }

    /// Confirmation after a task's completed flag was persisted.
    pub fn task_updated(completed: bool) -> Self {
        let description = if completed {
            "The task has been marked as completed."
        } else {
            "The task has been marked as not completed."
        };
        Self::new("Task updated", description, Variant::Default)
    }

    /// Confirmation after a task was deleted.
    pub fn task_deleted() -> Self {
        Self::new(
            "Task deleted",
            "The task has been removed from your list.",
            Variant::Destructive,
        )
    }

    /// A failed mutation, carrying the underlying message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new("Error", message, Variant::Destructive)
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log. The default sink for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.variant {
            Variant::Default => tracing::info!(
                title = %notification.title,
                "{}",
                notification.description
            ),
            Variant::Destructive => tracing::warn!(
                title = %notification.title,
                "{}",
                notification.description
            ),
        }
    }
}

/// Keeps every notification in memory, in delivery order.
///
/// Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    /// Drain and return everything delivered so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.lock())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_shares_buffer_between_clones() {
        let recorder = RecordingNotifier::new();
        let clone = recorder.clone();
        clone.notify(Notification::task_added());
        clone.notify(Notification::failure("boom"));

        let seen = recorder.take();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].title, "Task added");
        assert_eq!(seen[1].description, "boom");
        assert_eq!(seen[1].variant, Variant::Destructive);
        assert!(recorder.notifications().is_empty());
    }

    #[test]
    fn update_message_names_the_new_state() {
        assert!(Notification::task_updated(true).description.contains("completed"));
        assert!(Notification::task_updated(false).description.contains("not completed"));
        assert_eq!(Notification::task_deleted().variant, Variant::Destructive);
    }
}
