//! Task records and validated insert payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A persisted task row.
///
/// Mirrors the `todos` table: `id`, `text`, `completed`, `user_id` and
/// `created_at`. The owner (`user_id`) is fixed at creation; only
/// `completed` is ever updated.
///
/// # Examples
///
/// ```
/// use tasklist::types::{NewTask, Task};
///
/// let new_task = NewTask::new("user-1", "  buy milk  ").unwrap();
/// let task = Task::from_new(new_task);
/// assert_eq!(task.text, "buy milk");
/// assert_eq!(task.user_id, "user-1");
/// assert!(!task.completed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque unique identity (UUIDv4 for locally created rows).
    pub id: String,

    /// Owner identity.
    pub user_id: String,

    /// Trimmed, non-empty task text.
    pub text: String,

    /// Completion flag.
    #[serde(default)]
    pub completed: bool,

    /// Creation time; lists are ordered by this field, newest first.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Materializes a row from a validated insert payload, assigning a fresh
    /// identity and the current time.
    pub fn from_new(new_task: NewTask) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: new_task.user_id,
            text: new_task.text,
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// The value a toggle of this task should persist.
    #[inline]
    pub fn toggled(&self) -> bool {
        !self.completed
    }
}

/// Insert payload for a new task.
///
/// Construction trims the text and rejects empty or whitespace-only input,
/// so a `NewTask` value is always safe to send to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    text: String,
    user_id: String,
}

impl NewTask {
    /// Validates and builds an insert payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `text` is empty after trimming.
    ///
    /// # Examples
    ///
    /// ```
    /// use tasklist::types::NewTask;
    ///
    /// assert!(NewTask::new("user-1", "   ").is_err());
    /// assert_eq!(NewTask::new("user-1", "\tcall mom\n").unwrap().text(), "call mom");
    /// ```
    pub fn new(user_id: impl Into<String>, text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("Task text must not be empty"));
        }
        Ok(Self {
            text: trimmed.to_string(),
            user_id: user_id.into(),
        })
    }

    /// The trimmed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The owner the task will be created for.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_task_trims_text() {
        let new_task = NewTask::new("u", "  buy milk  ").unwrap();
        assert_eq!(new_task.text(), "buy milk");
        assert_eq!(new_task.user_id(), "u");
    }

    #[test]
    fn new_task_rejects_blank_text() {
        for text in ["", " ", "\t\n", "   \u{3000}"] {
            let err = NewTask::new("u", text).unwrap_err();
            assert!(err.is_validation(), "{text:?} should be rejected");
        }
    }

    #[test]
    fn from_new_assigns_uuid_and_defaults() {
        let task = Task::from_new(NewTask::new("u", "x").unwrap());
        assert_eq!(Uuid::parse_str(&task.id).unwrap().get_version_num(), 4);
        assert!(!task.completed);
        assert!(task.toggled());
    }

    #[test]
    fn task_deserializes_store_row() {
        let row = serde_json::json!({
            "id": "7f6c",
            "user_id": "u",
            "text": "water plants",
            "completed": true,
            "created_at": "2024-03-01T10:15:30.123456+00:00"
        });
        let task: Task = serde_json::from_value(row).unwrap();
        assert_eq!(task.text, "water plants");
        assert!(task.completed);
        assert_eq!(task.created_at.timestamp(), 1_709_288_130);
    }

    #[test]
    fn task_completed_defaults_to_false() {
        let row = serde_json::json!({
            "id": "1",
            "user_id": "u",
            "text": "t",
            "created_at": "2024-03-01T10:15:30Z"
        });
        let task: Task = serde_json::from_value(row).unwrap();
        assert!(!task.completed);
    }
}
