//! In-memory task store.
//!
//! [`InMemoryTaskStore`] keeps rows in a `DashMap<String, StoredTask>` keyed
//! by task ID. Owner isolation is enforced on every operation: a row whose
//! `user_id` differs from the caller's owner is reported as
//! [`Error::NotFound`], never revealing that it exists.
//!
//! # Examples
//!
//! ```
//! # #[tokio::main]
//! # async fn main() {
//! use tasklist::store::{InMemoryTaskStore, TaskStore};
//! use tasklist::types::NewTask;
//!
//! let store = InMemoryTaskStore::new();
//! let task = store.insert(NewTask::new("user-1", "buy milk").unwrap()).await.unwrap();
//! assert_eq!(store.list("user-1").await.unwrap(), vec![task]);
//! assert!(store.list("user-2").await.unwrap().is_empty());
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{Error, Result};
use crate::types::{NewTask, Task};

use super::TaskStore;

/// A row plus its insertion sequence, used to break `created_at` ties.
#[derive(Debug, Clone)]
struct StoredTask {
    task: Task,
    seq: u64,
}

/// Thread-safe in-memory [`TaskStore`].
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    rows: DashMap<String, StoredTask>,
    next_seq: AtomicU64,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing rows, keeping their IDs and timestamps.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let store = Self::new();
        for task in tasks {
            store.put(task);
        }
        store
    }

    /// Returns the number of rows across all owners.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn put(&self, task: Task) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.rows.insert(task.id.clone(), StoredTask { task, seq });
    }

    fn owned_rows(&self, owner_id: &str) -> Vec<StoredTask> {
        self.rows
            .iter()
            .filter(|entry| entry.value().task.user_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<Task>> {
        let mut rows = self.owned_rows(owner_id);
        rows.sort_by(|a, b| {
            b.task
                .created_at
                .cmp(&a.task.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        Ok(rows.into_iter().map(|row| row.task).collect())
    }

    async fn completion_flags(&self, owner_id: &str) -> Result<Vec<bool>> {
        Ok(self
            .rows
            .iter()
            .filter(|entry| entry.value().task.user_id == owner_id)
            .map(|entry| entry.value().task.completed)
            .collect())
    }

    async fn insert(&self, new_task: NewTask) -> Result<Task> {
        let task = Task::from_new(new_task);
        if self.rows.contains_key(&task.id) {
            return Err(Error::store(format!(
                "duplicate key value violates unique constraint: {}",
                task.id
            )));
        }
        self.put(task.clone());
        Ok(task)
    }

    async fn set_completed(&self, task_id: &str, owner_id: &str, completed: bool) -> Result<Task> {
        let mut entry = self
            .rows
            .get_mut(task_id)
            .filter(|entry| entry.value().task.user_id == owner_id)
            .ok_or_else(|| Error::NotFound {
                task_id: task_id.to_string(),
            })?;
        entry.value_mut().task.completed = completed;
        Ok(entry.value().task.clone())
    }

    async fn delete(&self, task_id: &str, owner_id: &str) -> Result<()> {
        self.rows
            .remove_if(task_id, |_, row| row.task.user_id == owner_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound {
                task_id: task_id.to_string(),
            })
    }
}
