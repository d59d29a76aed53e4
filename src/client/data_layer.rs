//! Cache-backed client for one signed-in user.
//!
//! [`TaskClient`] reads through the [`QueryCache`] and performs mutations
//! against the [`TaskStore`]. Mutations never patch cached data: on success
//! they invalidate every [`QueryKey`] and emit a [`Notification`]; the next
//! read refetches from the store and the count source.

use std::fmt;
use std::sync::Arc;

use crate::client::cache::{QueryCache, QueryData, QueryKey};
use crate::client::counts::CountSource;
use crate::client::notify::{Notification, Notifier, TracingNotifier};
use crate::client::view::{summary_line, TaskListView};
use crate::error::{Error, Result};
use crate::store::TaskStore;
use crate::types::{NewTask, Task, TaskCount};

/// The signed-in user and the bearer token issued for them.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Owner identity for every task this client touches.
    pub user_id: String,
    /// Token sent to the count endpoint.
    pub access_token: String,
}

impl Session {
    /// Create a session.
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Data layer for the task list and its counts.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tasklist::client::{RecordingNotifier, Session, TaskClient};
/// use tasklist::server::auth::MockValidator;
/// use tasklist::server::CountService;
/// use tasklist::store::InMemoryTaskStore;
///
/// # #[tokio::main]
/// # async fn main() -> tasklist::Result<()> {
/// let store = Arc::new(InMemoryTaskStore::new());
/// let validator = Arc::new(MockValidator::new().with_token("tok", "alice"));
/// let counts = Arc::new(CountService::new(validator, store.clone()));
///
/// let client = TaskClient::new(Session::new("alice", "tok"), store, counts)
///     .with_notifier(Arc::new(RecordingNotifier::new()));
///
/// client.create("  water plants ").await?;
/// let tasks = client.tasks().await?;
/// assert_eq!(tasks[0].text, "water plants");
/// assert_eq!(client.counts().await?.total_count(), 1);
/// # Ok(())
/// # }
/// ```
pub struct TaskClient {
    session: Session,
    store: Arc<dyn TaskStore>,
    counts: Arc<dyn CountSource>,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for TaskClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskClient")
            .field("session", &self.session)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl TaskClient {
    /// Create a client with a private cache and log-only notifications.
    pub fn new(
        session: Session,
        store: Arc<dyn TaskStore>,
        counts: Arc<dyn CountSource>,
    ) -> Self {
        Self {
            session,
            store,
            counts,
            cache: Arc::new(QueryCache::new()),
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Use a shared cache, e.g. one a UI layer already subscribes to.
    pub fn with_cache(mut self, cache: Arc<QueryCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Route notifications to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// The cache backing this client.
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// The session this client acts for.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The owner's tasks, newest first. Served from cache when fresh.
    pub async fn tasks(&self) -> Result<Vec<Task>> {
        if let Some(tasks) = self.cache.fresh(QueryKey::Tasks).and_then(QueryData::into_tasks) {
            return Ok(tasks);
        }
        let generation = self.cache.generation(QueryKey::Tasks);
        let tasks = self.store.list(&self.session.user_id).await?;
        tracing::debug!(count = tasks.len(), "fetched task list");
        self.cache
            .store(QueryKey::Tasks, generation, QueryData::Tasks(tasks.clone()));
        Ok(tasks)
    }

    /// The owner's counts. Served from cache when fresh.
    pub async fn counts(&self) -> Result<TaskCount> {
        if let Some(counts) = self
            .cache
            .fresh(QueryKey::TaskCounts)
            .and_then(QueryData::into_counts)
        {
            return Ok(counts);
        }
        let generation = self.cache.generation(QueryKey::TaskCounts);
        let counts = self.counts.fetch_counts(&self.session.access_token).await?;
        tracing::debug!(
            total = counts.total_count(),
            completed = counts.completed_count(),
            "fetched task counts"
        );
        self.cache
            .store(QueryKey::TaskCounts, generation, QueryData::TaskCounts(counts));
        Ok(counts)
    }

    /// The list view as of the last resolved list query, without fetching.
    pub fn list_view(&self) -> TaskListView {
        let tasks = self.cache.get(QueryKey::Tasks).and_then(QueryData::into_tasks);
        TaskListView::from_query(tasks.as_deref())
    }

    /// Refresh both queries concurrently and return the list view.
    pub async fn refresh(&self) -> Result<TaskListView> {
        let (tasks, _) = futures::try_join!(self.tasks(), self.counts())?;
        Ok(TaskListView::from_query(Some(&tasks)))
    }

    /// The header summary line for the current counts.
    pub async fn summary(&self) -> Result<String> {
        Ok(summary_line(self.counts().await?.active_count()))
    }

    /// Create a task from user-entered text.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `text` is blank. Nothing is sent and no
    ///   notification is emitted.
    /// - The store's error if the insert fails. An error notification is
    ///   emitted and the cache is left untouched.
    pub async fn create(&self, text: &str) -> Result<Task> {
        let new_task = NewTask::new(self.session.user_id.clone(), text)?;
        let result = self.store.insert(new_task).await;
        self.settle(result, |_| Notification::task_added())
    }

    /// Persist `completed` for one task and wait for the round trip.
    pub async fn toggle(&self, task_id: &str, completed: bool) -> Result<Task> {
        let result = self
            .store
            .set_completed(task_id, &self.session.user_id, completed)
            .await;
        self.settle(result, |task| Notification::task_updated(task.completed))
    }

    /// Toggle `task` relative to its last known state.
    pub async fn toggle_task(&self, task: &Task) -> Result<Task> {
        self.toggle(&task.id, task.toggled()).await
    }

    /// Delete one task.
    pub async fn delete(&self, task_id: &str) -> Result<()> {
        let result = self.store.delete(task_id, &self.session.user_id).await;
        self.settle(result, |_| Notification::task_deleted())
    }

    fn settle<T>(&self, result: Result<T>, on_success: impl FnOnce(&T) -> Notification) -> Result<T> {
        match result {
            Ok(value) => {
                self.cache.invalidate_many(&QueryKey::ALL);
                self.notifier.notify(on_success(&value));
                Ok(value)
            },
            Err(err) => {
                tracing::warn!(error = %err, "task mutation failed");
                self.notifier.notify(Notification::from(&err));
                Err(err)
            },
        }
    }
}

impl From<&Error> for Notification {
    fn from(err: &Error) -> Self {
        Notification::failure(err.to_string())
    }
}
