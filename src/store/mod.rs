//! Task store trait and implementations.
//!
//! # Architecture
//!
//! [`TaskStore`] is the type-erasure interface used as `Arc<dyn TaskStore>`
//! by the aggregation service and the client data layer. Every operation is
//! scoped to an owner: a row is only readable or writable by the user that
//! owns it, and an owner mismatch is indistinguishable from not-found.
//!
//! # Implementations
//!
//! - [`InMemoryTaskStore`](memory::InMemoryTaskStore) -- thread-safe store
//!   backed by `DashMap`, used for tests and local development.
//! - [`RestTaskStore`](rest::RestTaskStore) -- client for the hosted data
//!   store's row API. Available behind the `http-client` feature flag.

pub mod memory;
#[cfg(feature = "http-client")]
pub mod rest;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{NewTask, Task};

pub use memory::InMemoryTaskStore;
#[cfg(feature = "http-client")]
pub use rest::{RestStoreConfig, RestTaskStore};

/// Owner-scoped persistence for tasks.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to support concurrent access from
/// multiple request handlers.
///
/// # Ordering
///
/// [`list`](TaskStore::list) returns tasks ordered by `created_at`, newest
/// first. Callers must not rely on any other ordering.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Lists all tasks owned by `owner_id`, newest first.
    ///
    /// # Errors
    ///
    /// - [`Error::Store`](crate::Error::Store) on backend failures.
    async fn list(&self, owner_id: &str) -> Result<Vec<Task>>;

    /// Fetches only the `completed` flag of every task owned by `owner_id`.
    ///
    /// This is the projection the aggregation service needs; the filter is
    /// applied by the store so other owners' rows are never loaded.
    ///
    /// # Errors
    ///
    /// - [`Error::Store`](crate::Error::Store) on backend failures.
    async fn completion_flags(&self, owner_id: &str) -> Result<Vec<bool>>;

    /// Inserts a task for the payload's owner and returns the stored row.
    ///
    /// # Errors
    ///
    /// - [`Error::Store`](crate::Error::Store) on constraint violations or
    ///   backend failures.
    async fn insert(&self, new_task: NewTask) -> Result<Task>;

    /// Sets the `completed` flag of one task and returns the updated row.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`](crate::Error::NotFound) if no task with the ID
    ///   exists for this owner.
    /// - [`Error::Store`](crate::Error::Store) on backend failures.
    async fn set_completed(&self, task_id: &str, owner_id: &str, completed: bool) -> Result<Task>;

    /// Deletes one task.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`](crate::Error::NotFound) if no task with the ID
    ///   exists for this owner.
    /// - [`Error::Store`](crate::Error::Store) on backend failures.
    async fn delete(&self, task_id: &str, owner_id: &str) -> Result<()>;
}
