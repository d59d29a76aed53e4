//! # tasklist
//!
//! A personal task list backed by a hosted row store, with an authenticated
//! aggregation endpoint and a cache-backed client data layer.
//!
//! # Overview
//!
//! The service half answers `count-todos`: given a bearer token it resolves
//! the caller through the authentication provider, reads only the caller's
//! `completed` flags from the store and returns
//! `{ "totalCount": n, "completedCount": m }`. Every response carries
//! permissive CORS headers and every failure is a 400 with `{ "error": msg }`.
//!
//! The client half keeps two cached queries (the task list and the counts)
//! consistent with the store by invalidating both after every successful
//! create, toggle or delete.
//!
//! # Module Organization
//!
//! - [`types`] - `Task`, `NewTask` and `TaskCount`
//! - [`store`] - owner-scoped persistence (`InMemoryTaskStore`, `RestTaskStore`)
//! - [`server`] - token validation, `CountService` and the axum transport
//! - [`client`] - `QueryCache`, `TaskClient` and the view model
//! - [`error`] - the crate-wide error type
//!
//! # Features
//!
//! - `server` - axum router and listener for the count endpoint
//! - `http-client` - reqwest-backed store, token validator and count source
//! - `logging` - [`init_logging`] via `tracing-subscriber`
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tasklist::server::auth::MockValidator;
//! use tasklist::server::CountService;
//! use tasklist::store::{InMemoryTaskStore, TaskStore};
//! use tasklist::types::NewTask;
//!
//! # #[tokio::main]
//! # async fn main() -> tasklist::Result<()> {
//! let store = Arc::new(InMemoryTaskStore::new());
//! store.insert(NewTask::new("alice", "read")?).await?;
//!
//! let validator = Arc::new(MockValidator::new().with_token("t0k", "alice"));
//! let service = CountService::new(validator, store);
//!
//! let counts = service.count(Some("Bearer t0k")).await?;
//! assert_eq!((counts.total_count(), counts.completed_count()), (1, 0));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod server;
pub mod shared;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use types::{NewTask, Task, TaskCount};

/// Install a global `tracing` subscriber writing formatted events to stderr.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
#[cfg(feature = "logging")]
pub fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
