//! Client data layer for the task list.
//!
//! - [`cache`] -- keyed query cache with explicit invalidation.
//! - [`counts`] -- where the count query gets its data.
//! - [`data_layer`] -- [`TaskClient`], reads and mutations for one session.
//! - [`notify`] -- mutation outcome notifications.
//! - [`view`] -- the list view model and summary line.

pub mod cache;
pub mod counts;
pub mod data_layer;
pub mod notify;
pub mod view;

pub use cache::{CacheEvent, QueryCache, QueryData, QueryKey};
#[cfg(feature = "http-client")]
pub use counts::HttpCountSource;
pub use counts::CountSource;
pub use data_layer::{Session, TaskClient};
pub use notify::{Notification, Notifier, RecordingNotifier, TracingNotifier, Variant};
pub use view::{summary_line, TaskListView, TaskRow};
