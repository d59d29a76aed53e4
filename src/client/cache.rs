//! Keyed query cache with explicit invalidation.
//!
//! [`QueryCache`] maps a [`QueryKey`] to an entry holding the last fetched
//! data, a staleness flag and a subscriber list. Nothing is patched in
//! place: after a mutation the data layer invalidates the affected keys and
//! the next read refetches.
//!
//! # Fetch generations
//!
//! Each entry carries a generation counter bumped on every invalidation. A
//! fetch records the generation it started under ([`QueryCache::generation`])
//! and hands it back to [`QueryCache::store`]; if an invalidation happened in
//! between, the data is kept but the entry stays stale, so the next read
//! refetches instead of trusting a pre-mutation snapshot.
//!
//! # Examples
//!
//! ```
//! use tasklist::client::cache::{CacheEvent, QueryCache, QueryData, QueryKey};
//! use tasklist::types::TaskCount;
//!
//! let cache = QueryCache::new();
//! let mut events = cache.subscribe(QueryKey::TaskCounts);
//!
//! let generation = cache.generation(QueryKey::TaskCounts);
//! cache.store(QueryKey::TaskCounts, generation, QueryData::TaskCounts(TaskCount::default()));
//! assert!(cache.fresh(QueryKey::TaskCounts).is_some());
//!
//! cache.invalidate(QueryKey::TaskCounts);
//! assert!(cache.fresh(QueryKey::TaskCounts).is_none());
//! assert!(cache.get(QueryKey::TaskCounts).is_some());
//!
//! assert_eq!(events.try_recv().unwrap(), CacheEvent::Updated(QueryKey::TaskCounts));
//! assert_eq!(events.try_recv().unwrap(), CacheEvent::Invalidated(QueryKey::TaskCounts));
//! ```

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::types::{Task, TaskCount};

/// Cached query identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The current owner's tasks, newest first.
    Tasks,
    /// The aggregation endpoint's `{ totalCount, completedCount }`.
    TaskCounts,
}

impl QueryKey {
    /// Both keys; every task mutation invalidates all of them.
    pub const ALL: [QueryKey; 2] = [QueryKey::Tasks, QueryKey::TaskCounts];

    /// Stable string form of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tasks => "todos",
            Self::TaskCounts => "todo-counts",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data held for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryData {
    /// Result of the task list query.
    Tasks(Vec<Task>),
    /// Result of the count query.
    TaskCounts(TaskCount),
}

impl QueryData {
    /// The task list, if this is list data.
    pub fn into_tasks(self) -> Option<Vec<Task>> {
        match self {
            Self::Tasks(tasks) => Some(tasks),
            Self::TaskCounts(_) => None,
        }
    }

    /// The counts, if this is count data.
    pub fn into_counts(self) -> Option<TaskCount> {
        match self {
            Self::TaskCounts(count) => Some(count),
            Self::Tasks(_) => None,
        }
    }
}

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    /// Fresh data was stored for the key.
    Updated(QueryKey),
    /// The key was marked stale and must be refetched before use.
    Invalidated(QueryKey),
}

#[derive(Default)]
struct CacheEntry {
    data: Option<QueryData>,
    stale: bool,
    generation: u64,
    subscribers: Vec<mpsc::UnboundedSender<CacheEvent>>,
}

impl CacheEntry {
    fn publish(&mut self, event: CacheEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

/// Injectable query cache shared by a data layer and its views.
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        let mut map = f.debug_map();
        for (key, entry) in entries.iter() {
            map.entry(
                &key.as_str(),
                &format_args!(
                    "loaded={} stale={} generation={} subscribers={}",
                    entry.data.is_some(),
                    entry.stale,
                    entry.generation,
                    entry.subscribers.len()
                ),
            );
        }
        map.finish()
    }
}

impl QueryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last stored data for `key`, stale or not.
    pub fn get(&self, key: QueryKey) -> Option<QueryData> {
        self.entries.read().get(&key).and_then(|e| e.data.clone())
    }

    /// Stored data for `key` only if it has not been invalidated since.
    pub fn fresh(&self, key: QueryKey) -> Option<QueryData> {
        self.entries
            .read()
            .get(&key)
            .filter(|e| !e.stale)
            .and_then(|e| e.data.clone())
    }

    /// `true` if `key` has no data or has been invalidated.
    pub fn is_stale(&self, key: QueryKey) -> bool {
        self.entries
            .read()
            .get(&key)
            .map_or(true, |e| e.stale || e.data.is_none())
    }

    /// Current generation of `key`; pass it back to [`store`](Self::store).
    pub fn generation(&self, key: QueryKey) -> u64 {
        self.entries.read().get(&key).map_or(0, |e| e.generation)
    }

    /// Store fetched data. The entry becomes fresh only if no invalidation
    /// happened since `generation` was read. Returns whether it is fresh.
    pub fn store(&self, key: QueryKey, generation: u64, data: QueryData) -> bool {
        let mut entries = self.entries.write();
        let entry = entries.entry(key).or_default();
        entry.data = Some(data);
        entry.stale = entry.generation != generation;
        if entry.stale {
            tracing::debug!(key = key.as_str(), "discarding freshness of superseded fetch");
            return false;
        }
        entry.publish(CacheEvent::Updated(key));
        true
    }

    /// Mark `key` stale and notify its subscribers.
    pub fn invalidate(&self, key: QueryKey) {
        let mut entries = self.entries.write();
        let entry = entries.entry(key).or_default();
        entry.stale = true;
        entry.generation += 1;
        tracing::debug!(key = key.as_str(), generation = entry.generation, "invalidated query");
        entry.publish(CacheEvent::Invalidated(key));
    }

    /// Invalidate several keys, in order.
    pub fn invalidate_many(&self, keys: &[QueryKey]) {
        for key in keys {
            self.invalidate(*key);
        }
    }

    /// Subscribe to events for `key`. Dropping the receiver unsubscribes.
    pub fn subscribe(&self, key: QueryKey) -> mpsc::UnboundedReceiver<CacheEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.entries.write().entry(key).or_default().subscribers.push(tx);
        rx
    }

    /// Number of live subscribers for `key`.
    pub fn subscriber_count(&self, key: QueryKey) -> usize {
        self.entries
            .read()
            .get(&key)
            .map_or(0, |e| e.subscribers.iter().filter(|tx| !tx.is_closed()).count())
    }
}
