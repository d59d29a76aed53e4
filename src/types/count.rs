//! The derived `{ totalCount, completedCount }` aggregate.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Total and completed task counts for one owner.
///
/// Never persisted; recomputed on demand. The invariant
/// `completed_count <= total_count` holds for every value of this type,
/// including values deserialized from the wire.
///
/// # Examples
///
/// ```
/// use tasklist::types::TaskCount;
///
/// let count = TaskCount::tally([false, true, true]);
/// assert_eq!(count.total_count(), 3);
/// assert_eq!(count.completed_count(), 2);
/// assert_eq!(count.active_count(), 1);
///
/// let json = serde_json::to_value(count).unwrap();
/// assert_eq!(json, serde_json::json!({ "totalCount": 3, "completedCount": 2 }));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTaskCount")]
pub struct TaskCount {
    total_count: u64,
    completed_count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTaskCount {
    total_count: u64,
    completed_count: u64,
}

impl TryFrom<RawTaskCount> for TaskCount {
    type Error = Error;

    fn try_from(raw: RawTaskCount) -> Result<Self> {
        Self::new(raw.total_count, raw.completed_count)
    }
}

impl TaskCount {
    /// Builds a count, checking `completed <= total`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `completed` exceeds `total`.
    pub fn new(total: u64, completed: u64) -> Result<Self> {
        if completed > total {
            return Err(Error::validation(format!(
                "completedCount {completed} exceeds totalCount {total}"
            )));
        }
        Ok(Self {
            total_count: total,
            completed_count: completed,
        })
    }

    /// Counts completion flags in a single traversal.
    pub fn tally<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        flags
            .into_iter()
            .fold(Self::default(), |mut acc, completed| {
                acc.total_count += 1;
                if completed {
                    acc.completed_count += 1;
                }
                acc
            })
    }

    /// Number of tasks owned.
    #[inline]
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Number of owned tasks with `completed = true`.
    #[inline]
    pub fn completed_count(&self) -> u64 {
        self.completed_count
    }

    /// Number of owned tasks still open.
    #[inline]
    pub fn active_count(&self) -> u64 {
        self.total_count - self.completed_count
    }
}

impl FromIterator<bool> for TaskCount {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self::tally(iter)
    }
}
