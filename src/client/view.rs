//! View model for the task list.
//!
//! Pure functions of cached query data. `Loading` (the list query has not
//! resolved) and `Empty` (it resolved with zero tasks) are distinct states.

use crate::types::Task;

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    /// Task identity, passed back to toggle/delete.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Current completed flag.
    pub completed: bool,
    /// The value a toggle affordance on this row should send.
    pub toggle_to: bool,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            text: task.text.clone(),
            completed: task.completed,
            toggle_to: task.toggled(),
        }
    }
}

/// What the list area should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskListView {
    /// No list data yet.
    Loading,
    /// Confirmed zero tasks.
    Empty,
    /// One row per task, in list order.
    Items(Vec<TaskRow>),
}

impl TaskListView {
    /// Build the view from the list query's data, `None` meaning unresolved.
    pub fn from_query(tasks: Option<&[Task]>) -> Self {
        match tasks {
            None => Self::Loading,
            Some([]) => Self::Empty,
            Some(tasks) => Self::Items(tasks.iter().map(TaskRow::from).collect()),
        }
    }
}

/// Header line summarizing open tasks.
///
/// # Examples
///
/// ```
/// use tasklist::client::view::summary_line;
///
/// assert_eq!(summary_line(0), "All caught up!");
/// assert_eq!(summary_line(1), "You have 1 active task");
/// assert_eq!(summary_line(4), "You have 4 active tasks");
/// ```
pub fn summary_line(active: u64) -> String {
    match active {
        0 => "All caught up!".to_string(),
        1 => "You have 1 active task".to_string(),
        n => format!("You have {n} active tasks"),
    }
}
