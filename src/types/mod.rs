//! Domain types shared by the store, the aggregation service and the client.

pub mod count;
pub mod task;

pub use count::TaskCount;
pub use task::{NewTask, Task};
