//! Task module - the todo record, its priority and list filters, and the
//! read-only snapshot the assistant works against.

pub mod task;

pub use task::{ListFilter, NewTask, Priority, Task, TaskId, TaskSnapshot, TaskUpdate};
pub(crate) use task::present_or_null;
