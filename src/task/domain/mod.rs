//! Domain model for task management.
//!
//! The task domain models validated task content, the status lifecycle,
//! soft deletion and listing queries while keeping all infrastructure
//! concerns outside of the domain boundary.

mod content;
mod error;
mod ids;
pub mod lifecycle;
mod priority;
mod query;
mod status;
mod task;

pub use content::{FieldUpdate, TaskDescription, TaskTitle};
pub use error::{ParseTaskIdError, ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use priority::TaskPriority;
pub use query::{
    Pagination, SortDirection, TaskFilter, TaskListQuery, TaskPage, TaskSort, TaskSortField,
};
pub use status::TaskStatus;
pub use task::{NewTask, PersistedTaskData, Task, TaskChanges, TaskPatch};
