//! Status transition rules for the task lifecycle.
//!
//! The graph is fixed:
//!
//! - `Todo` → `InProgress`
//! - `InProgress` → `Todo`, `Done`
//! - `Done` → `InProgress`
//!
//! Self-transitions are absent from the table. Callers treat an unchanged
//! status as a no-op and never ask.

use super::{TaskDomainError, TaskId, TaskStatus};

/// Returns the statuses reachable from `current` in one step.
#[must_use]
pub const fn allowed_transitions(current: TaskStatus) -> &'static [TaskStatus] {
    match current {
        TaskStatus::Todo => &[TaskStatus::InProgress],
        TaskStatus::InProgress => &[TaskStatus::Todo, TaskStatus::Done],
        TaskStatus::Done => &[TaskStatus::InProgress],
    }
}

/// Returns whether the graph contains the edge `current → target`.
#[must_use]
pub fn is_transition_allowed(current: TaskStatus, target: TaskStatus) -> bool {
    allowed_transitions(current).contains(&target)
}

/// Checks the edge `current → target` for the given task.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidStatusTransition`] when the graph has no
/// such edge.
pub fn ensure_transition(
    task_id: TaskId,
    current: TaskStatus,
    target: TaskStatus,
) -> Result<(), TaskDomainError> {
    if is_transition_allowed(current, target) {
        return Ok(());
    }
    Err(TaskDomainError::InvalidStatusTransition {
        task_id,
        from: current,
        to: target,
    })
}
