//! Task aggregate root and the inputs that create or change it.

use super::{
    FieldUpdate, TaskDescription, TaskDomainError, TaskId, TaskPriority, TaskStatus, TaskTitle,
    lifecycle,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

/// Validated values for a task that has not been created yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: TaskTitle,
    description: TaskDescription,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Creates task values with default description, status and priority.
    #[must_use]
    pub fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: TaskDescription::default(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: TaskDescription) -> Self {
        self.description = description;
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Validated partial update of a task.
///
/// Absent non-nullable fields are left unchanged. Nullable fields use
/// [`FieldUpdate`] so that clearing is distinct from leaving alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    title: Option<TaskTitle>,
    description: Option<TaskDescription>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: FieldUpdate<DateTime<Utc>>,
    completed_at: FieldUpdate<DateTime<Utc>>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: TaskTitle) -> Self {
        self.title = Some(title);
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: TaskDescription) -> Self {
        self.description = Some(description);
        self
    }

    /// Requests a status change.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: FieldUpdate<DateTime<Utc>>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Sets or clears the completion timestamp.
    #[must_use]
    pub const fn with_completed_at(mut self, completed_at: FieldUpdate<DateTime<Utc>>) -> Self {
        self.completed_at = completed_at;
        self
    }

    /// Returns the requested status, if any.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }
}

/// Field-level write computed by a validated task operation.
///
/// Only the fields the operation touched are carried; storage leaves every
/// other column as it finds it. The write applies only while the stored
/// soft-delete marker still equals [`TaskChanges::expects_deleted`], so an
/// update planned against a live task cannot land on one deleted meanwhile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    expects_deleted: bool,
    title: Option<TaskTitle>,
    description: Option<TaskDescription>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: FieldUpdate<DateTime<Utc>>,
    completed_at: FieldUpdate<DateTime<Utc>>,
    deleted_at: FieldUpdate<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl TaskChanges {
    fn touching(task: &Task, updated_at: DateTime<Utc>) -> Self {
        Self {
            expects_deleted: task.is_deleted,
            title: None,
            description: None,
            status: None,
            priority: None,
            due_date: FieldUpdate::Keep,
            completed_at: FieldUpdate::Keep,
            deleted_at: FieldUpdate::Keep,
            updated_at,
        }
    }

    /// Returns the soft-delete marker the stored task must still carry.
    #[must_use]
    pub const fn expects_deleted(&self) -> bool {
        self.expects_deleted
    }

    /// Returns the new title, if changed.
    #[must_use]
    pub const fn title(&self) -> Option<&TaskTitle> {
        self.title.as_ref()
    }

    /// Returns the new description, if changed.
    #[must_use]
    pub const fn description(&self) -> Option<&TaskDescription> {
        self.description.as_ref()
    }

    /// Returns the new status, if changed.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the new priority, if changed.
    #[must_use]
    pub const fn priority(&self) -> Option<TaskPriority> {
        self.priority
    }

    /// Returns the due-date change.
    #[must_use]
    pub const fn due_date(&self) -> FieldUpdate<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the completion-timestamp change.
    #[must_use]
    pub const fn completed_at(&self) -> FieldUpdate<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the soft-delete change: `Set` deletes, `Clear` restores.
    #[must_use]
    pub const fn deletion(&self) -> FieldUpdate<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns the write timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Writes the carried fields onto `task`.
    ///
    /// No lifecycle rule is checked here; the changes were validated when
    /// they were computed.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        self.due_date.apply_to(&mut task.due_date);
        self.completed_at.apply_to(&mut task.completed_at);
        match self.deleted_at {
            FieldUpdate::Keep => {}
            FieldUpdate::Set(timestamp) => {
                task.is_deleted = true;
                task.deleted_at = Some(timestamp);
            }
            FieldUpdate::Clear => {
                task.is_deleted = false;
                task.deleted_at = None;
            }
        }
        task.updated_at = self.updated_at;
    }
}

/// Task aggregate root.
///
/// Tasks are built through [`Task::new`] or [`Task::from_persisted`] only,
/// so every title and description has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: TaskDescription,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: TaskDescription,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted due date, if any.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted completion timestamp, if any.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted soft-delete marker.
    pub is_deleted: bool,
    /// Persisted soft-delete timestamp, if any.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task with a fresh identifier.
    ///
    /// Creation is not a transition, so a task created as
    /// [`TaskStatus::Done`] has no completion timestamp.
    #[must_use]
    pub fn new(new_task: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let NewTask {
            title,
            description,
            status,
            priority,
            due_date,
        } = new_task;

        Self {
            id: TaskId::new(),
            title,
            description,
            status,
            priority,
            due_date,
            completed_at: None,
            is_deleted: false,
            deleted_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            due_date: data.due_date,
            completed_at: data.completed_at,
            is_deleted: data.is_deleted,
            deleted_at: data.deleted_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns when the task last moved into [`TaskStatus::Done`], if ever.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns whether the task is soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Returns when the task was soft-deleted, if it is.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest write timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the task to `target` along the lifecycle graph.
    ///
    /// Entering [`TaskStatus::Done`] records the completion timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the graph has
    /// no edge to `target`, including `target == self.status()`. The task is
    /// left untouched in that case.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        lifecycle::ensure_transition(self.id, self.status, target)?;
        let timestamp = clock.utc();
        self.enter_status(target, timestamp);
        self.updated_at = timestamp;
        Ok(())
    }

    /// Applies a partial update and returns the fields it wrote.
    ///
    /// A requested status equal to the current one is a no-op and skips the
    /// lifecycle check. Entering [`TaskStatus::Done`] records the completion
    /// timestamp, overriding any `completed_at` in the same patch.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the requested
    /// status change is not allowed. No field is modified in that case.
    pub fn apply_patch(
        &mut self,
        patch: TaskPatch,
        clock: &impl Clock,
    ) -> Result<TaskChanges, TaskDomainError> {
        let TaskPatch {
            title,
            description,
            status,
            priority,
            due_date,
            completed_at,
        } = patch;

        let status_change = status.filter(|target| *target != self.status);
        if let Some(target) = status_change {
            lifecycle::ensure_transition(self.id, self.status, target)?;
        }

        let timestamp = clock.utc();
        let entering_done = status_change == Some(TaskStatus::Done);
        let changes = TaskChanges {
            title,
            description,
            status: status_change,
            priority,
            due_date,
            completed_at: if entering_done {
                FieldUpdate::Set(timestamp)
            } else {
                completed_at
            },
            ..TaskChanges::touching(self, timestamp)
        };
        changes.apply_to(self);
        Ok(changes)
    }

    /// Marks the task as soft-deleted and returns the fields it wrote.
    pub fn mark_deleted(&mut self, clock: &impl Clock) -> TaskChanges {
        let timestamp = clock.utc();
        let changes = TaskChanges {
            deleted_at: FieldUpdate::Set(timestamp),
            ..TaskChanges::touching(self, timestamp)
        };
        changes.apply_to(self);
        changes
    }

    /// Clears the soft-delete marker and returns the fields it wrote.
    pub fn restore(&mut self, clock: &impl Clock) -> TaskChanges {
        let changes = TaskChanges {
            deleted_at: FieldUpdate::Clear,
            ..TaskChanges::touching(self, clock.utc())
        };
        changes.apply_to(self);
        changes
    }

    /// Sets the status after the edge has been validated.
    ///
    /// The completion timestamp is kept when leaving `Done`.
    fn enter_status(&mut self, target: TaskStatus, timestamp: DateTime<Utc>) {
        if target == TaskStatus::Done && self.status != TaskStatus::Done {
            self.completed_at = Some(timestamp);
        }
        self.status = target;
    }
}
