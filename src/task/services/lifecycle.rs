//! Service layer for task creation, listing, updates and deletion.

use crate::task::{
    domain::{
        FieldUpdate, NewTask, Task, TaskDescription, TaskDomainError, TaskId, TaskListQuery,
        TaskPage, TaskPatch, TaskPriority, TaskStatus, TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial status instead of [`TaskStatus::Todo`].
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the priority instead of [`TaskPriority::Medium`].
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    fn into_new_task(self) -> Result<NewTask, TaskDomainError> {
        let mut new_task = NewTask::new(TaskTitle::new(self.title)?);
        if let Some(description) = self.description {
            new_task = new_task.with_description(TaskDescription::new(description)?);
        }
        if let Some(status) = self.status {
            new_task = new_task.with_status(status);
        }
        if let Some(priority) = self.priority {
            new_task = new_task.with_priority(priority);
        }
        if let Some(due_date) = self.due_date {
            new_task = new_task.with_due_date(due_date);
        }
        Ok(new_task)
    }
}

/// Request payload for a partial task update.
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: FieldUpdate<DateTime<Utc>>,
    completed_at: FieldUpdate<DateTime<Utc>>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
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

    /// Sets or clears the completion timestamp directly.
    #[must_use]
    pub const fn with_completed_at(mut self, completed_at: FieldUpdate<DateTime<Utc>>) -> Self {
        self.completed_at = completed_at;
        self
    }

    fn into_patch(self) -> Result<TaskPatch, TaskDomainError> {
        let mut patch = TaskPatch::new()
            .with_due_date(self.due_date)
            .with_completed_at(self.completed_at);
        if let Some(title) = self.title {
            patch = patch.with_title(TaskTitle::new(title)?);
        }
        if let Some(description) = self.description {
            patch = patch.with_description(TaskDescription::new(description)?);
        }
        if let Some(status) = self.status {
            patch = patch.with_status(status);
        }
        if let Some(priority) = self.priority {
            patch = patch.with_priority(priority);
        }
        Ok(patch)
    }
}

/// Transport-independent classification of task service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskErrorKind {
    /// Input failed field or query validation.
    ValidationFailed,
    /// The task does not exist or is not visible to the operation.
    NotFound,
    /// The requested status change is not allowed.
    InvalidTransition,
    /// Storage or another dependency failed.
    Internal,
}

impl TaskErrorKind {
    /// Returns the stable name used in error payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "ValidationFailed",
            Self::NotFound => "NotFound",
            Self::InvalidTransition => "InvalidTransition",
            Self::Internal => "Internal",
        }
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The task does not exist or is in the wrong deletion state.
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),
}

impl TaskLifecycleError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> TaskErrorKind {
        match self {
            Self::Domain(TaskDomainError::InvalidStatusTransition { .. }) => {
                TaskErrorKind::InvalidTransition
            }
            Self::Domain(_) => TaskErrorKind::ValidationFailed,
            Self::NotFound(_) => TaskErrorKind::NotFound,
            Self::Repository(_) => TaskErrorKind::Internal,
        }
    }
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => Self::NotFound(task_id),
            other => Self::Repository(other),
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskLifecycleService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates and persists a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when the title or description
    /// is invalid, or [`TaskLifecycleError::Repository`] when persistence
    /// fails.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let new_task = request.into_new_task()?;
        let task = Task::new(new_task, &*self.clock);
        self.repository.store(&task).await?;
        info!(task_id = %task.id(), status = %task.status(), "task created");
        Ok(task)
    }

    /// Lists tasks matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when the due-date range is
    /// empty, or [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list(&self, query: TaskListQuery) -> TaskLifecycleResult<TaskPage> {
        query.filter.validate()?;
        let page = self.repository.find_page(&query).await?;
        debug!(
            total = page.total,
            page = page.pagination.page(),
            limit = page.pagination.limit(),
            "tasks listed"
        );
        Ok(page)
    }

    /// Retrieves a task that has not been soft-deleted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is absent or
    /// soft-deleted.
    pub async fn get(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        let task = self.find_active(id).await?;
        debug!(task_id = %id, "task fetched");
        Ok(task)
    }

    /// Applies a partial update to a task that has not been soft-deleted.
    ///
    /// The request is validated before the task is looked up. Only the
    /// fields it names are written, and the write is refused if the task was
    /// soft-deleted after it was read. Moving into [`TaskStatus::Done`]
    /// records the completion time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when a field is invalid or the
    /// status change is not allowed, and [`TaskLifecycleError::NotFound`]
    /// when the task is absent or soft-deleted.
    pub async fn update(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let patch = request.into_patch()?;
        let mut task = self.find_active(id).await?;
        let previous_status = task.status();
        let changes = task.apply_patch(patch, &*self.clock)?;
        let updated = self.repository.update(id, &changes).await?;
        info!(
            task_id = %id,
            from = %previous_status,
            to = %updated.status(),
            "task updated"
        );
        Ok(updated)
    }

    /// Marks a task as deleted without erasing it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is absent or
    /// already soft-deleted.
    pub async fn soft_delete(&self, id: TaskId) -> TaskLifecycleResult<()> {
        let mut task = self.find_active(id).await?;
        let changes = task.mark_deleted(&*self.clock);
        self.repository.update(id, &changes).await?;
        info!(task_id = %id, "task soft-deleted");
        Ok(())
    }

    /// Clears the soft-delete marker of a deleted task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is absent or
    /// not soft-deleted.
    pub async fn restore(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        let mut task = self
            .repository
            .find_by_id(id)
            .await?
            .filter(Task::is_deleted)
            .ok_or(TaskLifecycleError::NotFound(id))?;
        let changes = task.restore(&*self.clock);
        let restored = self.repository.update(id, &changes).await?;
        info!(task_id = %id, "task restored");
        Ok(restored)
    }

    /// Permanently erases a task, deleted or not.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is absent.
    pub async fn hard_delete(&self, id: TaskId) -> TaskLifecycleResult<()> {
        self.repository.delete(id).await?;
        info!(task_id = %id, "task erased");
        Ok(())
    }

    async fn find_active(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|task| !task.is_deleted())
            .ok_or(TaskLifecycleError::NotFound(id))
    }
}
