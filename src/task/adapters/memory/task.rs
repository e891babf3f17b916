//! In-memory task repository for tests and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Task, TaskChanges, TaskId, TaskListQuery, TaskPage},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: &impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn select_page(tasks: &HashMap<TaskId, Task>, query: &TaskListQuery) -> TaskPage {
    let mut matching: Vec<&Task> = tasks
        .values()
        .filter(|task| query.filter.matches(task))
        .collect();
    matching.sort_by(|left, right| query.sort.compare(left, right));

    let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
    let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(query.pagination.limit()).unwrap_or(usize::MAX);
    let page_tasks = matching
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    TaskPage {
        tasks: page_tasks,
        total,
        pagination: query.pagination,
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        if state.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, id: TaskId, changes: &TaskChanges) -> TaskRepositoryResult<Task> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        let stored = state
            .get_mut(&id)
            .filter(|task| task.is_deleted() == changes.expects_deleted())
            .ok_or(TaskRepositoryError::NotFound(id))?;
        changes.apply_to(stored);
        Ok(stored.clone())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.get(&id).cloned())
    }

    async fn find_page(&self, query: &TaskListQuery) -> TaskRepositoryResult<TaskPage> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(select_page(&state, query))
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        state
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskRepositoryError::NotFound(id))
    }
}
