//! Filter, sort and pagination values for task listings.

use super::{Task, TaskDomainError, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Predicate over tasks used by listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskFilter {
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    search: Option<String>,
    due_from: Option<DateTime<Utc>>,
    due_to: Option<DateTime<Utc>>,
    include_deleted: bool,
}

impl TaskFilter {
    /// Creates a filter matching every non-deleted task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to tasks with the given status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to tasks with the given priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Restricts to tasks whose title or description contains `term`,
    /// ignoring case. An empty term matches everything.
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.is_empty()).then_some(term);
        self
    }

    /// Restricts to tasks due at or after `from`.
    #[must_use]
    pub const fn with_due_from(mut self, from: DateTime<Utc>) -> Self {
        self.due_from = Some(from);
        self
    }

    /// Restricts to tasks due at or before `to`.
    #[must_use]
    pub const fn with_due_to(mut self, to: DateTime<Utc>) -> Self {
        self.due_to = Some(to);
        self
    }

    /// Includes soft-deleted tasks.
    #[must_use]
    pub const fn including_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }

    /// Returns the status constraint.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the priority constraint.
    #[must_use]
    pub const fn priority(&self) -> Option<TaskPriority> {
        self.priority
    }

    /// Returns the search term.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns the lower due-date bound.
    #[must_use]
    pub const fn due_from(&self) -> Option<DateTime<Utc>> {
        self.due_from
    }

    /// Returns the upper due-date bound.
    #[must_use]
    pub const fn due_to(&self) -> Option<DateTime<Utc>> {
        self.due_to
    }

    /// Returns whether soft-deleted tasks are included.
    #[must_use]
    pub const fn includes_deleted(&self) -> bool {
        self.include_deleted
    }

    /// Checks that the due-date bounds describe a non-empty range.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidDueDateRange`] when `due_from` is
    /// after `due_to`.
    pub fn validate(&self) -> Result<(), TaskDomainError> {
        match (self.due_from, self.due_to) {
            (Some(from), Some(to)) if from > to => {
                Err(TaskDomainError::InvalidDueDateRange { from, to })
            }
            _ => Ok(()),
        }
    }

    /// Returns whether `task` satisfies every constraint.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        if !self.include_deleted && task.is_deleted() {
            return false;
        }
        if self.status.is_some_and(|status| status != task.status()) {
            return false;
        }
        if self
            .priority
            .is_some_and(|priority| priority != task.priority())
        {
            return false;
        }
        if let Some(term) = self.search.as_deref() {
            let needle = term.to_lowercase();
            let in_title = task.title().as_str().to_lowercase().contains(&needle);
            let in_description = task.description().as_str().to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }
        if self.due_from.is_some() || self.due_to.is_some() {
            let Some(due) = task.due_date() else {
                return false;
            };
            if self.due_from.is_some_and(|from| due < from) {
                return false;
            }
            if self.due_to.is_some_and(|to| due > to) {
                return false;
            }
        }
        true
    }
}

/// Field used to order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskSortField {
    /// Creation timestamp.
    #[default]
    #[serde(alias = "created_at")]
    CreatedAt,
    /// Latest write timestamp.
    #[serde(alias = "updated_at")]
    UpdatedAt,
    /// Due date; tasks without one sort last.
    #[serde(alias = "due_date")]
    DueDate,
    /// Title, byte-wise.
    Title,
}

/// Direction of a listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[serde(alias = "ASC")]
    Asc,
    /// Largest first.
    #[default]
    #[serde(alias = "DESC")]
    Desc,
}

/// Ordering of a listing. Ties are broken by task id ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskSort {
    /// Field to order by.
    pub field: TaskSortField,
    /// Direction of the order.
    pub direction: SortDirection,
}

impl TaskSort {
    /// Creates an ordering.
    #[must_use]
    pub const fn new(field: TaskSortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Compares two tasks under this ordering.
    #[must_use]
    pub fn compare(&self, left: &Task, right: &Task) -> Ordering {
        let primary = match self.field {
            TaskSortField::CreatedAt => self.directed(left.created_at().cmp(&right.created_at())),
            TaskSortField::UpdatedAt => self.directed(left.updated_at().cmp(&right.updated_at())),
            TaskSortField::Title => self.directed(left.title().as_str().cmp(right.title().as_str())),
            TaskSortField::DueDate => match (left.due_date(), right.due_date()) {
                (Some(left_due), Some(right_due)) => self.directed(left_due.cmp(&right_due)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary.then_with(|| left.id().cmp(&right.id()))
    }

    const fn directed(&self, ordering: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Page number and size of a listing, clamped to the accepted ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    /// First page number.
    pub const FIRST_PAGE: u32 = 1;
    /// Page size used when none is given.
    pub const DEFAULT_LIMIT: u32 = 20;
    /// Smallest accepted page size.
    pub const MIN_LIMIT: u32 = 1;
    /// Largest accepted page size.
    pub const MAX_LIMIT: u32 = 100;

    /// Creates a pagination, clamping `page` to at least 1 and `limit` to
    /// `[MIN_LIMIT, MAX_LIMIT]`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(Self::FIRST_PAGE),
            limit: limit.clamp(Self::MIN_LIMIT, Self::MAX_LIMIT),
        }
    }

    /// Creates a pagination from untrusted, possibly negative or absent
    /// values.
    #[must_use]
    pub fn from_raw(page: Option<i64>, limit: Option<i64>) -> Self {
        let to_u32 = |value: i64| u32::try_from(value.max(0)).unwrap_or(u32::MAX);
        Self::new(
            page.map_or(Self::FIRST_PAGE, to_u32),
            limit.map_or(Self::DEFAULT_LIMIT, to_u32),
        )
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Returns the number of matching records before this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(Self::FIRST_PAGE, Self::DEFAULT_LIMIT)
    }
}

/// Complete listing request handed to repositories.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskListQuery {
    /// Which tasks to include.
    pub filter: TaskFilter,
    /// How to order them.
    pub sort: TaskSort,
    /// Which slice to return.
    pub pagination: Pagination,
}

impl TaskListQuery {
    /// Creates a query with default sort and pagination.
    #[must_use]
    pub fn new(filter: TaskFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Sets the ordering.
    #[must_use]
    pub const fn with_sort(mut self, sort: TaskSort) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the pagination.
    #[must_use]
    pub const fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

/// One page of matching tasks together with the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    /// Tasks on this page, in query order.
    pub tasks: Vec<Task>,
    /// Number of tasks matching the filter, ignoring pagination.
    pub total: u64,
    /// Pagination the page was produced with.
    pub pagination: Pagination,
}

impl TaskPage {
    /// Returns the number of pages needed for `total` matches.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.pagination.limit() as u64)
    }

    /// Returns whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.pagination.page() as u64) < self.total_pages()
    }

    /// Returns whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.pagination.page() > Pagination::FIRST_PAGE
    }
}
