//! Request and response bodies of the task API.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::ApiError;
use crate::task::{
    domain::{
        FieldUpdate, Pagination, SortDirection, Task, TaskFilter, TaskListQuery, TaskPage,
        TaskPriority, TaskSort, TaskSortField, TaskStatus,
    },
    services::{CreateTaskRequest, UpdateTaskRequest},
};

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTaskBody {
    /// Task title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Initial status.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Priority.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    /// Due date as RFC 3339 or `YYYY-MM-DD`.
    #[serde(default)]
    pub due_date: Option<String>,
}

impl CreateTaskBody {
    /// Converts the body into a service request.
    ///
    /// # Errors
    ///
    /// Returns a validation [`ApiError`] when `dueDate` is not a date.
    pub fn into_request(self) -> Result<CreateTaskRequest, ApiError> {
        let mut request = CreateTaskRequest::new(self.title);
        if let Some(description) = self.description {
            request = request.with_description(description);
        }
        if let Some(status) = self.status {
            request = request.with_status(status);
        }
        if let Some(priority) = self.priority {
            request = request.with_priority(priority);
        }
        if let Some(raw) = self.due_date {
            request = request.with_due_date(parse_timestamp("dueDate", &raw)?);
        }
        Ok(request)
    }
}

/// Body of `PATCH /tasks/{id}`.
///
/// `dueDate` and `completedAt` may be `null` to clear the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTaskBody {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// Requested status.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// New priority.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    /// New due date, or `null`.
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<String>>,
    /// New completion time, or `null`.
    #[serde(default, deserialize_with = "nullable")]
    pub completed_at: Option<Option<String>>,
}

impl UpdateTaskBody {
    /// Converts the body into a service request.
    ///
    /// # Errors
    ///
    /// Returns a validation [`ApiError`] when a timestamp is not a date.
    pub fn into_request(self) -> Result<UpdateTaskRequest, ApiError> {
        let mut request = UpdateTaskRequest::new()
            .with_due_date(parse_nullable("dueDate", self.due_date)?)
            .with_completed_at(parse_nullable("completedAt", self.completed_at)?);
        if let Some(title) = self.title {
            request = request.with_title(title);
        }
        if let Some(description) = self.description {
            request = request.with_description(description);
        }
        if let Some(status) = self.status {
            request = request.with_status(status);
        }
        if let Some(priority) = self.priority {
            request = request.with_priority(priority);
        }
        Ok(request)
    }
}

/// Query string of `GET /tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksParams {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size.
    pub limit: Option<i64>,
    /// Status filter.
    pub status: Option<TaskStatus>,
    /// Priority filter.
    pub priority: Option<TaskPriority>,
    /// Substring searched in title and description.
    pub search: Option<String>,
    /// Earliest due date, inclusive.
    pub due_from: Option<String>,
    /// Latest due date, inclusive.
    pub due_to: Option<String>,
    /// Sort key.
    pub sort_by: Option<TaskSortField>,
    /// Sort direction.
    pub order: Option<SortDirection>,
    /// Whether soft-deleted tasks are listed.
    pub include_deleted: Option<bool>,
}

impl ListTasksParams {
    /// Converts the parameters into a listing query.
    ///
    /// # Errors
    ///
    /// Returns a validation [`ApiError`] when a due-date bound is not a
    /// date.
    pub fn into_query(self) -> Result<TaskListQuery, ApiError> {
        let mut filter = TaskFilter::new().including_deleted(self.include_deleted.unwrap_or(false));
        if let Some(status) = self.status {
            filter = filter.with_status(status);
        }
        if let Some(priority) = self.priority {
            filter = filter.with_priority(priority);
        }
        if let Some(term) = self.search {
            filter = filter.with_search(term);
        }
        if let Some(raw) = self.due_from {
            filter = filter.with_due_from(parse_timestamp("dueFrom", &raw)?);
        }
        if let Some(raw) = self.due_to {
            filter = filter.with_due_to(parse_timestamp("dueTo", &raw)?);
        }

        let sort = TaskSort::new(
            self.sort_by.unwrap_or_default(),
            self.order.unwrap_or_default(),
        );
        Ok(TaskListQuery::new(filter)
            .with_sort(sort)
            .with_pagination(Pagination::from_raw(self.page, self.limit)))
    }
}

/// Task as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Task identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Status label.
    pub status: TaskStatus,
    /// Priority label.
    pub priority: TaskPriority,
    /// Due date.
    pub due_date: Option<String>,
    /// Completion time.
    pub completed_at: Option<String>,
    /// Soft-delete marker.
    pub is_deleted: bool,
    /// Soft-delete time.
    pub deleted_at: Option<String>,
    /// Creation time.
    pub created_at: String,
    /// Last update time.
    pub updated_at: String,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            title: task.title().as_str().to_owned(),
            description: task.description().as_str().to_owned(),
            status: task.status(),
            priority: task.priority(),
            due_date: task.due_date().map(format_timestamp),
            completed_at: task.completed_at().map(format_timestamp),
            is_deleted: task.is_deleted(),
            deleted_at: task.deleted_at().map(format_timestamp),
            created_at: format_timestamp(task.created_at()),
            updated_at: format_timestamp(task.updated_at()),
        }
    }
}

/// Page of tasks as returned by `GET /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    /// Tasks on this page.
    pub data: Vec<TaskResponse>,
    /// Number of matching tasks across all pages.
    pub total: u64,
    /// Page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Number of pages.
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
}

impl From<TaskPage> for TaskListResponse {
    fn from(page: TaskPage) -> Self {
        Self {
            data: page.tasks.iter().map(TaskResponse::from).collect(),
            total: page.total,
            page: page.pagination.page(),
            limit: page.pagination.limit(),
            total_pages: page.total_pages(),
            has_next: page.has_next(),
            has_prev: page.has_previous(),
        }
    }
}

/// Parses an RFC 3339 timestamp, or a `YYYY-MM-DD` date taken as midnight
/// UTC.
///
/// # Errors
///
/// Returns a validation [`ApiError`] naming `field` when `raw` is neither.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let trimmed = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| ApiError::validation(format!("{field} must be an ISO 8601 date")))
}

fn parse_nullable(
    field: &str,
    value: Option<Option<String>>,
) -> Result<FieldUpdate<DateTime<Utc>>, ApiError> {
    let parsed = value
        .map(|inner| inner.map(|raw| parse_timestamp(field, &raw)).transpose())
        .transpose()?;
    Ok(FieldUpdate::from_nullable(parsed))
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Keeps an explicit `null` distinct from an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2026-05-01T10:30:00Z", "2026-05-01T10:30:00.000Z")]
    #[case("2026-05-01T12:30:00+02:00", "2026-05-01T10:30:00.000Z")]
    #[case("2026-05-01", "2026-05-01T00:00:00.000Z")]
    fn parse_timestamp_accepts_iso_forms(#[case] raw: &str, #[case] expected: &str) {
        let parsed = parse_timestamp("dueDate", raw).expect("valid timestamp");

        assert_eq!(format_timestamp(parsed), expected);
    }

    #[rstest]
    #[case("tomorrow")]
    #[case("2026-13-01")]
    #[case("")]
    fn parse_timestamp_rejects_other_text(#[case] raw: &str) {
        let error = parse_timestamp("dueDate", raw).expect_err("invalid timestamp");

        assert_eq!(error.message, "dueDate must be an ISO 8601 date");
    }

    #[rstest]
    fn update_body_distinguishes_null_from_absent() {
        let cleared: UpdateTaskBody =
            serde_json::from_str(r#"{"dueDate": null}"#).expect("valid body");
        let absent: UpdateTaskBody = serde_json::from_str("{}").expect("valid body");

        assert_eq!(cleared.due_date, Some(None));
        assert_eq!(absent.due_date, None);
    }

    #[rstest]
    fn create_body_rejects_unknown_fields() {
        let result = serde_json::from_str::<CreateTaskBody>(r#"{"title": "a", "owner": "b"}"#);

        assert!(result.is_err());
    }

    #[rstest]
    fn list_params_default_to_newest_first_page() {
        let query = ListTasksParams::default().into_query().expect("valid query");

        assert_eq!(query.sort, TaskSort::default());
        assert_eq!(query.pagination, Pagination::default());
        assert!(!query.filter.includes_deleted());
    }
}
