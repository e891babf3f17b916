//! Route handlers for the task API.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use super::{
    dto::{CreateTaskBody, ListTasksParams, TaskListResponse, TaskResponse, UpdateTaskBody},
    error::ApiError,
    extract::{ApiJson, ApiQuery, TaskIdPath},
    state::AppState,
};

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /tasks`
///
/// # Errors
///
/// Returns a 400 [`ApiError`] when the body is malformed or a field is
/// invalid.
pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateTaskBody>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let task = state.tasks.create(body.into_request()?).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))))
}

/// `GET /tasks`
///
/// # Errors
///
/// Returns a 400 [`ApiError`] when a query parameter is invalid.
pub async fn list_tasks(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListTasksParams>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let page = state.tasks.list(params.into_query()?).await?;
    Ok(Json(TaskListResponse::from(page)))
}

/// `GET /tasks/{id}`
///
/// # Errors
///
/// Returns a 404 [`ApiError`] when the task is absent or soft-deleted.
pub async fn get_task(
    State(state): State<AppState>,
    TaskIdPath(id): TaskIdPath,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.tasks.get(id).await?;
    Ok(Json(TaskResponse::from(&task)))
}

/// `PATCH /tasks/{id}`
///
/// # Errors
///
/// Returns a 404 [`ApiError`] when the task is absent or soft-deleted, and
/// a 400 one when a field is invalid or the status change is not allowed.
pub async fn update_task(
    State(state): State<AppState>,
    TaskIdPath(id): TaskIdPath,
    ApiJson(body): ApiJson<UpdateTaskBody>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.tasks.update(id, body.into_request()?).await?;
    Ok(Json(TaskResponse::from(&task)))
}

/// `DELETE /tasks/{id}`
///
/// # Errors
///
/// Returns a 404 [`ApiError`] when the task is absent or already
/// soft-deleted.
pub async fn soft_delete_task(
    State(state): State<AppState>,
    TaskIdPath(id): TaskIdPath,
) -> Result<StatusCode, ApiError> {
    state.tasks.soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /tasks/{id}/restore`
///
/// # Errors
///
/// Returns a 404 [`ApiError`] when the task is absent or not soft-deleted.
pub async fn restore_task(
    State(state): State<AppState>,
    TaskIdPath(id): TaskIdPath,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.tasks.restore(id).await?;
    Ok(Json(TaskResponse::from(&task)))
}

/// `DELETE /tasks/{id}/hard`
///
/// # Errors
///
/// Returns a 404 [`ApiError`] when the task is absent.
pub async fn hard_delete_task(
    State(state): State<AppState>,
    TaskIdPath(id): TaskIdPath,
) -> Result<StatusCode, ApiError> {
    state.tasks.hard_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for unknown routes.
pub async fn route_not_found() -> ApiError {
    ApiError::not_found("route not found")
}
