//! Request extractors whose rejections render as [`ApiError`].

use axum::{
    extract::{FromRequest, FromRequestParts, Path},
    http::request::Parts,
};

use super::error::ApiError;
use crate::task::domain::TaskId;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// URL query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Task identifier taken from the `{id}` path segment.
///
/// Segments that are not UUIDs cannot name a task and are rejected as not
/// found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskIdPath(pub TaskId);

impl<S> FromRequestParts<S> for TaskIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::not_found("task not found"))?;
        raw.parse::<TaskId>()
            .map(Self)
            .map_err(|_| ApiError::not_found(format!("task {raw} not found")))
    }
}
