//! HTTP error mapping and the JSON error envelope.

use axum::{
    Json,
    extract::{
        Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::task::services::{TaskErrorKind, TaskLifecycleError};

/// Error returned by HTTP handlers and extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Response status.
    pub status: StatusCode,
    /// Failure classification.
    pub kind: TaskErrorKind,
    /// Client-facing message.
    pub message: String,
}

impl ApiError {
    /// Creates an error.
    #[must_use]
    pub fn new(status: StatusCode, kind: TaskErrorKind, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    /// Creates a 400 validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, TaskErrorKind::ValidationFailed, message)
    }

    /// Creates a 404 error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, TaskErrorKind::NotFound, message)
    }

    /// Creates a 500 error with an opaque message.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            TaskErrorKind::Internal,
            "internal server error",
        )
    }

    /// Builds an error for a response that was produced without one, such
    /// as axum's built-in 405.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        let message = status.canonical_reason().unwrap_or("request failed");
        let kind = match status {
            StatusCode::NOT_FOUND => TaskErrorKind::NotFound,
            _ if status.is_server_error() => TaskErrorKind::Internal,
            _ => TaskErrorKind::ValidationFailed,
        };
        Self::new(status, kind, message)
    }

    fn render(&self, path: &str) -> Response {
        let envelope = ErrorEnvelope {
            success: false,
            error: self.kind.as_str(),
            message: &self.message,
            status_code: self.status.as_u16(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            path,
        };
        (self.status, Json(envelope)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope<'a> {
    success: bool,
    error: &'static str,
    message: &'a str,
    status_code: u16,
    timestamp: String,
    path: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.render("");
        response.extensions_mut().insert(self);
        response
    }
}

impl From<TaskLifecycleError> for ApiError {
    fn from(err: TaskLifecycleError) -> Self {
        match err.kind() {
            TaskErrorKind::Internal => {
                tracing::error!(error = %err, "task operation failed");
                Self::internal()
            }
            TaskErrorKind::NotFound => Self::not_found(err.to_string()),
            kind @ (TaskErrorKind::ValidationFailed | TaskErrorKind::InvalidTransition) => {
                Self::new(StatusCode::BAD_REQUEST, kind, err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

/// Rewrites every error response into the JSON envelope, including the
/// request path and query.
pub async fn render_error_envelope(request: Request, next: Next) -> Response {
    let path = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_owned(), |pq| pq.as_str().to_owned());

    let mut response = next.run(request).await;
    let status = response.status();
    let error = match response.extensions_mut().remove::<ApiError>() {
        Some(error) => error,
        None if status.is_client_error() || status.is_server_error() => {
            ApiError::from_status(status)
        }
        None => return response,
    };

    let mut rendered = error.render(&path);
    for (name, value) in response.headers() {
        if name != header::CONTENT_LENGTH && !rendered.headers().contains_key(name) {
            rendered.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rendered
}
