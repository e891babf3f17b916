//! HTTP surface of the task API.
//!
//! [`router`] wires the handlers, the error envelope and request tracing.
//! CORS is applied by the binary through [`cors_layer`].

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::{AppState, TaskService};

use axum::{
    Router,
    http::{HeaderValue, Method, header, header::InvalidHeaderValue},
    middleware,
    routing::{delete, get, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Builds the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .patch(handlers::update_task)
                .delete(handlers::soft_delete_task),
        )
        .route("/tasks/{id}/restore", put(handlers::restore_task))
        .route("/tasks/{id}/hard", delete(handlers::hard_delete_task))
        .fallback(handlers::route_not_found)
        .layer(middleware::from_fn(error::render_error_envelope))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the CORS policy for `origin`, or for any origin when `None`.
///
/// # Errors
///
/// Returns [`InvalidHeaderValue`] when `origin` is not a valid header value.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, InvalidHeaderValue> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    match origin {
        Some(value) => Ok(layer.allow_origin(HeaderValue::from_str(value)?)),
        None => Ok(layer.allow_origin(Any)),
    }
}
