//! Shared test helpers for in-memory task integration tests.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::fixture;
use taskhub::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{CreateTaskRequest, TaskLifecycleService},
};

/// Service type used by in-memory integration tests.
pub type TestService = TaskLifecycleService<InMemoryTaskRepository, DefaultClock>;

/// Provides a service over a fresh in-memory repository.
#[fixture]
pub fn service() -> TestService {
    TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(DefaultClock),
    )
}

/// Creates tasks one after another so that their creation times are
/// strictly increasing.
///
/// # Errors
///
/// Returns an error if any creation fails.
pub async fn create_in_order(
    service: &TestService,
    requests: Vec<CreateTaskRequest>,
) -> Result<Vec<Task>, eyre::Report> {
    let mut created = Vec::with_capacity(requests.len());
    for request in requests {
        created.push(service.create(request).await?);
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    Ok(created)
}

/// Returns the titles of `tasks` in order.
#[must_use]
pub fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title().as_str()).collect()
}
