//! Then steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, parse_status, run_async};
use rstest_bdd_macros::then;
use taskhub::task::{
    domain::{TaskFilter, TaskListQuery},
    services::{TaskErrorKind, TaskLifecycleError},
};

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = parse_status(&status)?;
    let task = world.current_task()?;
    eyre::ensure!(
        task.status() == expected,
        "expected status {expected}, found {}",
        task.status()
    );
    Ok(())
}

#[then(r#"the stored task status is "{status}""#)]
fn stored_task_status_is(world: &TaskLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = parse_status(&status)?;
    let id = world.current_task()?.id();
    let stored = run_async(world.service.get(id))?;
    eyre::ensure!(
        stored.status() == expected,
        "expected stored status {expected}, found {}",
        stored.status()
    );
    Ok(())
}

#[then("the task has a completion time")]
fn has_completion_time(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        world.current_task()?.completed_at().is_some(),
        "expected a completion time"
    );
    Ok(())
}

#[then("the task has no completion time")]
fn has_no_completion_time(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        world.current_task()?.completed_at().is_none(),
        "expected no completion time"
    );
    Ok(())
}

#[then("the task is not deleted")]
fn task_is_not_deleted(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    eyre::ensure!(!task.is_deleted(), "expected task to be live");
    eyre::ensure!(task.deleted_at().is_none(), "expected no deletion time");
    Ok(())
}

#[then("the operation fails with an invalid transition error")]
fn fails_with_invalid_transition(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let kind = world.last_error.as_ref().map(TaskLifecycleError::kind);
    eyre::ensure!(
        kind == Some(TaskErrorKind::InvalidTransition),
        "expected InvalidTransition, got {:?}",
        world.last_error
    );
    Ok(())
}

#[then("the operation fails with a not found error")]
fn fails_with_not_found(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        matches!(world.last_error, Some(TaskLifecycleError::NotFound(_))),
        "expected NotFound, got {:?}",
        world.last_error
    );
    Ok(())
}

#[then("fetching the task fails with a not found error")]
fn fetch_fails_with_not_found(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let id = world.current_task()?.id();
    let result = run_async(world.service.get(id));
    eyre::ensure!(
        matches!(result, Err(TaskLifecycleError::NotFound(_))),
        "expected NotFound, got {result:?}"
    );
    Ok(())
}

#[then("listing including deleted tasks returns {count:u64} tasks")]
fn listing_including_deleted_returns(
    world: &TaskLifecycleWorld,
    count: u64,
) -> Result<(), eyre::Report> {
    let query = TaskListQuery::new(TaskFilter::new().including_deleted(true));
    let page = run_async(world.service.list(query))?;
    eyre::ensure!(page.total == count, "expected {count} tasks, found {}", page.total);
    Ok(())
}
