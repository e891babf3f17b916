//! When steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, parse_status, run_async};
use rstest_bdd_macros::when;
use taskhub::task::services::UpdateTaskRequest;

#[when(r#"the task status is changed to "{status}""#)]
fn change_status(world: &mut TaskLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let id = world.current_task()?.id();
    let request = UpdateTaskRequest::new().with_status(parse_status(&status)?);
    let result = run_async(world.service.update(id, request));
    world.record(result);
    Ok(())
}

#[when("the task is soft-deleted")]
fn soft_delete(world: &mut TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let id = world.current_task()?.id();
    run_async(world.service.soft_delete(id))?;
    Ok(())
}

#[when("the task is restored")]
fn restore(world: &mut TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let id = world.current_task()?.id();
    let result = run_async(world.service.restore(id));
    world.record(result);
    Ok(())
}

#[when("the task is permanently deleted")]
fn hard_delete(world: &mut TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let id = world.current_task()?.id();
    run_async(world.service.hard_delete(id))?;
    Ok(())
}
