//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, parse_status, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskhub::task::services::CreateTaskRequest;

#[given(r#"a task titled "{title}" with status "{status}""#)]
fn task_with_status(
    world: &mut TaskLifecycleWorld,
    title: String,
    status: String,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(title).with_status(parse_status(&status)?);
    let created =
        run_async(world.service.create(request)).wrap_err("create task for lifecycle scenario")?;
    world.task = Some(created);
    Ok(())
}
