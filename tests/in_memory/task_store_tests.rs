//! In-memory integration tests for task writes and deletion.

use super::helpers::{TestService, service};
use chrono::{Duration, Utc};
use eyre::{bail, ensure};
use rstest::rstest;
use taskhub::task::{
    domain::{FieldUpdate, TaskFilter, TaskId, TaskListQuery, TaskPriority, TaskStatus},
    services::{CreateTaskRequest, TaskErrorKind, TaskLifecycleError, UpdateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_round_trip(service: TestService) -> eyre::Result<()> {
    let created = service
        .create(
            CreateTaskRequest::new("Migrate billing")
                .with_description("Move invoices to the new ledger")
                .with_priority(TaskPriority::Urgent)
                .with_due_date(Utc::now() + Duration::days(3)),
        )
        .await?;

    let started = service
        .update(
            created.id(),
            UpdateTaskRequest::new().with_status(TaskStatus::InProgress),
        )
        .await?;
    ensure!(started.status() == TaskStatus::InProgress);
    ensure!(started.completed_at().is_none());

    let finished = service
        .update(
            created.id(),
            UpdateTaskRequest::new().with_status(TaskStatus::Done),
        )
        .await?;
    ensure!(finished.completed_at().is_some());
    ensure!(finished.updated_at() >= started.updated_at());

    let reopened = service
        .update(
            created.id(),
            UpdateTaskRequest::new().with_status(TaskStatus::InProgress),
        )
        .await?;
    ensure!(reopened.completed_at() == finished.completed_at());

    service.soft_delete(created.id()).await?;
    let restored = service.restore(created.id()).await?;
    ensure!(restored.status() == TaskStatus::InProgress);
    ensure!(restored.created_at() == created.created_at());

    service.hard_delete(created.id()).await?;
    ensure!(matches!(
        service.get(created.id()).await,
        Err(TaskLifecycleError::NotFound(_))
    ));
    Ok(())
}

#[rstest]
#[case(TaskStatus::Todo, TaskStatus::Done)]
#[case(TaskStatus::Done, TaskStatus::Todo)]
#[tokio::test(flavor = "multi_thread")]
async fn disallowed_transitions_are_rejected_without_changes(
    service: TestService,
    #[case] initial: TaskStatus,
    #[case] target: TaskStatus,
) -> eyre::Result<()> {
    let created = service
        .create(CreateTaskRequest::new("Guarded").with_status(initial))
        .await?;

    let result = service
        .update(
            created.id(),
            UpdateTaskRequest::new()
                .with_status(target)
                .with_priority(TaskPriority::Low),
        )
        .await;

    let Err(err) = result else {
        bail!("expected {initial} -> {target} to be rejected");
    };
    ensure!(err.kind() == TaskErrorKind::InvalidTransition);
    ensure!(service.get(created.id()).await? == created);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_status_update_is_accepted(service: TestService) -> eyre::Result<()> {
    let created = service
        .create(CreateTaskRequest::new("Stay put").with_status(TaskStatus::Done))
        .await?;

    let updated = service
        .update(
            created.id(),
            UpdateTaskRequest::new()
                .with_status(TaskStatus::Done)
                .with_description("Still done"),
        )
        .await?;

    ensure!(updated.status() == TaskStatus::Done);
    ensure!(updated.description().as_str() == "Still done");
    ensure!(updated.completed_at().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_time_can_be_cleared_directly(service: TestService) -> eyre::Result<()> {
    let created = service
        .create(CreateTaskRequest::new("Done then corrected").with_status(TaskStatus::InProgress))
        .await?;
    service
        .update(created.id(), UpdateTaskRequest::new().with_status(TaskStatus::Done))
        .await?;

    let corrected = service
        .update(
            created.id(),
            UpdateTaskRequest::new().with_completed_at(FieldUpdate::Clear),
        )
        .await?;

    ensure!(corrected.status() == TaskStatus::Done);
    ensure!(corrected.completed_at().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_fields_are_rejected_on_update(service: TestService) -> eyre::Result<()> {
    let created = service.create(CreateTaskRequest::new("Valid title")).await?;

    let blank = service
        .update(created.id(), UpdateTaskRequest::new().with_title("  "))
        .await;
    let long = service
        .update(
            created.id(),
            UpdateTaskRequest::new().with_description("x".repeat(501)),
        )
        .await;

    ensure!(matches!(blank, Err(ref err) if err.kind() == TaskErrorKind::ValidationFailed));
    ensure!(matches!(long, Err(ref err) if err.kind() == TaskErrorKind::ValidationFailed));
    ensure!(service.get(created.id()).await? == created);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn soft_deleted_tasks_are_listed_only_on_request(service: TestService) -> eyre::Result<()> {
    let kept = service.create(CreateTaskRequest::new("Kept")).await?;
    let removed = service.create(CreateTaskRequest::new("Removed")).await?;
    service.soft_delete(removed.id()).await?;

    let visible = service.list(TaskListQuery::default()).await?;
    let everything = service
        .list(TaskListQuery::new(TaskFilter::new().including_deleted(true)))
        .await?;

    ensure!(visible.total == 1);
    ensure!(visible.tasks.iter().all(|task| task.id() == kept.id()));
    ensure!(everything.total == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn operations_on_unknown_ids_are_not_found(service: TestService) {
    let id = TaskId::new();

    assert!(matches!(service.get(id).await, Err(TaskLifecycleError::NotFound(_))));
    assert!(matches!(
        service.update(id, UpdateTaskRequest::new()).await,
        Err(TaskLifecycleError::NotFound(_))
    ));
    assert!(matches!(service.soft_delete(id).await, Err(TaskLifecycleError::NotFound(_))));
    assert!(matches!(service.restore(id).await, Err(TaskLifecycleError::NotFound(_))));
    assert!(matches!(service.hard_delete(id).await, Err(TaskLifecycleError::NotFound(_))));
}
