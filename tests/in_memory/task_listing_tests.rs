//! In-memory integration tests for task listing.

use super::helpers::{TestService, create_in_order, service, titles};
use chrono::{Duration, Utc};
use eyre::ensure;
use rstest::rstest;
use taskhub::task::{
    domain::{
        Pagination, SortDirection, TaskFilter, TaskListQuery, TaskPriority, TaskSort,
        TaskSortField, TaskStatus,
    },
    services::CreateTaskRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn default_listing_is_newest_first(service: TestService) -> eyre::Result<()> {
    create_in_order(
        &service,
        vec![
            CreateTaskRequest::new("first"),
            CreateTaskRequest::new("second"),
            CreateTaskRequest::new("third"),
        ],
    )
    .await?;

    let page = service.list(TaskListQuery::default()).await?;

    ensure!(titles(&page.tasks) == ["third", "second", "first"]);
    ensure!(page.total == 3);
    ensure!(page.pagination == Pagination::default());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pages_partition_the_matches(service: TestService) -> eyre::Result<()> {
    let requests = (1..=5)
        .map(|index| CreateTaskRequest::new(format!("task {index}")))
        .collect();
    create_in_order(&service, requests).await?;
    let oldest_first = TaskSort::new(TaskSortField::CreatedAt, SortDirection::Asc);

    let mut seen = Vec::new();
    for page_number in 1..=3 {
        let page = service
            .list(
                TaskListQuery::default()
                    .with_sort(oldest_first)
                    .with_pagination(Pagination::new(page_number, 2)),
            )
            .await?;
        ensure!(page.total == 5);
        ensure!(page.total_pages() == 3);
        seen.extend(titles(&page.tasks).into_iter().map(str::to_owned));
    }

    ensure!(seen == ["task 1", "task 2", "task 3", "task 4", "task 5"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn page_past_the_end_is_empty(service: TestService) -> eyre::Result<()> {
    service.create(CreateTaskRequest::new("only")).await?;

    let page = service
        .list(TaskListQuery::default().with_pagination(Pagination::new(4, 10)))
        .await?;

    ensure!(page.tasks.is_empty());
    ensure!(page.total == 1);
    ensure!(!page.has_next());
    ensure!(page.has_previous());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filters_combine(service: TestService) -> eyre::Result<()> {
    service
        .create(
            CreateTaskRequest::new("Fix login bug")
                .with_priority(TaskPriority::High)
                .with_status(TaskStatus::InProgress),
        )
        .await?;
    service
        .create(CreateTaskRequest::new("Fix typo").with_priority(TaskPriority::Low))
        .await?;
    service
        .create(
            CreateTaskRequest::new("Plan offsite")
                .with_description("Includes a bug bash")
                .with_priority(TaskPriority::High),
        )
        .await?;

    let by_search = service
        .list(TaskListQuery::new(TaskFilter::new().with_search("BUG")))
        .await?;
    let by_search_and_status = service
        .list(TaskListQuery::new(
            TaskFilter::new()
                .with_search("bug")
                .with_status(TaskStatus::InProgress),
        ))
        .await?;
    let by_priority = service
        .list(TaskListQuery::new(
            TaskFilter::new().with_priority(TaskPriority::Low),
        ))
        .await?;

    ensure!(by_search.total == 2);
    ensure!(titles(&by_search_and_status.tasks) == ["Fix login bug"]);
    ensure!(titles(&by_priority.tasks) == ["Fix typo"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_treats_pattern_characters_literally(service: TestService) -> eyre::Result<()> {
    service.create(CreateTaskRequest::new("Raise limit to 100%")).await?;
    service.create(CreateTaskRequest::new("Raise limit to 1000")).await?;

    let page = service
        .list(TaskListQuery::new(TaskFilter::new().with_search("0%")))
        .await?;
    let dotted = service
        .list(TaskListQuery::new(TaskFilter::new().with_search("1.0")))
        .await?;

    ensure!(titles(&page.tasks) == ["Raise limit to 100%"]);
    ensure!(dotted.total == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn due_date_range_and_ordering(service: TestService) -> eyre::Result<()> {
    let now = Utc::now();
    service
        .create(CreateTaskRequest::new("soon").with_due_date(now + Duration::days(1)))
        .await?;
    service
        .create(CreateTaskRequest::new("later").with_due_date(now + Duration::days(10)))
        .await?;
    service.create(CreateTaskRequest::new("undated")).await?;

    let in_range = service
        .list(TaskListQuery::new(
            TaskFilter::new()
                .with_due_from(now)
                .with_due_to(now + Duration::days(5)),
        ))
        .await?;
    let latest_due_first = service
        .list(
            TaskListQuery::default()
                .with_sort(TaskSort::new(TaskSortField::DueDate, SortDirection::Desc)),
        )
        .await?;

    ensure!(titles(&in_range.tasks) == ["soon"]);
    ensure!(titles(&latest_due_first.tasks) == ["later", "soon", "undated"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn title_ordering(service: TestService) -> eyre::Result<()> {
    for title in ["banana", "apple", "cherry"] {
        service.create(CreateTaskRequest::new(title)).await?;
    }

    let page = service
        .list(
            TaskListQuery::default()
                .with_sort(TaskSort::new(TaskSortField::Title, SortDirection::Asc)),
        )
        .await?;

    ensure!(titles(&page.tasks) == ["apple", "banana", "cherry"]);
    Ok(())
}
