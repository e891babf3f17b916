//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        FieldUpdate, PersistedTaskData, SortDirection, Task, TaskChanges, TaskDescription,
        TaskFilter, TaskId, TaskListQuery, TaskPage, TaskPriority, TaskSort, TaskSortField,
        TaskStatus, TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Idempotent DDL for the `tasks` table and its indexes.
pub const TASKS_SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_tasks/up.sql");

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    /// Creates the `tasks` table and indexes when they are missing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when a connection cannot
    /// be obtained or the DDL fails.
    pub async fn ensure_schema(&self) -> TaskRepositoryResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(TASKS_SCHEMA_SQL)
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, id: TaskId, changes: &TaskChanges) -> TaskRepositoryResult<Task> {
        let expects_deleted = changes.expects_deleted();
        let changeset = to_changeset(changes);

        self.run_blocking(move |connection| {
            let row = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .filter(tasks::is_deleted.eq(expects_deleted)),
            )
            .set(&changeset)
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(connection)
            .optional()
            .map_err(TaskRepositoryError::persistence)?;
            row.ok_or(TaskRepositoryError::NotFound(id))
                .and_then(row_to_task)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_page(&self, query: &TaskListQuery) -> TaskRepositoryResult<TaskPage> {
        let page_query = query.clone();

        self.run_blocking(move |connection| {
            let (rows, total) = connection
                .build_transaction()
                .read_only()
                .repeatable_read()
                .run(|transaction| load_page(transaction, &page_query))
                .map_err(TaskRepositoryError::persistence)?;

            let page_tasks = rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskRepositoryResult<Vec<_>>>()?;
            let total_matches = u64::try_from(total).map_err(TaskRepositoryError::persistence)?;

            Ok(TaskPage {
                tasks: page_tasks,
                total: total_matches,
                pagination: page_query.pagination,
            })
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(tasks::table.find(id.into_inner()))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn load_page(
    connection: &mut PgConnection,
    query: &TaskListQuery,
) -> Result<(Vec<TaskRow>, i64), DieselError> {
    let total = filtered(&query.filter)
        .count()
        .get_result::<i64>(connection)?;

    let offset = i64::try_from(query.pagination.offset()).unwrap_or(i64::MAX);
    let rows = ordered(filtered(&query.filter), query.sort)
        .select(TaskRow::as_select())
        .offset(offset)
        .limit(i64::from(query.pagination.limit()))
        .load::<TaskRow>(connection)?;

    Ok((rows, total))
}

fn filtered(filter: &TaskFilter) -> tasks::BoxedQuery<'static, Pg> {
    let mut query = tasks::table.into_boxed();

    if !filter.includes_deleted() {
        query = query.filter(tasks::is_deleted.eq(false));
    }
    if let Some(status) = filter.status() {
        query = query.filter(tasks::status.eq(status.as_str()));
    }
    if let Some(priority) = filter.priority() {
        query = query.filter(tasks::priority.eq(priority.as_str()));
    }
    if let Some(term) = filter.search() {
        let pattern = format!("%{}%", escape_like(term));
        query = query.filter(
            tasks::title
                .ilike(pattern.clone())
                .or(tasks::description.ilike(pattern)),
        );
    }
    if let Some(from) = filter.due_from() {
        query = query.filter(tasks::due_date.ge(from));
    }
    if let Some(to) = filter.due_to() {
        query = query.filter(tasks::due_date.le(to));
    }

    query
}

fn ordered(
    query: tasks::BoxedQuery<'static, Pg>,
    sort: TaskSort,
) -> tasks::BoxedQuery<'static, Pg> {
    let primary = match (sort.field, sort.direction) {
        (TaskSortField::CreatedAt, SortDirection::Asc) => query.order(tasks::created_at.asc()),
        (TaskSortField::CreatedAt, SortDirection::Desc) => query.order(tasks::created_at.desc()),
        (TaskSortField::UpdatedAt, SortDirection::Asc) => query.order(tasks::updated_at.asc()),
        (TaskSortField::UpdatedAt, SortDirection::Desc) => query.order(tasks::updated_at.desc()),
        (TaskSortField::DueDate, SortDirection::Asc) => {
            query.order(tasks::due_date.asc().nulls_last())
        }
        (TaskSortField::DueDate, SortDirection::Desc) => {
            query.order(tasks::due_date.desc().nulls_last())
        }
        (TaskSortField::Title, SortDirection::Asc) => query.order(tasks::title.asc()),
        (TaskSortField::Title, SortDirection::Desc) => query.order(tasks::title.desc()),
    };
    primary.then_order_by(tasks::id.asc())
}

/// Escapes `LIKE` metacharacters so that `term` matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        due_date: task.due_date(),
        completed_at: task.completed_at(),
        is_deleted: task.is_deleted(),
        deleted_at: task.deleted_at(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn to_changeset(changes: &TaskChanges) -> TaskChangeset {
    let deletion = changes.deletion();
    TaskChangeset {
        title: changes.title().map(|title| title.as_str().to_owned()),
        description: changes
            .description()
            .map(|description| description.as_str().to_owned()),
        status: changes.status().map(|status| status.as_str().to_owned()),
        priority: changes.priority().map(|priority| priority.as_str().to_owned()),
        due_date: changes.due_date().into_nullable(),
        completed_at: changes.completed_at().into_nullable(),
        is_deleted: match deletion {
            FieldUpdate::Keep => None,
            FieldUpdate::Set(_) => Some(true),
            FieldUpdate::Clear => Some(false),
        },
        deleted_at: deletion.into_nullable(),
        updated_at: changes.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title: persisted_title,
        description: persisted_description,
        status: persisted_status,
        priority: persisted_priority,
        due_date,
        completed_at,
        is_deleted,
        deleted_at,
        created_at,
        updated_at,
    } = row;

    let title = TaskTitle::new(persisted_title).map_err(TaskRepositoryError::persistence)?;
    let description =
        TaskDescription::new(persisted_description).map_err(TaskRepositoryError::persistence)?;
    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let priority = TaskPriority::try_from(persisted_priority.as_str())
        .map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        title,
        description,
        status,
        priority,
        due_date,
        completed_at,
        is_deleted,
        deleted_at,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}
