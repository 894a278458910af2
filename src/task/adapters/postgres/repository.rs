//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskLogRow, NewTaskRow, TaskChangeset, TaskLogRow, TaskRow},
    schema::{task_logs, tasks},
};
use crate::task::{
    domain::{
        PersistedTaskData, Task, TaskFilter, TaskId, TaskListing, TaskLog, TaskLogId, TaskPatch,
        TaskPriority, TaskStatus, TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Idempotent DDL creating the task tables.
pub const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_tasks/up.sql");

/// `PostgreSQL`-backed task repository.
///
/// All database operations are offloaded to the blocking thread pool via
/// [`tokio::task::spawn_blocking`].
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

    /// Creates the task tables when they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the DDL fails.
    pub async fn ensure_schema(&self) -> TaskRepositoryResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(SCHEMA_SQL)
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

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);
        let new_logs: Vec<NewTaskLogRow> = task.logs().iter().map(to_new_log_row).collect();

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                diesel::insert_into(task_logs::table)
                    .values(&new_logs)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            let Some(task_row) = row else {
                return Ok(None);
            };
            let logs = load_logs(connection, &task_row)?;
            row_to_task(task_row, logs).map(Some)
        })
        .await
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        offset: u64,
        limit: u64,
    ) -> TaskRepositoryResult<TaskListing> {
        let lookup_filter = filter.clone();
        let sql_offset = i64::try_from(offset).map_err(TaskRepositoryError::persistence)?;
        let sql_limit = i64::try_from(limit).map_err(TaskRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            let total: i64 = filtered_tasks(&lookup_filter)
                .count()
                .get_result(connection)?;
            let rows = filtered_tasks(&lookup_filter)
                .order((tasks::created_at.desc(), tasks::id.desc()))
                .offset(sql_offset)
                .limit(sql_limit)
                .load::<TaskRow>(connection)?;

            let log_rows = TaskLogRow::belonging_to(&rows)
                .select(TaskLogRow::as_select())
                .order((task_logs::created_at.asc(), task_logs::id.asc()))
                .load::<TaskLogRow>(connection)?;
            let grouped_logs = log_rows.grouped_by(&rows);

            let items = rows
                .into_iter()
                .zip(grouped_logs)
                .map(|(row, logs)| row_to_task(row, logs))
                .collect::<TaskRepositoryResult<Vec<_>>>()?;
            let total_count = u64::try_from(total).map_err(TaskRepositoryError::persistence)?;

            Ok(TaskListing {
                items,
                total: total_count,
            })
        })
        .await
    }

    async fn update(
        &self,
        id: TaskId,
        patch: TaskPatch,
        timestamp: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let row = tasks::table
                    .find(id.into_inner())
                    .for_update()
                    .first::<TaskRow>(tx)
                    .optional()?
                    .ok_or(TaskRepositoryError::NotFound(id))?;
                let logs = load_logs(tx, &row)?;
                let mut task = row_to_task(row, logs)?;

                let appended = task.apply(patch, timestamp);
                diesel::update(tasks::table.find(id.into_inner()))
                    .set(&to_changeset(&task))
                    .execute(tx)?;
                if let Some(log) = appended {
                    diesel::insert_into(task_logs::table)
                        .values(&to_new_log_row(&log))
                        .execute(tx)?;
                }
                Ok(task)
            })
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::delete(task_logs::table.filter(task_logs::task_id.eq(id.into_inner())))
                    .execute(tx)?;
                let deleted = diesel::delete(tasks::table.find(id.into_inner())).execute(tx)?;
                Ok(deleted > 0)
            })
        })
        .await
    }
}

fn filtered_tasks(filter: &TaskFilter) -> tasks::BoxedQuery<'static, Pg> {
    let mut query = tasks::table.into_boxed();
    if let Some(needle) = filter.title_contains() {
        query = query.filter(tasks::title.ilike(like_pattern(needle)));
    }
    if let Some(status) = filter.status() {
        query = query.filter(tasks::status.eq(status.as_str()));
    }
    query
}

/// Wraps `needle` for a substring `ILIKE`, escaping pattern metacharacters.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn load_logs(
    connection: &mut PgConnection,
    row: &TaskRow,
) -> TaskRepositoryResult<Vec<TaskLogRow>> {
    TaskLogRow::belonging_to(row)
        .select(TaskLogRow::as_select())
        .order((task_logs::created_at.asc(), task_logs::id.asc()))
        .load::<TaskLogRow>(connection)
        .map_err(TaskRepositoryError::persistence)
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        priority: i16::from(task.priority().value()),
        status: task.status().as_str().to_owned(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn to_changeset(task: &Task) -> TaskChangeset {
    TaskChangeset {
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        priority: i16::from(task.priority().value()),
        status: task.status().as_str().to_owned(),
        updated_at: task.updated_at(),
    }
}

fn to_new_log_row(log: &TaskLog) -> NewTaskLogRow {
    NewTaskLogRow {
        id: log.id().into_inner(),
        task_id: log.task_id().into_inner(),
        status: log.status().as_str().to_owned(),
        created_at: log.created_at(),
    }
}

fn row_to_task(row: TaskRow, log_rows: Vec<TaskLogRow>) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title: persisted_title,
        description,
        priority: persisted_priority,
        status: persisted_status,
        created_at,
        updated_at,
    } = row;

    let title = TaskTitle::new(persisted_title).map_err(TaskRepositoryError::persistence)?;
    let priority = TaskPriority::new(i64::from(persisted_priority))
        .map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let logs = log_rows
        .into_iter()
        .map(row_to_log)
        .collect::<TaskRepositoryResult<Vec<_>>>()?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        title,
        description,
        priority,
        status,
        created_at,
        updated_at,
        logs,
    };
    Ok(Task::from_persisted(data))
}

fn row_to_log(row: TaskLogRow) -> TaskRepositoryResult<TaskLog> {
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskLog::from_persisted(
        TaskLogId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        status,
        row.created_at,
    ))
}
