//! Todo store backed by the PostgreSQL `todo` table.

use crate::domain::filters::{calculate_metadata, Filters, Metadata};
use crate::domain::todo::Todo;
use crate::storage::todo::{StoreError, TodoStore};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::future::Future;
use std::time::Duration;

/// Upper bound for a single store call.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct PostgresTodoStore {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: QUERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs `query` under the store timeout. When the deadline passes the
    /// query future is dropped, which cancels the in-flight call.
    async fn bounded<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Backend(anyhow::anyhow!(
                "query timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

fn todo_from_row(row: &PgRow) -> Result<Todo, sqlx::Error> {
    Ok(Todo {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        completed: row.try_get("completed")?,
    })
}

#[async_trait]
impl TodoStore for PostgresTodoStore {
    async fn insert(&self, todo: &mut Todo) -> Result<(), StoreError> {
        let row = self
            .bounded(
                sqlx::query(
                    "INSERT INTO todo (title, description, completed)
                     VALUES ($1, $2, $3)
                     RETURNING id, created_at",
                )
                .bind(&todo.title)
                .bind(&todo.description)
                .bind(todo.completed)
                .fetch_one(&self.pool),
            )
            .await?;

        todo.id = row.try_get("id")?;
        todo.created_at = row.try_get("created_at")?;
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Todo, StoreError> {
        if id < 1 {
            return Err(StoreError::RecordNotFound);
        }

        let row = self
            .bounded(
                sqlx::query(
                    "SELECT id, created_at, title, description, completed
                     FROM todo
                     WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&self.pool),
            )
            .await?;

        match row {
            Some(row) => Ok(todo_from_row(&row)?),
            None => Err(StoreError::RecordNotFound),
        }
    }

    async fn update(&self, todo: &mut Todo) -> Result<(), StoreError> {
        let row = self
            .bounded(
                sqlx::query(
                    "UPDATE todo
                     SET title = $1, description = $2, completed = $3
                     WHERE id = $4
                     RETURNING id",
                )
                .bind(&todo.title)
                .bind(&todo.description)
                .bind(todo.completed)
                .bind(todo.id)
                .fetch_optional(&self.pool),
            )
            .await?;

        // The row vanished between the caller's read and this write.
        let row = row.ok_or(StoreError::EditConflict)?;
        todo.id = row.try_get("id")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        if id < 1 {
            return Err(StoreError::RecordNotFound);
        }

        let result = self
            .bounded(
                sqlx::query("DELETE FROM todo WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RecordNotFound);
        }
        Ok(())
    }

    async fn get_all(
        &self,
        title: &str,
        filters: &Filters,
    ) -> Result<(Vec<Todo>, Metadata), StoreError> {
        // Column and direction come from the safelist, never from raw input.
        let sql = format!(
            "SELECT COUNT(*) OVER() AS total_records, id, created_at, title, description, completed
             FROM todo
             WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
             ORDER BY {} {}, id ASC
             LIMIT $2 OFFSET $3",
            filters.sort_column(),
            filters.sort_direction()
        );

        let rows = self
            .bounded(
                sqlx::query(&sql)
                    .bind(title)
                    .bind(filters.limit())
                    .bind(filters.offset())
                    .fetch_all(&self.pool),
            )
            .await?;

        let mut total_records: i64 = 0;
        let mut todos = Vec::with_capacity(rows.len());
        for row in &rows {
            total_records = row.try_get("total_records")?;
            todos.push(todo_from_row(row)?);
        }

        let metadata = calculate_metadata(total_records, filters.page, filters.page_size);
        Ok((todos, metadata))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(sqlx::query("SELECT 1").execute(&self.pool))
            .await?;
        Ok(())
    }
}
