//! Database bootstrap.
//!
//! Connects the shared connection pool and makes sure the `todo` table and its
//! title search index exist before the API starts serving.

use crate::infra::config;
use crate::storage::PostgresTodoStore;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub struct DatabaseService {
    pool: PgPool,
}

impl DatabaseService {
    /// Connects using `DATABASE_URL` and the pool settings from the environment.
    pub async fn new() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let database_url = config::database_url()?;
        Self::connect(&database_url).await
    }

    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config::db_max_connections()?)
            .idle_timeout(config::db_max_idle_time()?)
            .connect(database_url)
            .await?;

        let service = Self { pool };
        service.ensure_schema().await?;
        Ok(service)
    }

    /// Store handle sharing this service's pool.
    pub fn todo_store(&self) -> PostgresTodoStore {
        PostgresTodoStore::new(self.pool.clone())
    }

    /// Creates the `todo` table and the full-text index on `title` if missing.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todo (
                id BIGSERIAL PRIMARY KEY,
                created_at TIMESTAMPTZ(0) NOT NULL DEFAULT date_trunc('second', NOW()),
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT FALSE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS todo_title_idx
             ON todo USING GIN (to_tsvector('simple', title))",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes every todo and resets the id sequence. Used by tests.
    pub async fn clear_todos(&self) -> anyhow::Result<()> {
        sqlx::query("TRUNCATE TABLE todo RESTART IDENTITY")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
