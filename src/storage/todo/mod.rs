//! Todo persistence: the store contract and its implementations.

use crate::domain::filters::{Filters, Metadata};
use crate::domain::todo::Todo;
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryTodoStore;
pub use postgres::PostgresTodoStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    RecordNotFound,
    #[error("edit conflict")]
    EditConflict,
    /// Any other backend failure, timeouts included.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.into())
    }
}

/// Contract every todo backend implements.
///
/// Handlers only see `Arc<dyn TodoStore>`, so tests can swap the PostgreSQL
/// store for [`InMemoryTodoStore`] or a purpose-built fake.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persists `todo` and writes the assigned `id` and `created_at` back into it.
    async fn insert(&self, todo: &mut Todo) -> Result<(), StoreError>;

    /// Fails with [`StoreError::RecordNotFound`] for `id < 1` or a missing row.
    async fn get(&self, id: i64) -> Result<Todo, StoreError>;

    /// Overwrites every mutable field of the row with `todo.id`.
    ///
    /// Fails with [`StoreError::EditConflict`] if that row no longer exists.
    /// No version is compared, so a concurrent modification of a row that
    /// still exists is not detected.
    async fn update(&self, todo: &mut Todo) -> Result<(), StoreError>;

    /// Fails with [`StoreError::RecordNotFound`] for `id < 1` or when nothing was deleted.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Returns one page of todos whose title matches `title` (all todos when
    /// `title` is empty), ordered by the filters' column with `id` as tie-break.
    async fn get_all(&self, title: &str, filters: &Filters)
        -> Result<(Vec<Todo>, Metadata), StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
