//! In-process todo store with the same contract as the PostgreSQL one.

use crate::domain::filters::{calculate_metadata, Filters, Metadata, SortDirection};
use crate::domain::todo::Todo;
use crate::storage::todo::{StoreError, TodoStore};
use async_trait::async_trait;
use chrono::{Duration, DurationRound, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Todo>,
}

#[derive(Default)]
pub struct InMemoryTodoStore {
    table: RwLock<Table>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Lowercased alphanumeric words, roughly what the `simple` text search
/// configuration produces.
fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Every query word must appear in the title. An empty query matches
/// everything; a query with no words in it matches nothing.
fn title_matches(title: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let wanted = tokens(query);
    if wanted.is_empty() {
        return false;
    }
    let have = tokens(title);
    wanted.iter().all(|w| have.contains(w))
}

/// Case-insensitive first, like a typical database collation; byte order
/// only breaks ties between titles that differ in case alone.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare(a: &Todo, b: &Todo, column: &str) -> Ordering {
    match column {
        "title" => compare_titles(&a.title, &b.title),
        "completed" => a.completed.cmp(&b.completed),
        _ => a.id.cmp(&b.id),
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn insert(&self, todo: &mut Todo) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        todo.id = table.last_id;
        // TIMESTAMPTZ(0) keeps whole seconds only.
        let now = Utc::now();
        todo.created_at = now
            .duration_trunc(Duration::seconds(1))
            .map_err(anyhow::Error::from)?;
        table.rows.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Todo, StoreError> {
        if id < 1 {
            return Err(StoreError::RecordNotFound);
        }
        let table = self.table.read().await;
        table.rows.get(&id).cloned().ok_or(StoreError::RecordNotFound)
    }

    async fn update(&self, todo: &mut Todo) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        let row = table.rows.get_mut(&todo.id).ok_or(StoreError::EditConflict)?;
        row.title = todo.title.clone();
        row.description = todo.description.clone();
        row.completed = todo.completed;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        if id < 1 {
            return Err(StoreError::RecordNotFound);
        }
        let mut table = self.table.write().await;
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::RecordNotFound)
    }

    async fn get_all(
        &self,
        title: &str,
        filters: &Filters,
    ) -> Result<(Vec<Todo>, Metadata), StoreError> {
        let column = filters.sort_column();
        let direction = filters.sort_direction();

        let table = self.table.read().await;
        let mut matching: Vec<&Todo> = table
            .rows
            .values()
            .filter(|t| title_matches(&t.title, title))
            .collect();

        matching.sort_by(|a, b| {
            let primary = match direction {
                SortDirection::Asc => compare(a, b, column),
                SortDirection::Desc => compare(b, a, column),
            };
            primary.then(a.id.cmp(&b.id))
        });

        let total_records = matching.len() as i64;
        let todos: Vec<Todo> = matching
            .into_iter()
            .skip(filters.offset().max(0) as usize)
            .take(filters.limit().max(0) as usize)
            .cloned()
            .collect();

        Ok((todos, calculate_metadata(total_records, filters.page, filters.page_size)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
