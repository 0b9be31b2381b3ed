//! The todo record and its field rules.

use crate::domain::validator::Validator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const TITLE_MAX_BYTES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Todo {
    /// Assigned by the store on insert.
    pub id: i64,
    /// Assigned by the store on insert.
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

impl Todo {
    /// A todo that has not been persisted yet. `id` and `created_at` are
    /// placeholders until the store fills them in.
    pub fn new(title: impl Into<String>, description: impl Into<String>, completed: bool) -> Self {
        Self {
            id: 0,
            created_at: DateTime::<Utc>::default(),
            title: title.into(),
            description: description.into(),
            completed,
        }
    }
}

pub fn validate_todo(v: &mut Validator, todo: &Todo) {
    v.check(!todo.title.is_empty(), "title", "must be provided");
    // Byte length, not characters.
    v.check(
        todo.title.len() <= TITLE_MAX_BYTES,
        "title",
        "must not be more than 20 bytes long",
    );

    v.check(!todo.description.is_empty(), "description", "must be provided");
}
