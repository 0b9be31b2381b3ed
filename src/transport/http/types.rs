use crate::domain::filters::Metadata;
use crate::domain::todo::Todo;
use crate::infra::config;
use crate::storage::TodoStore;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    /// Reported by the healthcheck.
    pub environment: String,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            store,
            environment: config::environment(),
        }
    }
}

/// Body of `POST /v1/todos`. Missing fields default to their zero value and
/// are then caught by validation.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl CreateTodoRequest {
    pub fn into_todo(self) -> Todo {
        Todo::new(self.title, self.description, self.completed)
    }
}

/// Body of `PATCH /v1/todos/{id}`. Only fields that are present and not
/// `null` replace the stored value.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl UpdateTodoRequest {
    pub fn apply_to(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TodoEnvelope {
    pub todo: Todo,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TodoListEnvelope {
    pub todos: Vec<Todo>,
    pub metadata: Metadata,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct MessageEnvelope {
    pub message: String,
}

/// Error body. `error` is a message string, or a field → message map for
/// failed validation.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorEnvelope {
    #[schema(value_type = Object)]
    pub error: JsonValue,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub system_info: SystemInfo,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SystemInfo {
    pub environment: String,
    pub version: String,
}
