use crate::domain::filters::{validate_filters, Filters, TODO_SORT_SAFELIST};
use crate::domain::todo::validate_todo;
use crate::domain::validator::Validator;
use crate::transport::http::handlers::common::{parse_id, read_int, read_string, ApiError};
use crate::transport::http::types::{
    AppState, CreateTodoRequest, MessageEnvelope, TodoEnvelope, TodoListEnvelope, UpdateTodoRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use std::collections::HashMap;

#[utoipa::path(
    post,
    path = "/v1/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoEnvelope,
            headers(("Location" = String, description = "URL of the new todo"))),
        (status = 400, description = "Malformed JSON body", body = ErrorEnvelope),
        (status = 422, description = "Failed validation", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
pub async fn create_todo_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = request?;
    let mut todo = input.into_todo();

    let mut v = Validator::new();
    validate_todo(&mut v, &todo);
    if !v.valid() {
        return Err(v.into());
    }

    state.store.insert(&mut todo).await?;
    tracing::debug!(id = todo.id, "todo created");

    let location = format!("/v1/todos/{}", todo.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TodoEnvelope { todo }),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/todos/{id}",
    params(("id" = i64, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Todo found", body = TodoEnvelope),
        (status = 404, description = "Todo not found", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
pub async fn show_todo_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let id = parse_id(&id)?;
    let todo = state.store.get(id).await?;
    Ok(Json(TodoEnvelope { todo }))
}

/// Partial update: only the fields present in the body replace stored values,
/// then the merged todo is validated as a whole.
#[utoipa::path(
    patch,
    path = "/v1/todos/{id}",
    params(("id" = i64, Path, description = "Todo id")),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = TodoEnvelope),
        (status = 400, description = "Malformed JSON body", body = ErrorEnvelope),
        (status = 404, description = "Todo not found", body = ErrorEnvelope),
        (status = 409, description = "Todo was deleted while being updated", body = ErrorEnvelope),
        (status = 422, description = "Failed validation", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
pub async fn update_todo_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let id = parse_id(&id)?;
    let mut todo = state.store.get(id).await?;

    let Json(input) = request?;
    input.apply_to(&mut todo);

    let mut v = Validator::new();
    validate_todo(&mut v, &todo);
    if !v.valid() {
        return Err(v.into());
    }

    state.store.update(&mut todo).await?;
    Ok(Json(TodoEnvelope { todo }))
}

#[utoipa::path(
    delete,
    path = "/v1/todos/{id}",
    params(("id" = i64, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Todo deleted", body = MessageEnvelope),
        (status = 404, description = "Todo not found", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
pub async fn delete_todo_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageEnvelope>, ApiError> {
    let id = parse_id(&id)?;
    state.store.delete(id).await?;
    tracing::debug!(id, "todo deleted");
    Ok(Json(MessageEnvelope {
        message: "todo successfully deleted".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/todos",
    params(
        ("title" = Option<String>, Query, description = "Full-text search over titles"),
        ("page" = Option<i64>, Query, description = "Page number, 1..=1000 (default 1)"),
        ("page_size" = Option<i64>, Query, description = "Page size, 1..=100 (default 4)"),
        ("sort" = Option<String>, Query,
            description = "One of id, title, completed; prefix with - for descending (default id)")
    ),
    responses(
        (status = 200, description = "Page of todos", body = TodoListEnvelope),
        (status = 422, description = "Failed validation", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
pub async fn list_todos_handler(
    State(state): State<AppState>,
    Query(qs): Query<HashMap<String, String>>,
) -> Result<Json<TodoListEnvelope>, ApiError> {
    let mut v = Validator::new();

    let title = read_string(&qs, "title", "");
    let mut filters = Filters::new(TODO_SORT_SAFELIST);
    filters.page = read_int(&qs, "page", filters.page, &mut v);
    filters.page_size = read_int(&qs, "page_size", filters.page_size, &mut v);
    filters.sort = read_string(&qs, "sort", &filters.sort);

    validate_filters(&mut v, &filters);
    if !v.valid() {
        return Err(v.into());
    }

    let (todos, metadata) = state.store.get_all(&title, &filters).await?;
    Ok(Json(TodoListEnvelope { todos, metadata }))
}
