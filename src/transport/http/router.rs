use crate::domain::filters::Metadata;
use crate::domain::todo::Todo;
use crate::transport::http::handlers::{common, health, todos};
use crate::transport::http::types::{
    AppState, CreateTodoRequest, ErrorEnvelope, HealthResponse, MessageEnvelope, SystemInfo,
    TodoEnvelope, TodoListEnvelope, UpdateTodoRequest,
};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        todos::create_todo_handler,
        todos::show_todo_handler,
        todos::update_todo_handler,
        todos::delete_todo_handler,
        todos::list_todos_handler
    ),
    components(schemas(
        Todo,
        Metadata,
        CreateTodoRequest,
        UpdateTodoRequest,
        TodoEnvelope,
        TodoListEnvelope,
        MessageEnvelope,
        ErrorEnvelope,
        HealthResponse,
        SystemInfo
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/v1/healthcheck", get(health::healthcheck_handler))
        .route(
            "/v1/todos",
            get(todos::list_todos_handler).post(todos::create_todo_handler),
        )
        .route(
            "/v1/todos/:id",
            get(todos::show_todo_handler)
                .patch(todos::update_todo_handler)
                .delete(todos::delete_todo_handler),
        )
        .fallback(common::not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
