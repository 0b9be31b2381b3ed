//! Drives the router in-process against the in-memory store.

use async_trait::async_trait;
use axum::http::{self, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, DurationRound, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use todo_api::transport::http::{create_router, AppState};
use todo_api::{Filters, InMemoryTodoStore, Metadata, StoreError, Todo, TodoStore};
use tower::ServiceExt;

fn app() -> Router {
    app_with(Arc::new(InMemoryTodoStore::new()))
}

fn app_with(store: Arc<dyn TodoStore>) -> Router {
    create_router(AppState::new(store))
}

async fn send(app: &Router, request: Request<String>) -> (StatusCode, http::HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn delete(uri: &str) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(String::new())
        .unwrap()
}

async fn create(app: &Router, title: &str, description: &str, completed: bool) -> Value {
    let body = json!({ "title": title, "description": description, "completed": completed });
    let (status, _, body) = send(app, json_request("POST", "/v1/todos", &body.to_string())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["todo"].clone()
}

fn error_keys(body: &Value) -> Vec<String> {
    let mut keys: Vec<String> = body["error"].as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201_with_location() {
    let app = app();
    let before = Utc::now().duration_trunc(Duration::seconds(1)).unwrap();

    let (status, headers, body) = send(
        &app,
        json_request(
            "POST",
            "/v1/todos",
            r#"{"title":"Buy milk","description":"2 litres","completed":false}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let todo: Todo = serde_json::from_value(body["todo"].clone()).unwrap();
    assert!(todo.id > 0);
    assert!(todo.created_at >= before);
    assert_eq!(todo.title, "Buy milk");
    assert_eq!(todo.description, "2 litres");
    assert!(!todo.completed);
    assert_eq!(
        headers.get(http::header::LOCATION).unwrap(),
        &format!("/v1/todos/{}", todo.id)
    );
}

#[tokio::test]
async fn create_todo_failed_validation_lists_every_field() {
    let app = app();
    let (status, _, body) = send(&app, json_request("POST", "/v1/todos", r#"{}"#)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_keys(&body), vec!["description", "title"]);
    assert_eq!(body["error"]["title"], "must be provided");
}

#[tokio::test]
async fn create_todo_title_over_20_bytes_fails() {
    let app = app();
    // 11 characters, 22 bytes.
    let body = json!({ "title": "ééééééééééé", "description": "d" });
    let (status, _, body) = send(&app, json_request("POST", "/v1/todos", &body.to_string())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_keys(&body), vec!["title"]);
    assert_eq!(body["error"]["title"], "must not be more than 20 bytes long");
}

#[tokio::test]
async fn create_todo_malformed_input_returns_400() {
    let app = app();
    for raw in [
        r#"{"title":"a","description":"b""#,
        r#"{"title":5,"description":"b"}"#,
        r#"{"title":"a","description":"b","priority":1}"#,
        r#""just a string""#,
    ] {
        let (status, _, body) = send(&app, json_request("POST", "/v1/todos", raw)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn create_then_show_round_trips() {
    let app = app();
    let created = create(&app, "Walk dog", "around the park", true).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _, body) = send(&app, get(&format!("/v1/todos/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todo"], created);
}

// --- show ---

#[tokio::test]
async fn show_missing_or_bad_id_returns_404() {
    let app = app();
    create(&app, "a", "b", false).await;

    for uri in ["/v1/todos/99", "/v1/todos/0", "/v1/todos/-1", "/v1/todos/abc"] {
        let (status, _, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "the requested resource could not be found");
    }
}

// --- update ---

#[tokio::test]
async fn patch_only_overwrites_given_fields() {
    let app = app();
    let created = create(&app, "A", "B", false).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _, body) = send(
        &app,
        json_request("PATCH", &format!("/v1/todos/{id}"), r#"{"completed":true}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todo"]["title"], "A");
    assert_eq!(body["todo"]["description"], "B");
    assert_eq!(body["todo"]["completed"], true);
    assert_eq!(body["todo"]["id"], created["id"]);
    assert_eq!(body["todo"]["created_at"], created["created_at"]);

    let (_, _, body) = send(&app, get(&format!("/v1/todos/{id}"))).await;
    assert_eq!(body["todo"]["completed"], true);
}

#[tokio::test]
async fn patch_with_same_fields_twice_is_stable() {
    let app = app();
    let created = create(&app, "A", "B", false).await;
    let id = created["id"].as_i64().unwrap();
    let patch = r#"{"title":"C","description":"D","completed":true}"#;

    let (first_status, _, first) =
        send(&app, json_request("PATCH", &format!("/v1/todos/{id}"), patch)).await;
    let (second_status, _, second) =
        send(&app, json_request("PATCH", &format!("/v1/todos/{id}"), patch)).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn patch_revalidates_merged_todo() {
    let app = app();
    let created = create(&app, "A", "B", false).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _, body) = send(
        &app,
        json_request("PATCH", &format!("/v1/todos/{id}"), r#"{"description":""}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_keys(&body), vec!["description"]);

    let (_, _, body) = send(&app, get(&format!("/v1/todos/{id}"))).await;
    assert_eq!(body["todo"]["description"], "B");
}

#[tokio::test]
async fn patch_missing_todo_returns_404() {
    let app = app();
    let (status, _, _) =
        send(&app, json_request("PATCH", "/v1/todos/7", r#"{"completed":true}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_malformed_body_returns_400() {
    let app = app();
    create(&app, "A", "B", false).await;
    let (status, _, _) =
        send(&app, json_request("PATCH", "/v1/todos/1", r#"{"completed":"yes"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Deletes the row right before writing, as a concurrent request would.
struct VanishingStore {
    inner: InMemoryTodoStore,
}

#[async_trait]
impl TodoStore for VanishingStore {
    async fn insert(&self, todo: &mut Todo) -> Result<(), StoreError> {
        self.inner.insert(todo).await
    }
    async fn get(&self, id: i64) -> Result<Todo, StoreError> {
        self.inner.get(id).await
    }
    async fn update(&self, todo: &mut Todo) -> Result<(), StoreError> {
        self.inner.delete(todo.id).await?;
        self.inner.update(todo).await
    }
    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }
    async fn get_all(&self, title: &str, filters: &Filters) -> Result<(Vec<Todo>, Metadata), StoreError> {
        self.inner.get_all(title, filters).await
    }
    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

#[tokio::test]
async fn patch_on_concurrently_deleted_todo_returns_409() {
    let app = app_with(Arc::new(VanishingStore {
        inner: InMemoryTodoStore::new(),
    }));
    create(&app, "A", "B", false).await;

    let (status, _, body) =
        send(&app, json_request("PATCH", "/v1/todos/1", r#"{"completed":true}"#)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "unable to update the record due to an edit conflict, please try again"
    );
}

// --- delete ---

#[tokio::test]
async fn delete_todo_then_again_returns_404() {
    let app = app();
    create(&app, "A", "B", false).await;

    let (status, _, body) = send(&app, delete("/v1/todos/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "todo successfully deleted");

    let (status, _, _) = send(&app, delete("/v1/todos/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, get("/v1/todos/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_bad_id_returns_404() {
    let app = app();
    let (status, _, _) = send(&app, delete("/v1/todos/0")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- list ---

#[tokio::test]
async fn list_empty_returns_empty_array_and_zero_metadata() {
    let app = app();
    let (status, _, body) = send(&app, get("/v1/todos")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todos"], json!([]));
    assert_eq!(
        body["metadata"],
        json!({"current_page":0,"page_size":0,"first_page":0,"last_page":0,"total_records":0})
    );
}

#[tokio::test]
async fn list_defaults_to_four_per_page_sorted_by_id() {
    let app = app();
    for i in 1..=6 {
        create(&app, &format!("task {i}"), "d", false).await;
    }

    let (status, _, body) = send(&app, get("/v1/todos")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["todos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(
        body["metadata"],
        json!({"current_page":1,"page_size":4,"first_page":1,"last_page":2,"total_records":6})
    );

    let (_, _, body) = send(&app, get("/v1/todos?page=2")).await;
    assert_eq!(body["todos"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn list_sorts_descending_by_title() {
    let app = app();
    for title in ["banana", "apple", "cherry"] {
        create(&app, title, "d", false).await;
    }

    let (_, _, body) = send(&app, get("/v1/todos?sort=-title&page_size=10")).await;
    let titles: Vec<&str> = body["todos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["cherry", "banana", "apple"]);
}

#[tokio::test]
async fn list_filters_by_title_search() {
    let app = app();
    create(&app, "Buy milk", "d", false).await;
    create(&app, "Buy bread", "d", false).await;
    create(&app, "Call mom", "d", false).await;

    let (status, _, body) = send(&app, get("/v1/todos?title=buy&page_size=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todos"].as_array().unwrap().len(), 2);
    assert_eq!(body["metadata"]["total_records"], 2);

    let (_, _, body) = send(&app, get("/v1/todos?title=&page_size=10")).await;
    assert_eq!(body["todos"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn list_rejects_invalid_filters() {
    let app = app();
    let cases = [
        ("/v1/todos?page=0", vec!["page"]),
        ("/v1/todos?page=1001", vec!["page"]),
        ("/v1/todos?page_size=101", vec!["page_size"]),
        ("/v1/todos?page_size=0", vec!["page_size"]),
        ("/v1/todos?sort=bogus", vec!["sort"]),
        ("/v1/todos?page=0&page_size=101&sort=bogus", vec!["page", "page_size", "sort"]),
    ];
    for (uri, expected) in cases {
        let (status, _, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(error_keys(&body), expected, "{uri}");
    }
}

#[tokio::test]
async fn list_rejects_non_integer_paging() {
    let app = app();
    let (status, _, body) = send(&app, get("/v1/todos?page=two&page_size=x")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["page"], "must be an integer value");
    assert_eq!(body["error"]["page_size"], "must be an integer value");
}

// --- failures, health, routing ---

struct BrokenStore;

#[async_trait]
impl TodoStore for BrokenStore {
    async fn insert(&self, _todo: &mut Todo) -> Result<(), StoreError> {
        Err(anyhow::anyhow!("connection refused").into())
    }
    async fn get(&self, _id: i64) -> Result<Todo, StoreError> {
        Err(anyhow::anyhow!("connection refused").into())
    }
    async fn update(&self, _todo: &mut Todo) -> Result<(), StoreError> {
        Err(anyhow::anyhow!("connection refused").into())
    }
    async fn delete(&self, _id: i64) -> Result<(), StoreError> {
        Err(anyhow::anyhow!("connection refused").into())
    }
    async fn get_all(&self, _title: &str, _filters: &Filters) -> Result<(Vec<Todo>, Metadata), StoreError> {
        Err(anyhow::anyhow!("connection refused").into())
    }
    async fn ping(&self) -> Result<(), StoreError> {
        Err(anyhow::anyhow!("connection refused").into())
    }
}

#[tokio::test]
async fn backend_failures_return_generic_500() {
    let app = app_with(Arc::new(BrokenStore));

    let requests = [
        json_request("POST", "/v1/todos", r#"{"title":"a","description":"b"}"#),
        get("/v1/todos/1"),
        get("/v1/todos"),
        delete("/v1/todos/1"),
    ];
    for request in requests {
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "the server encountered a problem and could not process your request"
        );
    }
}

#[tokio::test]
async fn healthcheck_reports_store_reachability() {
    let (status, _, body) = send(&app(), get("/v1/healthcheck")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");
    assert_eq!(body["system_info"]["version"], env!("CARGO_PKG_VERSION"));

    let (status, _, body) = send(&app_with(Arc::new(BrokenStore)), get("/v1/healthcheck")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let (status, _, body) = send(&app(), get("/v2/nothing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "the requested resource could not be found");
}

#[tokio::test]
async fn wrong_method_returns_405() {
    let (status, _, _) = send(&app(), json_request("PUT", "/v1/todos/1", "{}")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[test]
fn created_at_serializes_as_rfc3339() {
    let todo = Todo {
        id: 1,
        created_at: DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc),
        title: "a".into(),
        description: "b".into(),
        completed: false,
    };
    let value = serde_json::to_value(&todo).unwrap();
    assert_eq!(value["created_at"], "2024-01-02T03:04:05Z");
}
