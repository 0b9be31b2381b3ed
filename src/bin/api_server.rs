// src/bin/api_server.rs

use std::sync::Arc;
use todo_api::infra::config;
use todo_api::transport;
use todo_api::{DatabaseService, InMemoryTodoStore, TodoStore};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- Store Initialization ---
    let store: Arc<dyn TodoStore> = if config::use_in_memory_store() {
        tracing::warn!("USE_IN_MEMORY_STORE is set; todos will not survive a restart");
        Arc::new(InMemoryTodoStore::new())
    } else {
        tracing::info!("connecting to PostgreSQL");
        let db_service = DatabaseService::new().await?;
        tracing::info!("database ready (todo table ensured)");
        Arc::new(db_service.todo_store())
    };

    let app_state = transport::http::AppState::new(store);
    tracing::info!(environment = %app_state.environment, "application state initialized");

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutdown signal received, draining in-flight requests");
        })
        .await?;

    tracing::info!("graceful shutdown complete");
    Ok(())
}
