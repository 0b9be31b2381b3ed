use crate::transport::http::types::{AppState, HealthResponse, SystemInfo};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/v1/healthcheck",
    responses(
        (status = 200, description = "Service is available (store reachable)", body = HealthResponse),
        (status = 503, description = "Service is unavailable (store unreachable)", body = HealthResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (status, label) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "available"),
        Err(e) => {
            tracing::warn!(error = %e, "store ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            system_info: SystemInfo {
                environment: state.environment.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }),
    )
}
