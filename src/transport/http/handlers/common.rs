use crate::domain::validator::Validator;
use crate::storage::StoreError;
use crate::transport::http::types::ErrorEnvelope;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};

pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
pub const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Every way a todo request can fail, each with its own status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    MalformedInput(String),
    #[error("failed validation")]
    FailedValidation(BTreeMap<String, String>),
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,
    #[error("{}", EDIT_CONFLICT_MESSAGE)]
    EditConflict,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ApiError::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::EditConflict => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RecordNotFound => ApiError::NotFound,
            StoreError::EditConflict => ApiError::EditConflict,
            StoreError::Backend(e) => ApiError::Internal(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::MalformedInput(err.body_text())
    }
}

impl From<Validator> for ApiError {
    fn from(v: Validator) -> Self {
        ApiError::FailedValidation(v.into_errors())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::FailedValidation(errors) => serde_json::json!(errors),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "request failed");
                JsonValue::from(SERVER_ERROR_MESSAGE)
            }
            other => JsonValue::from(other.to_string()),
        };
        (status, Json(ErrorEnvelope { error })).into_response()
    }
}

/// Parses a path id. Anything that is not a positive integer is reported as
/// not found.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::NotFound),
    }
}

/// Query string value for `key`, or `default` when absent.
pub fn read_string(qs: &HashMap<String, String>, key: &str, default: &str) -> String {
    match qs.get(key) {
        Some(s) if !s.is_empty() => s.clone(),
        _ => default.to_string(),
    }
}

/// Integer query string value for `key`, or `default` when absent. A value
/// that does not parse is recorded in `v` and `default` is returned.
pub fn read_int(qs: &HashMap<String, String>, key: &str, default: i64, v: &mut Validator) -> i64 {
    match qs.get(key) {
        Some(s) if !s.is_empty() => match s.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                v.add_error(key, "must be an integer value");
                default
            }
        },
        _ => default,
    }
}

pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}
