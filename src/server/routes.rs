//! Request handlers for the check API.

use super::AppState;
use crate::models::AggregationResult;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Body of `POST /api/check`.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    #[serde(default, alias = "handle")]
    pub username: String,
}

/// Errors surfaced to API clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Username required")]
    MissingUsername,

    #[error("Invalid username: use up to 30 letters, digits, '.' or '_'")]
    InvalidUsername,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUsername | ApiError::InvalidUsername => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("Rejected request: {}", self);
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Longest handle accepted.
pub const MAX_HANDLE_LEN: usize = 30;

/// Trim whitespace and a leading `@`, then require a plain handle made of
/// ASCII letters, digits, `.` and `_`.
pub fn normalize_handle(raw: &str) -> Result<String, ApiError> {
    let handle = raw.trim().trim_start_matches('@').trim();
    if handle.is_empty() {
        return Err(ApiError::MissingUsername);
    }
    let valid = handle.len() <= MAX_HANDLE_LEN
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
    if !valid {
        return Err(ApiError::InvalidUsername);
    }
    Ok(handle.to_string())
}

pub async fn check_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<AggregationResult>, ApiError> {
    let handle = normalize_handle(&request.username)?;
    info!("Check requested for @{}", handle);
    Ok(Json(state.checker.check(&handle).await))
}

pub async fn info_handler() -> Json<Value> {
    Json(json!({
        "message": "SubScout API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoint": "/api/check",
        "method": "POST",
        "body": { "username": "instagram_username" },
    }))
}
