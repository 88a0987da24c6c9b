// 🧯 API Errors - One error type, one JSON body shape
// `{ "error": message, "status": code }` unless an endpoint fixes its own body

use crate::simulation::SimulationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::{Mutex, MutexGuard};
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg.clone(),
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": message,
            "status": status.as_u16()
        }));
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", err))
    }
}

impl From<SimulationError> for ApiError {
    fn from(err: SimulationError) -> Self {
        ApiError::Conflict(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Lock shared state; a poisoned lock is an internal error
pub fn lock<T>(mutex: &Mutex<T>) -> ApiResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| ApiError::Internal("shared state is unavailable".to_string()))
}

/// Bare `{ "error": message }` body for endpoints with a fixed failure contract
pub fn plain_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_and_status() {
        let err = ApiError::NotFound("application 7".into());
        assert_eq!(err.to_string(), "Not found: application 7");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_simulation_error_maps_to_conflict() {
        let err: ApiError = SimulationError::ModeChangeWhileRunning.into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_anyhow_maps_to_internal() {
        let err: ApiError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("disk full"));
    }
}
