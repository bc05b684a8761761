//! HTTP surface: the `/users` and `/user` endpoints and their error mapping.

use crate::core::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub correlation_id: String,
}

#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    Input(String),
    MethodNotAllowed,
}

impl ApiError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Persistence(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Input(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, code) = match self {
            ApiError::Store(StoreError::NotFound(_)) => {
                ("User not found".to_string(), "not_found")
            }
            ApiError::Store(err @ StoreError::Persistence(_)) => {
                (err.to_string(), "persistence_error")
            }
            ApiError::Input(msg) => (msg, "invalid_input"),
            ApiError::MethodNotAllowed => {
                ("Method not allowed".to_string(), "method_not_allowed")
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            correlation_id: Uuid::new_v4().to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
