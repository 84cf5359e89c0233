//! Error types for outlay-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use outlay_core::CoreError;
use outlay_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Internal server error")]
    InternalError,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::InternalError => "INTERNAL_ERROR",
        }
    }

    /// JSON body sent to the client
    pub fn body(&self) -> String {
        serde_json::to_string(&serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            },
        }))
        .unwrap_or_default()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => ApiError::NotFound {
                resource: format!("expense {}", id),
            },
            StoreError::Invalid(core) => ApiError::BadRequest {
                message: core.to_string(),
            },
            other => {
                log::error!("store failure: {}", other);
                ApiError::InternalError
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::BadRequest {
            message: err.to_string(),
        }
    }
}
