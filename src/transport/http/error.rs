use crate::transport::http::types::ErrorResponse;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Failures surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The entity addressed by the request does not exist.
    #[error("{0}")]
    NotFound(String),
    /// A unique field (cpf) is already taken.
    #[error("{0}")]
    Conflict(String),
    /// A supplied foreign key does not resolve.
    #[error("{0}")]
    InvalidReference(String),
    #[error("{0}")]
    InvalidInput(String),
    /// The car is owned by someone other than the person in the request.
    #[error("{0}")]
    OwnershipMismatch(String),
    /// A write failed after its preconditions had been confirmed.
    #[error("{0}")]
    OperationFailed(String),
    /// The body, a path segment or a query parameter could not be decoded.
    #[error("{0}")]
    MalformedRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(detail: &str) -> Self {
        ApiError::NotFound(detail.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_)
            | ApiError::InvalidReference(_)
            | ApiError::InvalidInput(_)
            | ApiError::OwnershipMismatch(_)
            | ApiError::OperationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::MalformedRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::MalformedRequest(format!("Invalid JSON body: {}", err.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(err: PathRejection) -> Self {
        ApiError::MalformedRequest(format!("Invalid path parameter: {}", err.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(err: QueryRejection) -> Self {
        ApiError::MalformedRequest(format!("Invalid query parameter: {}", err.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                "Internal server error".to_string()
            }
            ApiError::OperationFailed(msg) => {
                tracing::warn!(detail = %msg, "write failed after validation");
                msg.clone()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
