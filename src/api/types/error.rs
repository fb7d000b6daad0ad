//! JSON error responses and status mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::agent::WorkflowError;
use crate::domain::ingestion::IngestionError;
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    UnsupportedMediaTypeError,
    UpstreamError,
    ServerError,
    ServiceUnavailableError,
    TimeoutError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidRequestError => "invalid_request_error",
            Self::NotFoundError => "not_found_error",
            Self::UnsupportedMediaTypeError => "unsupported_media_type_error",
            Self::UpstreamError => "upstream_error",
            Self::ServerError => "server_error",
            Self::ServiceUnavailableError => "service_unavailable_error",
            Self::TimeoutError => "timeout_error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    /// Machine-readable failure kind, e.g. `store_unavailable`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    code: None,
                },
            },
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiErrorType::UnsupportedMediaTypeError,
            message,
        )
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiErrorType::InvalidRequestError,
            message,
        )
    }

    /// A model or embedding service failed or answered off-contract
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, ApiErrorType::UpstreamError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, ApiErrorType::TimeoutError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        let api_error = match &err {
            WorkflowError::InvalidQuery(_) => Self::bad_request(message),
            WorkflowError::Classification(_)
            | WorkflowError::Validation(_)
            | WorkflowError::Generation(_)
            | WorkflowError::Provider { .. } => Self::bad_gateway(message),
            WorkflowError::StoreUnavailable { .. } => Self::unavailable(message),
            WorkflowError::Timeout { .. } => Self::gateway_timeout(message),
            WorkflowError::InvalidTransition { .. } => Self::internal(message),
        };

        api_error.with_code(err.kind())
    }
}

impl From<IngestionError> for ApiError {
    fn from(err: IngestionError) -> Self {
        let message = err.to_string();
        let api_error = match &err {
            IngestionError::Validation(_) => Self::bad_request(message),
            IngestionError::NotFound(_) => Self::not_found(message),
            IngestionError::UnsupportedFormat { .. } => Self::unsupported_media_type(message),
            IngestionError::Parse { .. } => Self::unprocessable(message),
            IngestionError::Classification(_) | IngestionError::Embedding(_) => {
                Self::bad_gateway(message)
            }
            IngestionError::Store { .. } => Self::unavailable(message),
        };

        api_error.with_code(err.kind())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Provider { provider, message }
            | DomainError::Rejected { provider, message } => {
                Self::bad_gateway(format!("{}: {}", provider, message))
            }
            DomainError::Storage { message } => Self::unavailable(message),
            DomainError::Configuration { message } | DomainError::Internal { message } => {
                Self::internal(message)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}
