// Error taxonomy and shared result types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Per-file extraction failures. Always contained to the file that
/// produced them; an upload batch keeps going past these.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("extraction failed: {0}")]
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("completion network error: {0}")]
    Network(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("synthesis service error ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("synthesis network error: {0}")]
    Network(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    NoDocuments(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Completion(CompletionError::Network(_)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Completion(_) => StatusCode::BAD_GATEWAY,
            AppError::Synthesis(SynthesisError::Network(_)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Synthesis(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NoDocuments(_) => StatusCode::CONFLICT,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::Completion(_) => "completion_error",
            AppError::Synthesis(_) => "synthesis_error",
            AppError::InvalidRequest(_) => "invalid_request_error",
            AppError::NotFound(_) => "not_found",
            AppError::NoDocuments(_) => "no_documents",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.to_string(),
                r#type: self.error_type().to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
