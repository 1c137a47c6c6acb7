use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// Application errors surfaced at the HTTP boundary
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Too many requests. Please try again later.")]
    TooManyRequests,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_type = match self {
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::TooManyRequests => "TooManyRequests",
            AppError::Store(_) => "StoreError",
            AppError::Internal(_) => "InternalError",
        };

        let response = ErrorResponse {
            error: ErrorDetail {
                error_type: error_type.to_string(),
                message: self.to_string(),
            },
        };

        HttpResponse::build(self.status_code()).json(response)
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

/// Failures of a snapshot store
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read {table}: {message}")]
    Read { table: &'static str, message: String },

    #[error("Failed to write {table}: {message}")]
    Write { table: &'static str, message: String },
}

impl StoreError {
    pub fn read(table: &'static str, err: impl std::fmt::Display) -> Self {
        StoreError::Read {
            table,
            message: err.to_string(),
        }
    }

    pub fn write(table: &'static str, err: impl std::fmt::Display) -> Self {
        StoreError::Write {
            table,
            message: err.to_string(),
        }
    }
}

/// Failures of a single fetch cycle
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Required credentials are absent; upstream was not called
    #[error("{0}")]
    Configuration(String),

    /// Upstream returned a non-success status, a malformed payload, or the call failed
    #[error("{0}")]
    Remote(String),

    #[error("{service} API rate limit exceeded. Rate limit resets at: {}", format_reset(.reset_at))]
    RateLimited {
        service: &'static str,
        reset_at: Option<DateTime<Utc>>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn format_reset(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "unknown".to_string(),
    }
}

/// Result type alias for fetch cycles
pub type FetchResult<T> = Result<T, FetchError>;
