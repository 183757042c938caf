use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimited(String),

    /// Missing server configuration. The message is logged, never returned.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Unavailable(String),

    /// Generic failure. `details` is only rendered when the caller opted in
    /// (non-production environments).
    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;

const CONFIG_ERROR_MESSAGE: &str = "Server configuration missing. Contact the administrator.";

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// Internal error without diagnostic detail.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
            details: None,
        }
    }

    /// Internal error carrying `detail` only when `expose` is set.
    pub fn internal_with_details(
        message: impl Into<String>,
        detail: impl Into<String>,
        expose: bool,
    ) -> Self {
        AppError::Internal {
            message: message.into(),
            details: expose.then(|| detail.into()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<crate::storage::StorageError> for AppError {
    fn from(err: crate::storage::StorageError) -> Self {
        tracing::error!(error = %err, "Storage failure");
        AppError::internal("Storage error")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::Config(msg) => {
                tracing::error!(reason = %msg, "Server configuration missing");
                ErrorBody {
                    error: CONFIG_ERROR_MESSAGE.to_string(),
                    details: None,
                }
            }
            AppError::Internal { message, details } => ErrorBody {
                error: message,
                details,
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
