use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored field checks are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("stored status is invalid: {0}")]
    InvalidStatus(String),
    #[error("store operation timed out after {0}s")]
    Timeout(u64),
}

/// 抽取器响应解析错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extractor returned an empty response")]
    Empty,
    #[error("extractor response is not a valid document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// CSV 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// HTTP 层统一错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("verification {0} not found")]
    NotFound(i64),
    #[error("no verification results to export")]
    NothingToExport,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::NothingToExport => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Extraction(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        let body = ErrorResponse {
            success: false,
            message: format!("Error: {}", self),
        };
        (status, Json(body)).into_response()
    }
}
