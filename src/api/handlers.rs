use crate::error::AppError;
use crate::models::{
    DiscrepancyReport, DocumentRecord, OverallStatus, VerificationRecord, VerificationRequest,
    VerificationStats,
};
use crate::service::{export, parse_extractor_response, DocumentKind, VerificationService};
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_HISTORY_LIMIT: usize = 10;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VerificationService>,
    pub export_dir: PathBuf,
}

/// 请求体: 批量比对
#[derive(Debug, Deserialize)]
pub struct BatchVerifyRequest {
    pub pairs: Vec<VerificationRequest>,
}

/// 请求体: 容差策略比对
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscrepancyRequest {
    pub invoice: DocumentRecord,
    pub purchase_order: DocumentRecord,
}

/// 请求体: 抽取器原始响应
#[derive(Debug, Deserialize)]
pub struct ParseDocumentRequest {
    pub kind: DocumentKind,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<OverallStatus>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub status: Option<OverallStatus>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub showing: usize,
    pub verifications: Vec<VerificationRecord>,
}

#[derive(Debug, Serialize)]
pub struct BatchVerifyResponse {
    pub success: bool,
    pub message: String,
    pub verifications: Vec<VerificationRecord>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
    pub removed: u64,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 比对一张发票与一张采购订单
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerificationRequest>,
) -> Result<(StatusCode, Json<VerificationRecord>), AppError> {
    let record = state.service.verify(req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// 批量比对
pub async fn verify_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchVerifyRequest>,
) -> Result<Json<BatchVerifyResponse>, AppError> {
    if req.pairs.is_empty() {
        return Err(AppError::BadRequest("pairs must not be empty".to_string()));
    }
    let verifications = state.service.verify_batch(req.pairs).await?;
    let response = BatchVerifyResponse {
        success: true,
        message: format!("Successfully verified {} document pairs", verifications.len()),
        verifications,
    };
    Ok(Json(response))
}

/// 容差策略比对 (不保存)
pub async fn detect_discrepancies(
    State(state): State<AppState>,
    Json(req): Json<DiscrepancyRequest>,
) -> Json<DiscrepancyReport> {
    Json(state.service.detect_discrepancies(&req.invoice, &req.purchase_order))
}

/// 解析抽取器返回内容
pub async fn parse_document(
    Json(req): Json<ParseDocumentRequest>,
) -> Result<Json<DocumentRecord>, AppError> {
    let record = parse_extractor_response(&req.content, req.kind)?;
    Ok(Json(record))
}

/// 历史记录 (最新在前)
pub async fn list_verifications(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let verifications = state.service.history(query.status, Some(limit)).await?;
    Ok(Json(HistoryResponse {
        showing: verifications.len(),
        verifications,
    }))
}

pub async fn get_verification(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<VerificationRecord>, AppError> {
    state
        .service
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(id))
}

/// 清空存储
pub async fn reset_verifications(State(state): State<AppState>) -> Result<Json<ResetResponse>, AppError> {
    let removed = state.service.reset().await?;
    Ok(Json(ResetResponse {
        success: true,
        message: "All verification results cleared".to_string(),
        removed,
    }))
}

pub async fn statistics(State(state): State<AppState>) -> Result<Json<VerificationStats>, AppError> {
    Ok(Json(state.service.statistics().await?))
}

/// 导出 CSV (同时写入导出目录)
pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let records = state.service.history(query.status, None).await?;
    if records.is_empty() {
        return Err(AppError::NothingToExport);
    }

    let path = export::export_to_csv(&records, &state.export_dir, query.status)?;
    let body = export::to_csv_bytes(&records)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| export::export_file_name(query.status));

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];
    Ok((StatusCode::OK, headers, body).into_response())
}
