use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::time::Duration;

use super::store::VerificationStore;
use crate::error::StoreError;
use crate::models::{
    ComparisonResult, DocumentSummary, NewVerification, OverallStatus, VerificationRecord,
};

const INSERT_TIMEOUT_SECS: u64 = 30;
const INSERT_CHUNK: usize = 1000;

const ALLOCATE_IDS: &str =
    "SELECT nextval(pg_get_serial_sequence('verification_results', 'id')) FROM generate_series(1, $1)";

const SELECT_COLUMNS: &str = r#"
    SELECT id, left_label, right_label,
           left_document_number, left_vendor, left_total,
           right_document_number, right_vendor, right_total,
           overall_status, total_fields_checked, matched_fields, mismatched_fields,
           match_percentage, field_checks, created_at
    FROM verification_results
"#;

/// verification_results 表的一行
#[derive(Debug, Clone, FromRow)]
struct VerificationRow {
    id: i64,
    left_label: String,
    right_label: String,
    left_document_number: Option<String>,
    left_vendor: Option<String>,
    left_total: Option<String>,
    right_document_number: Option<String>,
    right_vendor: Option<String>,
    right_total: Option<String>,
    overall_status: String,
    total_fields_checked: i64,
    matched_fields: i64,
    mismatched_fields: i64,
    match_percentage: f64,
    field_checks: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<VerificationRow> for VerificationRecord {
    type Error = StoreError;

    fn try_from(row: VerificationRow) -> Result<Self, Self::Error> {
        let overall_status: OverallStatus =
            row.overall_status.parse().map_err(StoreError::InvalidStatus)?;
        let field_checks = serde_json::from_str(&row.field_checks)?;

        Ok(VerificationRecord {
            id: row.id,
            left_label: row.left_label,
            right_label: row.right_label,
            left: DocumentSummary {
                document_number: row.left_document_number,
                vendor_name: row.left_vendor,
                total_amount: row.left_total,
            },
            right: DocumentSummary {
                document_number: row.right_document_number,
                vendor_name: row.right_vendor,
                total_amount: row.right_total,
            },
            result: ComparisonResult {
                overall_status,
                field_checks,
                total_fields_checked: row.total_fields_checked as usize,
                matched_fields: row.matched_fields as usize,
                mismatched_fields: row.mismatched_fields as usize,
                match_percentage: row.match_percentage,
            },
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL 存储
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// 序列取出的 id 升序排列，使第 i 条输入拿到第 i 小的 id
fn ordered_ids(mut ids: Vec<i64>, expected: usize) -> Result<Vec<i64>, sqlx::Error> {
    if ids.len() != expected {
        return Err(sqlx::Error::RowNotFound);
    }
    ids.sort_unstable();
    Ok(ids)
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 预先从序列取出 n 个 id，由调用方按输入位置分配
    async fn allocate_ids(&self, n: usize) -> Result<Vec<i64>, sqlx::Error> {
        let ids: Vec<i64> = sqlx::query_scalar(ALLOCATE_IDS)
            .bind(n as i64)
            .fetch_all(&self.pool)
            .await?;
        ordered_ids(ids, n)
    }

    /// 批量插入 (每1000条分块)，id 按输入顺序显式写入，返回这些 id
    async fn insert_batch(&self, batch: &[NewVerification]) -> Result<Vec<i64>, StoreError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut encoded = Vec::with_capacity(batch.len());
        for v in batch {
            encoded.push(serde_json::to_string(&v.result.field_checks)?);
        }

        let start = std::time::Instant::now();
        let execute = tokio::time::timeout(Duration::from_secs(INSERT_TIMEOUT_SECS), async {
            let ids = self.allocate_ids(batch.len()).await?;

            let mut query_builder = sqlx::QueryBuilder::new(
                "INSERT INTO verification_results (
                    id, left_label, right_label,
                    left_document_number, left_vendor, left_total,
                    right_document_number, right_vendor, right_total,
                    overall_status, total_fields_checked, matched_fields, mismatched_fields,
                    match_percentage, field_checks, created_at
                ) ",
            );

            query_builder.push_values(
                batch.iter().zip(&ids).zip(encoded),
                |mut b, ((v, id), checks)| {
                    b.push_bind(*id)
                        .push_bind(v.left_label.clone())
                        .push_bind(v.right_label.clone())
                        .push_bind(v.left.document_number.clone())
                        .push_bind(v.left.vendor_name.clone())
                        .push_bind(v.left.total_amount.clone())
                        .push_bind(v.right.document_number.clone())
                        .push_bind(v.right.vendor_name.clone())
                        .push_bind(v.right.total_amount.clone())
                        .push_bind(v.result.overall_status.as_str())
                        .push_bind(v.result.total_fields_checked as i64)
                        .push_bind(v.result.matched_fields as i64)
                        .push_bind(v.result.mismatched_fields as i64)
                        .push_bind(v.result.match_percentage)
                        .push_bind(checks)
                        .push_bind(v.created_at);
                },
            );

            query_builder.build().execute(&self.pool).await?;
            Ok::<_, sqlx::Error>(ids)
        })
        .await;

        match execute {
            Ok(Ok(ids)) => {
                tracing::debug!("inserted {} verification rows in {:?}", ids.len(), start.elapsed());
                Ok(ids)
            }
            Ok(Err(e)) => {
                tracing::error!("verification insert failed after {:?}: {:?}", start.elapsed(), e);
                Err(e.into())
            }
            Err(_) => {
                tracing::error!("verification insert timed out (>{}s)", INSERT_TIMEOUT_SECS);
                Err(StoreError::Timeout(INSERT_TIMEOUT_SECS))
            }
        }
    }
}

#[async_trait]
impl VerificationStore for PgStore {
    async fn save(&self, verification: NewVerification) -> Result<VerificationRecord, StoreError> {
        let ids = self.insert_batch(std::slice::from_ref(&verification)).await?;
        let id = ids
            .first()
            .copied()
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        Ok(verification.into_record(id))
    }

    async fn save_all(
        &self,
        verifications: Vec<NewVerification>,
    ) -> Result<Vec<VerificationRecord>, StoreError> {
        let mut records = Vec::with_capacity(verifications.len());
        for chunk in verifications.chunks(INSERT_CHUNK) {
            let ids = self.insert_batch(chunk).await?;
            records.extend(chunk.iter().cloned().zip(ids).map(|(v, id)| v.into_record(id)));
        }
        Ok(records)
    }

    async fn get(&self, id: i64) -> Result<Option<VerificationRecord>, StoreError> {
        let sql = format!("{} WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, VerificationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(VerificationRecord::try_from).transpose()
    }

    async fn list(
        &self,
        status: Option<OverallStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<VerificationRecord>, StoreError> {
        // LIMIT NULL 等价于不限制
        let sql = format!(
            "{} WHERE ($1::text IS NULL OR overall_status = $1) ORDER BY id DESC LIMIT $2",
            SELECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, VerificationRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .bind(limit.map(|l| l as i64))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(VerificationRecord::try_from).collect()
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM verification_results")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
