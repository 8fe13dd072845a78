use chrono::Utc;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::sync::Arc;

use super::comparator::Comparator;
use super::discrepancy::DiscrepancyDetector;
use crate::config::ToleranceConfig;
use crate::db::VerificationStore;
use crate::error::StoreError;
use crate::models::{
    DiscrepancyReport, DocumentRecord, DocumentSummary, NewVerification, OverallStatus,
    VerificationRecord, VerificationRequest, VerificationStats,
};

/// 比对服务: 比对引擎 + 结果存储
pub struct VerificationService {
    store: Arc<dyn VerificationStore>,
    comparator: Comparator,
    detector: DiscrepancyDetector,
}

impl VerificationService {
    pub fn new(store: Arc<dyn VerificationStore>, tolerance: ToleranceConfig) -> Self {
        Self {
            store,
            comparator: Comparator::new(tolerance.comparison_options()),
            detector: DiscrepancyDetector::new(tolerance),
        }
    }

    fn evaluate(&self, request: &VerificationRequest) -> NewVerification {
        let result = self.comparator.compare(&request.invoice, &request.purchase_order);
        NewVerification {
            left_label: request.left_label.clone(),
            right_label: request.right_label.clone(),
            left: DocumentSummary::of(&request.invoice),
            right: DocumentSummary::of(&request.purchase_order),
            result,
            created_at: Utc::now(),
        }
    }

    /// 比对一组单据并保存结果
    pub async fn verify(&self, request: VerificationRequest) -> Result<VerificationRecord, StoreError> {
        let verification = self.evaluate(&request);
        let record = self.store.save(verification).await?;
        tracing::info!(
            "Verification {} ({} vs {}): {} - matched {}, mismatched {}, checked {}",
            record.id,
            record.left_label,
            record.right_label,
            record.result.overall_status,
            record.result.matched_fields,
            record.result.mismatched_fields,
            record.result.total_fields_checked
        );
        Ok(record)
    }

    /// 批量比对: 并行计算，按输入顺序保存
    pub async fn verify_batch(
        &self,
        requests: Vec<VerificationRequest>,
    ) -> Result<Vec<VerificationRecord>, StoreError> {
        let verifications: Vec<NewVerification> =
            requests.par_iter().map(|r| self.evaluate(r)).collect();

        let records = self.store.save_all(verifications).await?;
        let mismatched = records
            .iter()
            .filter(|r| r.result.overall_status != OverallStatus::Matched)
            .count();
        tracing::info!(
            "Batch verification done: {} pairs, {} with discrepancies",
            records.len(),
            mismatched
        );
        Ok(records)
    }

    /// 容差策略比对 (不保存)
    pub fn detect_discrepancies(&self, left: &DocumentRecord, right: &DocumentRecord) -> DiscrepancyReport {
        let report = self.detector.detect(left, right);
        tracing::debug!(
            "Discrepancy check: {}/{} passed",
            report.passed_checks,
            report.total_checks
        );
        report
    }

    pub async fn history(
        &self,
        status: Option<OverallStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<VerificationRecord>, StoreError> {
        self.store.list(status, limit).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<VerificationRecord>, StoreError> {
        self.store.get(id).await
    }

    pub async fn reset(&self) -> Result<u64, StoreError> {
        let removed = self.store.clear().await?;
        tracing::info!("Cleared {} verification results", removed);
        Ok(removed)
    }

    pub async fn statistics(&self) -> Result<VerificationStats, StoreError> {
        let records = self.store.list(None, None).await?;
        Ok(compute_stats(&records))
    }
}

pub fn compute_stats(records: &[VerificationRecord]) -> VerificationStats {
    let count = |status: OverallStatus| records.iter().filter(|r| r.result.overall_status == status).count();
    let total = records.len();
    let matched = count(OverallStatus::Matched);

    // 按时间顺序统计，保持字段首次出现的顺序
    let mut mismatch_frequency: IndexMap<String, usize> = IndexMap::new();
    for record in records.iter().rev() {
        for key in record.result.mismatched_keys() {
            *mismatch_frequency.entry(key.to_string()).or_insert(0) += 1;
        }
    }

    let match_rate = if total > 0 {
        format!("{:.2}%", matched as f64 / total as f64 * 100.0)
    } else {
        "0%".to_string()
    };

    VerificationStats {
        total_processed: total,
        matched,
        mismatched: count(OverallStatus::Mismatched),
        partial: count(OverallStatus::Partial),
        match_rate,
        mismatch_frequency,
    }
}
