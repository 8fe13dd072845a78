use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::document::{DocumentRecord, RawValue};
use super::result::ComparisonResult;

/// 比对请求: 一张发票 + 一张采购订单
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerificationRequest {
    #[serde(default = "default_left_label")]
    pub left_label: String,
    #[serde(default = "default_right_label")]
    pub right_label: String,
    pub invoice: DocumentRecord,
    pub purchase_order: DocumentRecord,
}

fn default_left_label() -> String {
    "invoice".to_string()
}

fn default_right_label() -> String {
    "purchase_order".to_string()
}

impl VerificationRequest {
    pub fn new(invoice: DocumentRecord, purchase_order: DocumentRecord) -> Self {
        Self {
            left_label: default_left_label(),
            right_label: default_right_label(),
            invoice,
            purchase_order,
        }
    }
}

/// 单据摘要 (历史记录与 CSV 导出使用)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_number: Option<String>,
    pub vendor_name: Option<String>,
    pub total_amount: Option<String>,
}

impl DocumentSummary {
    pub fn of(record: &DocumentRecord) -> Self {
        let text = |v: &Option<RawValue>| v.as_ref().map(|v| v.to_string().trim().to_string());
        Self {
            document_number: text(&record.document_number),
            vendor_name: text(&record.vendor_name),
            total_amount: text(&record.total_amount),
        }
    }
}

/// 待持久化的比对记录 (id 由存储分配)
#[derive(Debug, Clone)]
pub struct NewVerification {
    pub left_label: String,
    pub right_label: String,
    pub left: DocumentSummary,
    pub right: DocumentSummary,
    pub result: ComparisonResult,
    pub created_at: DateTime<Utc>,
}

impl NewVerification {
    pub fn into_record(self, id: i64) -> VerificationRecord {
        VerificationRecord {
            id,
            left_label: self.left_label,
            right_label: self.right_label,
            left: self.left,
            right: self.right,
            result: self.result,
            created_at: self.created_at,
        }
    }
}

/// 已持久化的比对记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: i64,
    pub left_label: String,
    pub right_label: String,
    pub left: DocumentSummary,
    pub right: DocumentSummary,
    pub result: ComparisonResult,
    pub created_at: DateTime<Utc>,
}

/// 处理统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationStats {
    pub total_processed: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub partial: usize,
    pub match_rate: String,
    /// field_key -> 不一致次数 (首次出现顺序)
    pub mismatch_frequency: IndexMap<String, usize>,
}
