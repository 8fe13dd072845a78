use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::document::RawValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscrepancyField {
    Vendor,
    Total,
    Date,
}

/// 容差策略下的单项差异
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub field: DiscrepancyField,
    pub left: Option<RawValue>,
    pub right: Option<RawValue>,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference_days: Option<i64>,
}

/// 容差策略比对报告 (供应商 / 总金额 / 日期 三项)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyReport {
    pub matched: bool,
    pub total_checks: usize,
    pub passed_checks: usize,
    pub vendor_similarity: Option<f64>,
    pub discrepancies: Vec<Discrepancy>,
}

impl DiscrepancyReport {
    pub fn find(&self, field: DiscrepancyField) -> Option<&Discrepancy> {
        self.discrepancies.iter().find(|d| d.field == field)
    }
}
