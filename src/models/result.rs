use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::check::FieldCheck;

/// 整体结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Matched,
    Mismatched,
    Partial,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Matched => "matched",
            OverallStatus::Mismatched => "mismatched",
            OverallStatus::Partial => "partial",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "matched" => Ok(OverallStatus::Matched),
            "mismatched" => Ok(OverallStatus::Mismatched),
            "partial" => Ok(OverallStatus::Partial),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// 一次比对的完整结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub overall_status: OverallStatus,
    pub field_checks: Vec<FieldCheck>,
    pub total_fields_checked: usize,
    pub matched_fields: usize,
    pub mismatched_fields: usize,
    pub match_percentage: f64,
}

impl ComparisonResult {
    pub fn mismatched_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.field_checks
            .iter()
            .filter(|c| !c.is_match())
            .map(|c| c.field_key.as_str())
    }
}
