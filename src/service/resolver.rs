use crate::models::{ComparisonResult, FieldCheck, FieldStatus, OverallStatus};

/// 单字段判定 (BothMissing: 两侧均为空)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
    BothMissing,
}

impl From<FieldStatus> for Verdict {
    fn from(status: FieldStatus) -> Self {
        match status {
            FieldStatus::Match => Verdict::Match,
            FieldStatus::Mismatch => Verdict::Mismatch,
        }
    }
}

/// 比对过程中累计的计数器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub matched: usize,
    pub mismatched: usize,
}

impl Tally {
    /// count_empty_matches 为 false 时，两侧均空的字段不计入任一计数器
    pub fn record(&mut self, verdict: Verdict, count_empty_matches: bool) {
        match verdict {
            Verdict::Match => self.matched += 1,
            Verdict::Mismatch => self.mismatched += 1,
            Verdict::BothMissing if count_empty_matches => self.matched += 1,
            Verdict::BothMissing => {}
        }
    }
}

pub fn overall_status(tally: Tally) -> OverallStatus {
    if tally.mismatched == 0 {
        OverallStatus::Matched
    } else if tally.matched == 0 {
        OverallStatus::Mismatched
    } else {
        OverallStatus::Partial
    }
}

pub fn match_percentage(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    matched as f64 / total as f64 * 100.0
}

/// 汇总检查项，得出整体结论
pub fn resolve(field_checks: Vec<FieldCheck>, tally: Tally) -> ComparisonResult {
    let total = field_checks.len();
    ComparisonResult {
        overall_status: overall_status(tally),
        total_fields_checked: total,
        matched_fields: tally.matched,
        mismatched_fields: tally.mismatched,
        match_percentage: match_percentage(tally.matched, total),
        field_checks,
    }
}
