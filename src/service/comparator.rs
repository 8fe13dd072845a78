//! 确定性比对器: 固定字段表 + 明细行汇总，结果与输入一一对应，从不失败。

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::line_items::compare_line_items;
use super::normalizer::{normalize_amount, normalize_date};
use super::resolver::{self, Tally, Verdict};
use crate::models::{ComparisonResult, DocumentRecord, FieldCheck, FieldKey, FieldStatus, RawValue};

/// 比对字段顺序 (决定输出顺序)
pub const COMPARED_FIELDS: [FieldKey; 8] = [
    FieldKey::VendorName,
    FieldKey::VendorAddress,
    FieldKey::DocumentNumber,
    FieldKey::Date,
    FieldKey::Currency,
    FieldKey::Subtotal,
    FieldKey::Tax,
    FieldKey::TotalAmount,
];

/// 金额 / 数量的绝对容差: 0.01
pub fn amount_tolerance() -> BigDecimal {
    BigDecimal::from(1) / BigDecimal::from(100)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonOptions {
    /// 两侧均为空的字段是否计入 matched_fields
    #[serde(default)]
    pub count_empty_matches: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Comparator {
    options: ComparisonOptions,
}

impl Comparator {
    pub fn new(options: ComparisonOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ComparisonOptions {
        self.options
    }

    pub fn compare(&self, left: &DocumentRecord, right: &DocumentRecord) -> ComparisonResult {
        let mut tally = Tally::default();
        let mut checks = Vec::with_capacity(COMPARED_FIELDS.len() + 1);

        for key in COMPARED_FIELDS {
            let (check, verdict) = compare_field(key, left.field(key), right.field(key));
            tally.record(verdict, self.options.count_empty_matches);
            checks.push(check);
        }

        if let Some(check) = compare_line_items(&left.line_items, &right.line_items) {
            tally.record(check.status.into(), self.options.count_empty_matches);
            checks.push(check);
        }

        resolver::resolve(checks, tally)
    }
}

/// 默认选项下比对两张单据
pub fn compare(left: &DocumentRecord, right: &DocumentRecord) -> ComparisonResult {
    Comparator::default().compare(left, right)
}

fn compare_field(
    key: FieldKey,
    left: Option<&RawValue>,
    right: Option<&RawValue>,
) -> (FieldCheck, Verdict) {
    let (status, diff, verdict) = match (left, right) {
        (None, None) => (FieldStatus::Match, None, Verdict::BothMissing),
        (None, Some(_)) | (Some(_), None) => (FieldStatus::Mismatch, None, Verdict::Mismatch),
        (Some(l), Some(r)) if key.is_numeric() => compare_amounts(l, r),
        (Some(l), Some(r)) => {
            let status = status_of(canonical_text(key, l) == canonical_text(key, r));
            (status, None, status.into())
        }
    };

    let check = FieldCheck::new(key, left.cloned(), right.cloned(), status, diff);
    (check, verdict)
}

fn compare_amounts(left: &RawValue, right: &RawValue) -> (FieldStatus, Option<BigDecimal>, Verdict) {
    match (normalize_amount(Some(left)), normalize_amount(Some(right))) {
        (Some(l), Some(r)) => {
            let diff = (l - r).abs();
            let status = status_of(diff <= amount_tolerance());
            (status, Some(diff), status.into())
        }
        // 任一侧无法解析: 退化为原值相等
        _ => {
            let status = status_of(left == right);
            (status, None, status.into())
        }
    }
}

/// 字符串比较口径: 日期先规范化，再去空白、转小写
fn canonical_text(key: FieldKey, value: &RawValue) -> String {
    let text = value.to_string();
    let text = if key == FieldKey::Date {
        normalize_date(Some(&text)).unwrap_or(text)
    } else {
        text
    };
    text.trim().to_lowercase()
}

fn status_of(matched: bool) -> FieldStatus {
    if matched {
        FieldStatus::Match
    } else {
        FieldStatus::Mismatch
    }
}
