use bigdecimal::{BigDecimal, Zero};

use super::comparator::amount_tolerance;
use super::normalizer::normalize_amount;
use crate::models::{FieldCheck, FieldKey, FieldStatus, LineItem, RawValue};

/// 明细行汇总比对: 只比较行数与数量合计，忽略单价与描述。
/// 两侧均无明细时返回 None (不产生检查项)。
pub fn compare_line_items(left: &[LineItem], right: &[LineItem]) -> Option<FieldCheck> {
    if left.is_empty() && right.is_empty() {
        return None;
    }

    if left.len() != right.len() {
        return Some(FieldCheck::new(
            FieldKey::LineItems,
            Some(count_label(left.len())),
            Some(count_label(right.len())),
            FieldStatus::Mismatch,
            None,
        ));
    }

    let left_qty = total_quantity(left);
    let right_qty = total_quantity(right);
    let diff = (&left_qty - &right_qty).abs();

    if diff <= amount_tolerance() {
        return Some(FieldCheck::new(
            FieldKey::LineItems,
            Some(count_label(left.len())),
            Some(count_label(right.len())),
            FieldStatus::Match,
            None,
        ));
    }

    Some(FieldCheck::new(
        FieldKey::LineItems,
        Some(RawValue::Text(format!("{} items, total qty: {}", left.len(), left_qty))),
        Some(RawValue::Text(format!("{} items, total qty: {}", right.len(), right_qty))),
        FieldStatus::Mismatch,
        Some(diff),
    ))
}

/// 数量合计 (缺失或无法解析的数量按 0 计)
pub fn total_quantity(items: &[LineItem]) -> BigDecimal {
    items
        .iter()
        .filter_map(|item| normalize_amount(item.quantity.as_ref()))
        .fold(BigDecimal::zero(), |acc, q| acc + q)
}

fn count_label(n: usize) -> RawValue {
    RawValue::Text(format!("{} items", n))
}
