//! 字段规范化: 金额、字符串、日期。
//!
//! 全部为纯函数，无法解析的输入降级为 None 或原值，从不报错。

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use std::str::FromStr;

use crate::models::RawValue;

const CURRENCY_SYMBOLS: [char; 4] = ['$', '₹', '€', '£'];

/// 金额允许的最大小数位数 (绝对值)；超出视为无法解析，避免超大指数导致的重标度
const MAX_AMOUNT_SCALE: i64 = 64;

/// 日期格式 (按顺序尝试，首个成功者生效)
enum DatePattern {
    Date(&'static str),
    DateTime(&'static str),
}

const DATE_PATTERNS: [DatePattern; 6] = [
    DatePattern::Date("%Y-%m-%d"),
    DatePattern::Date("%d/%m/%Y"),
    DatePattern::Date("%m/%d/%Y"),
    DatePattern::DateTime("%Y-%m-%dT%H:%M:%S"),
    DatePattern::Date("%d-%m-%Y"),
    DatePattern::Date("%m-%d-%Y"),
];

impl DatePattern {
    fn to_iso(&self, input: &str) -> Option<String> {
        match self {
            DatePattern::Date(fmt) => NaiveDate::parse_from_str(input, fmt)
                .ok()
                .map(|d| d.format("%Y-%m-%d").to_string()),
            DatePattern::DateTime(fmt) => NaiveDateTime::parse_from_str(input, fmt)
                .ok()
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

/// 金额规范化: 去除货币符号、千分位逗号、首尾空白后解析
pub fn normalize_amount(value: Option<&RawValue>) -> Option<BigDecimal> {
    let amount = match value? {
        RawValue::Decimal(d) => Some(d.clone()),
        RawValue::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        RawValue::Text(s) => parse_amount(s),
        RawValue::Bool(_) => None,
    };
    amount.filter(within_scale)
}

pub fn parse_amount(text: &str) -> Option<BigDecimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect();
    BigDecimal::from_str(cleaned.trim())
        .ok()
        .filter(within_scale)
}

fn within_scale(amount: &BigDecimal) -> bool {
    let (_, scale) = amount.as_bigint_and_exponent();
    scale.abs() <= MAX_AMOUNT_SCALE
}

/// 字符串规范化: 非字符串值先转字符串，空串保留为空串
pub fn normalize_string(value: Option<&RawValue>) -> Option<String> {
    value.map(|v| v.to_string().trim().to_string())
}

/// 日期规范化为 ISO-8601；全部格式失败时原样返回
pub fn normalize_date(value: Option<&str>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    DATE_PATTERNS
        .iter()
        .find_map(|p| p.to_iso(trimmed))
        .or_else(|| Some(value.to_string()))
}
