//! 容差策略: 供应商模糊匹配、总金额百分比容差、日期天数容差。

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::NaiveDate;

use super::normalizer::{normalize_amount, normalize_string};
use crate::config::ToleranceConfig;
use crate::models::{Discrepancy, DiscrepancyField, DiscrepancyReport, DocumentRecord};

const TOTAL_CHECKS: usize = 3;

/// 容差策略使用的日期格式 (与确定性比对器的顺序不同)
const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%m/%d/%Y"];

#[derive(Debug, Clone, Default)]
pub struct DiscrepancyDetector {
    tolerance: ToleranceConfig,
}

impl DiscrepancyDetector {
    pub fn new(tolerance: ToleranceConfig) -> Self {
        Self { tolerance }
    }

    pub fn detect(&self, left: &DocumentRecord, right: &DocumentRecord) -> DiscrepancyReport {
        let mut discrepancies = Vec::new();

        let (vendor_similarity, vendor) = self.check_vendor(left, right);
        discrepancies.extend(vendor);
        discrepancies.extend(self.check_total(left, right));
        discrepancies.extend(self.check_date(left, right));

        DiscrepancyReport {
            matched: discrepancies.is_empty(),
            total_checks: TOTAL_CHECKS,
            passed_checks: TOTAL_CHECKS - discrepancies.len(),
            vendor_similarity,
            discrepancies,
        }
    }

    fn check_vendor(
        &self,
        left: &DocumentRecord,
        right: &DocumentRecord,
    ) -> (Option<f64>, Option<Discrepancy>) {
        let names = (
            present(normalize_string(left.vendor_name.as_ref())),
            present(normalize_string(right.vendor_name.as_ref())),
        );
        let threshold = self.tolerance.vendor_fuzzy_threshold;

        let similarity = match names {
            (Some(l), Some(r)) => Some(vendor_similarity(&l, &r)),
            _ => None,
        };
        if similarity.is_some_and(|s| s >= threshold) {
            return (similarity, None);
        }

        let discrepancy = Discrepancy {
            field: DiscrepancyField::Vendor,
            left: left.vendor_name.clone(),
            right: right.vendor_name.clone(),
            reason: format!("Vendor names do not match (fuzzy match < {}%)", threshold),
            difference: None,
            difference_percent: None,
            difference_days: None,
        };
        (similarity, Some(discrepancy))
    }

    fn check_total(&self, left: &DocumentRecord, right: &DocumentRecord) -> Option<Discrepancy> {
        let tolerance = self.tolerance.amount_tolerance_percent;
        let mut discrepancy = Discrepancy {
            field: DiscrepancyField::Total,
            left: left.total_amount.clone(),
            right: right.total_amount.clone(),
            reason: "Total amount missing on one or both documents".to_string(),
            difference: None,
            difference_percent: None,
            difference_days: None,
        };

        let (Some(a), Some(b)) = (
            normalize_amount(left.total_amount.as_ref()),
            normalize_amount(right.total_amount.as_ref()),
        ) else {
            return Some(discrepancy);
        };

        let (difference, percent) = amount_difference(&a, &b);
        if percent <= tolerance {
            return None;
        }

        discrepancy.reason = format!(
            "Amount difference exceeds tolerance (diff: {:.2}%, tolerance: {}%)",
            percent, tolerance
        );
        discrepancy.difference = Some(difference);
        discrepancy.difference_percent = Some(percent);
        Some(discrepancy)
    }

    fn check_date(&self, left: &DocumentRecord, right: &DocumentRecord) -> Option<Discrepancy> {
        let tolerance = self.tolerance.date_tolerance_days;
        let mut discrepancy = Discrepancy {
            field: DiscrepancyField::Date,
            left: left.date.clone(),
            right: right.date.clone(),
            reason: "Dates do not match".to_string(),
            difference: None,
            difference_percent: None,
            difference_days: None,
        };

        let (Some(l), Some(r)) = (
            present(normalize_string(left.date.as_ref())),
            present(normalize_string(right.date.as_ref())),
        ) else {
            return Some(discrepancy);
        };

        match (parse_date(&l), parse_date(&r)) {
            (Some(dl), Some(dr)) => {
                let days = (dl - dr).num_days().abs();
                if days <= tolerance {
                    return None;
                }
                discrepancy.reason = format!("Dates do not match (diff: {} days)", days);
                discrepancy.difference_days = Some(days);
                Some(discrepancy)
            }
            // 无法解析时退化为字符串精确比较
            _ if l == r => None,
            _ => Some(discrepancy),
        }
    }
}

/// 供应商名称相似度 (0-100，取整)：2 * 匹配字符数 / 两者总长度
pub fn vendor_similarity(left: &str, right: &str) -> f64 {
    let a: Vec<char> = left.to_lowercase().chars().collect();
    let b: Vec<char> = right.to_lowercase().chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    (200.0 * matching_characters(&a, &b) as f64 / total as f64).round()
}

/// 递归取最长公共子串，累计两侧所有匹配块的长度
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, (alo, ahi), (blo, bhi));
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// 区间内最长公共子串 (起点, 起点, 长度)；等长时取 a 中最靠前者
fn longest_match(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best) = (alo, blo, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for i in alo..ahi {
        let mut current = vec![0usize; b.len() + 1];
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j] + 1;
                current[j + 1] = k;
                if k > best {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best = k;
                }
            }
        }
        prev = current;
    }
    (best_i, best_j, best)
}

/// 返回 (绝对差, 相对两者均值的百分比)；均值不为正时百分比记 0
pub fn amount_difference(a: &BigDecimal, b: &BigDecimal) -> (BigDecimal, f64) {
    let difference = (a - b).abs();
    let average = (a + b) / BigDecimal::from(2);
    if average <= BigDecimal::zero() {
        return (difference, 0.0);
    }
    let percent = (&difference / &average * BigDecimal::from(100))
        .to_f64()
        .unwrap_or(f64::INFINITY);
    (difference, percent)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn doc(vendor: &str, total: &str, date: &str) -> DocumentRecord {
        DocumentRecord {
            vendor_name: Some(vendor.into()),
            total_amount: Some(total.into()),
            date: Some(date.into()),
            ..DocumentRecord::default()
        }
    }

    #[test]
    fn everything_within_tolerance() {
        let detector = DiscrepancyDetector::default();
        let report = detector.detect(
            &doc("Acme Corporation", "1000.00", "15/01/2024"),
            &doc("ACME Corporation.", "1004.00", "2024-01-17"),
        );
        assert!(report.matched, "{:?}", report.discrepancies);
        assert_eq!(report.passed_checks, 3);
        assert!(report.vendor_similarity.unwrap() >= 85.0);
    }

    #[test]
    fn vendor_below_threshold() {
        let detector = DiscrepancyDetector::default();
        let report = detector.detect(
            &doc("Acme Corporation", "1000", "2024-01-15"),
            &doc("Globex Industries", "1000", "2024-01-15"),
        );
        assert!(!report.matched);
        assert_eq!(report.passed_checks, 2);
        assert!(report.find(DiscrepancyField::Vendor).is_some());
    }

    #[test]
    fn vendor_similarity_scores() {
        assert_eq!(vendor_similarity("globex llc", "globex, llc."), 91.0);
        assert_eq!(vendor_similarity("Acme Corp", "ACME CORP."), 95.0);
        assert_eq!(vendor_similarity("abc traders pvt ltd", "abc traders private limited"), 83.0);
        assert_eq!(vendor_similarity("acme", "acme"), 100.0);
        assert_eq!(vendor_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn vendor_near_threshold_matches() {
        let detector = DiscrepancyDetector::default();
        let report = detector.detect(
            &doc("Globex LLC", "10", "2024-01-15"),
            &doc("Globex, LLC.", "10", "2024-01-15"),
        );
        assert!(report.matched, "{:?}", report.discrepancies);
        assert_eq!(report.vendor_similarity, Some(91.0));
    }

    #[test]
    fn missing_vendor_is_a_discrepancy() {
        let detector = DiscrepancyDetector::default();
        let mut left = doc("Acme", "10", "2024-01-15");
        left.vendor_name = Some("   ".into());
        let report = detector.detect(&left, &doc("Acme", "10", "2024-01-15"));
        assert!(report.vendor_similarity.is_none());
        assert!(report.find(DiscrepancyField::Vendor).is_some());
    }

    #[test]
    fn total_percentage_tolerance() {
        let detector = DiscrepancyDetector::default();
        let report = detector.detect(
            &doc("Acme", "1000", "2024-01-15"),
            &doc("Acme", "1010", "2024-01-15"),
        );
        let total = report.find(DiscrepancyField::Total).unwrap();
        assert_eq!(total.difference, Some(BigDecimal::from(10)));
        assert!(total.difference_percent.unwrap() > 0.99 && total.difference_percent.unwrap() < 1.0);
    }

    #[test]
    fn zero_average_counts_as_match() {
        let (diff, percent) =
            amount_difference(&BigDecimal::from_str("-5").unwrap(), &BigDecimal::from(5));
        assert_eq!(diff, BigDecimal::from(10));
        assert_eq!(percent, 0.0);
    }

    #[test]
    fn date_window_and_string_fallback() {
        let detector = DiscrepancyDetector::new(ToleranceConfig {
            date_tolerance_days: 1,
            ..ToleranceConfig::default()
        });
        let report = detector.detect(
            &doc("Acme", "10", "2024-01-15"),
            &doc("Acme", "10", "2024-01-18"),
        );
        assert_eq!(report.find(DiscrepancyField::Date).unwrap().difference_days, Some(3));

        let report = detector.detect(&doc("Acme", "10", "Q1 2024"), &doc("Acme", "10", "Q1 2024"));
        assert!(report.matched);

        let report = detector.detect(&doc("Acme", "10", "Q1 2024"), &doc("Acme", "10", "Q2 2024"));
        assert!(report.find(DiscrepancyField::Date).unwrap().difference_days.is_none());
    }
}
