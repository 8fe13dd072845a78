//! 端到端比对场景: 从 JSON 单据到 ComparisonResult

use invoice_po_recon::compare;
use invoice_po_recon::models::{
    DocumentRecord, FieldKey, FieldStatus, OverallStatus, RawValue,
};
use invoice_po_recon::service::{Comparator, ComparisonOptions};
use serde_json::json;

fn record(value: serde_json::Value) -> DocumentRecord {
    serde_json::from_value(value).unwrap()
}

fn invoice() -> DocumentRecord {
    record(json!({
        "vendor_name": "Acme Corp",
        "vendor_address": "1 Main St, Springfield",
        "document_number": "PO-2024-001",
        "date": "2024-01-15",
        "currency": "USD",
        "subtotal": "$1,000.00",
        "tax": 100,
        "total_amount": "1100.00",
        "line_items": [
            {"description": "Widget", "quantity": 10, "unit_price": 50},
            {"description": "Gadget", "quantity": "5", "unit_price": 100}
        ]
    }))
}

fn purchase_order() -> DocumentRecord {
    record(json!({
        "vendor_name": "  ACME CORP ",
        "vendor_address": "1 main st, springfield",
        "po_no": "PO-2024-001",
        "date": "15/01/2024",
        "currency": "usd",
        "subtotal": 1000,
        "tax": "100.00",
        "total_amount": 1100.004,
        "line_items": [
            {"description": "Widget (blue)", "qty": 10, "unit_price": 55},
            {"description": "Gadget", "quantity": 5.0}
        ]
    }))
}

fn status_of(result: &invoice_po_recon::models::ComparisonResult, key: FieldKey) -> Option<FieldStatus> {
    result
        .field_checks
        .iter()
        .find(|c| c.field_key == key)
        .map(|c| c.status)
}

#[test]
fn equivalent_documents_match_after_normalization() {
    let result = compare(&invoice(), &purchase_order());

    assert_eq!(result.overall_status, OverallStatus::Matched);
    assert_eq!(result.total_fields_checked, 9);
    assert_eq!(result.matched_fields, 9);
    assert_eq!(result.mismatched_fields, 0);
    assert_eq!(result.match_percentage, 100.0);

    let keys: Vec<FieldKey> = result.field_checks.iter().map(|c| c.field_key).collect();
    assert_eq!(
        keys,
        vec![
            FieldKey::VendorName,
            FieldKey::VendorAddress,
            FieldKey::DocumentNumber,
            FieldKey::Date,
            FieldKey::Currency,
            FieldKey::Subtotal,
            FieldKey::Tax,
            FieldKey::TotalAmount,
            FieldKey::LineItems,
        ]
    );
}

#[test]
fn amount_outside_tolerance_is_partial() {
    let mut po = purchase_order();
    po.total_amount = Some(RawValue::from("1,150.00"));

    let result = compare(&invoice(), &po);
    assert_eq!(result.overall_status, OverallStatus::Partial);
    assert_eq!(result.mismatched_fields, 1);
    assert_eq!(status_of(&result, FieldKey::TotalAmount), Some(FieldStatus::Mismatch));

    let total = result
        .field_checks
        .iter()
        .find(|c| c.field_key == FieldKey::TotalAmount)
        .unwrap();
    assert_eq!(total.numeric_difference.as_ref().map(|d| d.to_string()), Some("50.00".to_string()));
}

#[test]
fn every_field_different_is_mismatched() {
    let left = record(json!({
        "vendor_name": "Acme",
        "document_number": "PO-1",
        "date": "2024-01-15",
        "currency": "USD",
        "total_amount": 10
    }));
    let right = record(json!({
        "vendor_name": "Globex",
        "document_number": "PO-2",
        "date": "2024-02-15",
        "currency": "EUR",
        "total_amount": 20
    }));

    let result = compare(&left, &right);
    assert_eq!(result.overall_status, OverallStatus::Mismatched);
    assert_eq!(result.matched_fields, 0);
    assert_eq!(result.mismatched_fields, 5);
    assert_eq!(result.total_fields_checked, 8);
    assert_eq!(result.match_percentage, 0.0);
}

#[test]
fn field_present_on_one_side_only_is_a_mismatch() {
    let mut po = purchase_order();
    po.tax = None;

    let result = compare(&invoice(), &po);
    assert_eq!(status_of(&result, FieldKey::Tax), Some(FieldStatus::Mismatch));
    assert_eq!(result.overall_status, OverallStatus::Partial);
}

#[test]
fn both_missing_fields_are_reported_but_not_counted() {
    let left = record(json!({"vendor_name": "Acme"}));
    let right = record(json!({"vendor_name": "acme"}));

    let result = compare(&left, &right);
    assert_eq!(result.total_fields_checked, 8);
    // vendor_name + 默认币种 USD
    assert_eq!(result.matched_fields, 2);
    assert_eq!(result.mismatched_fields, 0);
    assert_eq!(result.overall_status, OverallStatus::Matched);
    assert_eq!(result.match_percentage, 25.0);
    assert_eq!(status_of(&result, FieldKey::Subtotal), Some(FieldStatus::Match));
}

#[test]
fn counting_empty_matches_is_opt_in() {
    let left = record(json!({"vendor_name": "Acme"}));
    let right = record(json!({"vendor_name": "Acme"}));

    let comparator = Comparator::new(ComparisonOptions {
        count_empty_matches: true,
    });
    let result = comparator.compare(&left, &right);
    assert_eq!(result.matched_fields, 8);
    assert_eq!(result.match_percentage, 100.0);
}

#[test]
fn unparseable_amounts_fall_back_to_raw_equality() {
    let left = record(json!({"subtotal": "TBD"}));
    let same = record(json!({"subtotal": "TBD"}));
    let other = record(json!({"subtotal": "100"}));

    let result = compare(&left, &same);
    assert_eq!(status_of(&result, FieldKey::Subtotal), Some(FieldStatus::Match));

    let result = compare(&left, &other);
    assert_eq!(status_of(&result, FieldKey::Subtotal), Some(FieldStatus::Mismatch));
    assert_eq!(result.mismatched_fields, 1);
}

#[test]
fn line_item_count_and_quantity_are_compared() {
    let mut po = purchase_order();
    po.line_items.pop();
    let result = compare(&invoice(), &po);
    let check = result
        .field_checks
        .iter()
        .find(|c| c.field_key == FieldKey::LineItems)
        .unwrap();
    assert_eq!(check.status, FieldStatus::Mismatch);
    assert_eq!(check.left_value, Some(RawValue::from("2 items")));
    assert_eq!(check.right_value, Some(RawValue::from("1 items")));

    let mut po = purchase_order();
    po.line_items[1].quantity = Some(RawValue::from(7i64));
    let result = compare(&invoice(), &po);
    let check = result
        .field_checks
        .iter()
        .find(|c| c.field_key == FieldKey::LineItems)
        .unwrap();
    assert_eq!(check.status, FieldStatus::Mismatch);
    assert_eq!(check.left_value, Some(RawValue::from("2 items, total qty: 15")));
}

#[test]
fn comparison_is_idempotent() {
    let first = compare(&invoice(), &purchase_order());
    let second = compare(&invoice(), &purchase_order());
    assert_eq!(first, second);
}

#[test]
fn unknown_document_field_is_rejected() {
    let parsed = serde_json::from_value::<DocumentRecord>(json!({"vendor": "Acme"}));
    assert!(parsed.is_err());
}
