//! CSV 导出

use invoice_po_recon::config::ToleranceConfig;
use invoice_po_recon::models::{DocumentRecord, OverallStatus, VerificationRequest};
use invoice_po_recon::service::export::{export_file_name, export_to_csv, to_csv_bytes};
use invoice_po_recon::{MemoryStore, VerificationService};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn record(value: serde_json::Value) -> DocumentRecord {
    serde_json::from_value(value).unwrap()
}

async fn sample_records() -> Vec<invoice_po_recon::models::VerificationRecord> {
    let service = VerificationService::new(Arc::new(MemoryStore::new()), ToleranceConfig::default());

    let invoice = record(json!({
        "vendor_name": "Acme, Inc.",
        "document_number": "PO-7",
        "total_amount": "250.00"
    }));
    service
        .verify(VerificationRequest::new(invoice.clone(), invoice.clone()))
        .await
        .unwrap();

    let order = record(json!({
        "vendor_name": "Acme, Inc.",
        "document_number": "PO-7",
        "total_amount": "275.00"
    }));
    service
        .verify(VerificationRequest::new(invoice, order))
        .await
        .unwrap();

    service.history(None, None).await.unwrap()
}

#[tokio::test]
async fn csv_has_header_and_one_row_per_record() {
    let records = sample_records().await;
    let bytes = to_csv_bytes(&records).unwrap();

    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 14);
    assert_eq!(&headers[0], "verification_id");
    assert_eq!(&headers[13], "mismatched_field_keys");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    // 最新在前
    assert_eq!(&rows[0][0], "2");
    assert_eq!(&rows[0][1], "partial");
    assert_eq!(&rows[0][13], "total_amount");
    assert_eq!(&rows[1][1], "matched");
    assert_eq!(&rows[1][6], "50.00");
    assert_eq!(&rows[1][8], "Acme, Inc.");
    assert_eq!(&rows[1][13], "None");
}

#[tokio::test]
async fn export_creates_directory_and_file() {
    let records = sample_records().await;
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("nested").join("exports");

    let path = export_to_csv(&records, &dir, Some(OverallStatus::Partial)).unwrap();
    assert!(path.exists());

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("verification_results_partial_"));
    assert!(name.ends_with(".csv"));

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, to_csv_bytes(&records).unwrap());
}

#[test]
fn file_name_without_status_filter() {
    let name = export_file_name(None);
    assert!(name.starts_with("verification_results_2"));
    assert!(!name.contains("matched"));
}
