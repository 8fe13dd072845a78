use chrono::Local;
use csv::Writer;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::models::{OverallStatus, VerificationRecord};

const HEADER: [&str; 14] = [
    "verification_id",
    "verification_status",
    "verification_date",
    "matched_fields",
    "mismatched_fields",
    "total_fields_checked",
    "match_percentage",
    "left_document_number",
    "left_vendor",
    "left_total",
    "right_document_number",
    "right_vendor",
    "right_total",
    "mismatched_field_keys",
];

fn opt(val: &Option<String>) -> String {
    val.clone().unwrap_or_default()
}

/// 写出比对结果 CSV
pub fn write_csv<W: Write>(records: &[VerificationRecord], out: W) -> Result<(), ExportError> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(HEADER)?;

    for record in records {
        let result = &record.result;
        let mismatched: Vec<&str> = result.mismatched_keys().collect();
        let mismatched = if mismatched.is_empty() {
            "None".to_string()
        } else {
            mismatched.join(";")
        };

        writer.write_record(&[
            record.id.to_string(),
            result.overall_status.to_string(),
            record.created_at.to_rfc3339(),
            result.matched_fields.to_string(),
            result.mismatched_fields.to_string(),
            result.total_fields_checked.to_string(),
            format!("{:.2}", result.match_percentage),
            opt(&record.left.document_number),
            opt(&record.left.vendor_name),
            opt(&record.left.total_amount),
            opt(&record.right.document_number),
            opt(&record.right.vendor_name),
            opt(&record.right.total_amount),
            mismatched,
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(records: &[VerificationRecord]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(buf)
}

/// verification_results[_<status>]_<时间戳>.csv
pub fn export_file_name(status: Option<OverallStatus>) -> String {
    let suffix = status.map(|s| format!("_{}", s)).unwrap_or_default();
    format!(
        "verification_results{}_{}.csv",
        suffix,
        Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// 导出到目录 (不存在则创建)，返回文件路径
pub fn export_to_csv(
    records: &[VerificationRecord],
    dir: &Path,
    status: Option<OverallStatus>,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(status));
    let file = fs::File::create(&path)?;
    write_csv(records, file)?;
    tracing::info!("Exported {} verification results to {}", records.len(), path.display());
    Ok(path)
}
