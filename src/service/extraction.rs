use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::normalizer::{normalize_amount, normalize_date, normalize_string};
use crate::error::ExtractionError;
use crate::models::{DocumentRecord, LineItem, RawValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    PurchaseOrder,
}

/// 抽取器 (视觉大模型) 返回的 JSON 结构
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtractedDocument {
    #[serde(default)]
    vendor_name: Option<RawValue>,
    #[serde(default)]
    vendor_address: Option<RawValue>,
    #[serde(default)]
    invoice_no: Option<RawValue>,
    #[serde(default)]
    po_no: Option<RawValue>,
    #[serde(default)]
    date: Option<RawValue>,
    #[serde(default)]
    due_date: Option<RawValue>,
    #[serde(default)]
    currency: Option<RawValue>,
    #[serde(default)]
    subtotal: Option<RawValue>,
    #[serde(default)]
    tax: Option<RawValue>,
    #[serde(default)]
    total_amount: Option<RawValue>,
    #[serde(default)]
    line_items: Option<Vec<LineItem>>,
    #[serde(default, rename = "taxes")]
    _taxes: Option<IgnoredAny>,
    #[serde(default)]
    invoice_type: Option<String>,
}

/// 去掉 ```json ... ``` 代码块包裹
pub fn strip_code_fence(content: &str) -> &str {
    let mut body = content.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// 解析抽取器返回内容为 DocumentRecord
pub fn parse_extractor_response(
    content: &str,
    kind: DocumentKind,
) -> Result<DocumentRecord, ExtractionError> {
    let body = strip_code_fence(content);
    if body.is_empty() {
        return Err(ExtractionError::Empty);
    }

    let extracted: ExtractedDocument = serde_json::from_str(body)?;

    if let Some(declared) = extracted.invoice_type.as_deref() {
        tracing::debug!("extractor declared document type {:?} for {:?}", declared, kind);
    }

    for (name, value) in [
        ("subtotal", &extracted.subtotal),
        ("tax", &extracted.tax),
        ("total_amount", &extracted.total_amount),
    ] {
        if let Some(raw) = value {
            if normalize_amount(Some(raw)).is_none() {
                tracing::warn!("extractor returned unparseable {} {:?}", name, raw.to_string());
            }
        }
    }

    // 发票上的 PO 号与 PO 自身编号互为交叉引用
    let document_number = match kind {
        DocumentKind::Invoice => extracted.po_no.or(extracted.invoice_no),
        DocumentKind::PurchaseOrder => extracted.po_no,
    };

    let text = |v: Option<RawValue>| normalize_string(v.as_ref()).map(RawValue::Text);
    let date = |v: Option<RawValue>| {
        normalize_string(v.as_ref())
            .and_then(|s| normalize_date(Some(&s)))
            .map(RawValue::Text)
    };

    Ok(DocumentRecord {
        vendor_name: text(extracted.vendor_name),
        vendor_address: text(extracted.vendor_address),
        document_number: text(document_number),
        date: date(extracted.date),
        due_date: date(extracted.due_date),
        currency: text(extracted.currency).or_else(|| Some(RawValue::from("USD"))),
        subtotal: extracted.subtotal,
        tax: extracted.tax,
        total_amount: extracted.total_amount,
        line_items: extracted.line_items.unwrap_or_default(),
        raw_response: Some(body.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fence(" {} "), "{}");
    }

    #[test]
    fn parses_invoice_response() {
        let content = r#"```json
{
  "vendor_name": "  Acme Corp ",
  "vendor_address": "1 Main St",
  "invoice_no": "INV-9",
  "po_no": "PO-001",
  "date": "15/01/2024",
  "due_date": null,
  "subtotal": 1000.00,
  "tax": "$100.00",
  "total_amount": "1,100.00",
  "line_items": [{"description": "Widget", "qty": 10, "unit_price": 100}],
  "taxes": [{"name": "VAT", "rate": 10}],
  "invoice_type": "invoice"
}
```"#;
        let record = parse_extractor_response(content, DocumentKind::Invoice).unwrap();
        assert_eq!(record.vendor_name, Some(RawValue::from("Acme Corp")));
        assert_eq!(record.document_number, Some(RawValue::from("PO-001")));
        assert_eq!(record.date, Some(RawValue::from("2024-01-15")));
        assert!(record.due_date.is_none());
        assert_eq!(record.currency, Some(RawValue::from("USD")));
        assert_eq!(record.tax, Some(RawValue::from("$100.00")));
        assert_eq!(record.line_items.len(), 1);
        assert!(record.raw_response.unwrap().starts_with('{'));
    }

    #[test]
    fn invoice_without_po_number_uses_invoice_number() {
        let record =
            parse_extractor_response(r#"{"invoice_no": "INV-9"}"#, DocumentKind::Invoice).unwrap();
        assert_eq!(record.document_number, Some(RawValue::from("INV-9")));

        let record =
            parse_extractor_response(r#"{"invoice_no": "INV-9"}"#, DocumentKind::PurchaseOrder)
                .unwrap();
        assert!(record.document_number.is_none());
    }

    #[test]
    fn line_item_totals_do_not_reject_the_document() {
        let content = r#"{"po_no": "PO-3", "line_items": [{"description": "Cable", "quantity": 4, "unit_price": 2.5, "total": 10}]}"#;
        let record = parse_extractor_response(content, DocumentKind::PurchaseOrder).unwrap();
        assert_eq!(record.line_items.len(), 1);
        assert_eq!(record.line_items[0].total, Some(RawValue::from(10i64)));
    }

    #[test]
    fn rejects_empty_and_unknown_keys() {
        assert!(matches!(
            parse_extractor_response("```json\n```", DocumentKind::Invoice),
            Err(ExtractionError::Empty)
        ));
        assert!(matches!(
            parse_extractor_response(r#"{"supplier": "Acme"}"#, DocumentKind::Invoice),
            Err(ExtractionError::Malformed(_))
        ));
        assert!(parse_extractor_response("not json", DocumentKind::Invoice).is_err());
    }
}
