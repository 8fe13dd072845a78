use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::document::RawValue;

/// 参与比对的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    VendorName,
    VendorAddress,
    DocumentNumber,
    Date,
    Currency,
    Subtotal,
    Tax,
    TotalAmount,
    LineItems,
}

impl FieldKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::VendorName => "vendor_name",
            FieldKey::VendorAddress => "vendor_address",
            FieldKey::DocumentNumber => "document_number",
            FieldKey::Date => "date",
            FieldKey::Currency => "currency",
            FieldKey::Subtotal => "subtotal",
            FieldKey::Tax => "tax",
            FieldKey::TotalAmount => "total_amount",
            FieldKey::LineItems => "line_items",
        }
    }

    /// 展示名称
    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::VendorName => "Vendor Name",
            FieldKey::VendorAddress => "Vendor Address",
            FieldKey::DocumentNumber => "PO Number",
            FieldKey::Date => "Date",
            FieldKey::Currency => "Currency",
            FieldKey::Subtotal => "Subtotal",
            FieldKey::Tax => "Tax",
            FieldKey::TotalAmount => "Total Amount",
            FieldKey::LineItems => "Line Items",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKey::Subtotal | FieldKey::Tax | FieldKey::TotalAmount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Match,
    Mismatch,
}

/// 单字段比对结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCheck {
    pub field_label: String,
    pub field_key: FieldKey,
    pub left_value: Option<RawValue>,
    pub right_value: Option<RawValue>,
    pub status: FieldStatus,
    pub numeric_difference: Option<BigDecimal>,
}

impl FieldCheck {
    pub fn new(
        key: FieldKey,
        left_value: Option<RawValue>,
        right_value: Option<RawValue>,
        status: FieldStatus,
        numeric_difference: Option<BigDecimal>,
    ) -> Self {
        Self {
            field_label: key.label().to_string(),
            field_key: key,
            left_value,
            right_value,
            status,
            numeric_difference,
        }
    }

    pub fn is_match(&self) -> bool {
        self.status == FieldStatus::Match
    }
}
