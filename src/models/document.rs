use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::check::FieldKey;

/// 抽取器输出的原始字段值 (保留原始表示，供精确比较回退使用)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    /// 仅由代码构造，反序列化时字符串总是落在 Text
    Decimal(BigDecimal),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Decimal(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<BigDecimal> for RawValue {
    fn from(value: BigDecimal) -> Self {
        RawValue::Decimal(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value.into())
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

/// 明细行 (无独立标识，仅按位置区分)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineItem {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "qty")]
    pub quantity: Option<RawValue>,
    #[serde(default)]
    pub unit_price: Option<RawValue>,
    /// 行金额 (仅保留，不参与比对)
    #[serde(default, alias = "amount", skip_serializing_if = "Option::is_none")]
    pub total: Option<RawValue>,
}

/// 发票 / 采购订单的结构化记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentRecord {
    #[serde(default)]
    pub vendor_name: Option<RawValue>,
    #[serde(default)]
    pub vendor_address: Option<RawValue>,
    /// 交叉引用单号 (发票上的 PO 号 / PO 自身编号)
    #[serde(default, alias = "po_no")]
    pub document_number: Option<RawValue>,
    #[serde(default)]
    pub date: Option<RawValue>,
    #[serde(default)]
    pub due_date: Option<RawValue>,
    #[serde(default = "default_currency")]
    pub currency: Option<RawValue>,
    #[serde(default)]
    pub subtotal: Option<RawValue>,
    #[serde(default)]
    pub tax: Option<RawValue>,
    #[serde(default)]
    pub total_amount: Option<RawValue>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

fn default_currency() -> Option<RawValue> {
    Some(RawValue::from("USD"))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<LineItem>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for DocumentRecord {
    fn default() -> Self {
        Self {
            vendor_name: None,
            vendor_address: None,
            document_number: None,
            date: None,
            due_date: None,
            currency: default_currency(),
            subtotal: None,
            tax: None,
            total_amount: None,
            line_items: Vec::new(),
            raw_response: None,
        }
    }
}

impl DocumentRecord {
    /// 按字段键取值 (line_items 不是标量字段，返回 None)
    pub fn field(&self, key: FieldKey) -> Option<&RawValue> {
        match key {
            FieldKey::VendorName => self.vendor_name.as_ref(),
            FieldKey::VendorAddress => self.vendor_address.as_ref(),
            FieldKey::DocumentNumber => self.document_number.as_ref(),
            FieldKey::Date => self.date.as_ref(),
            FieldKey::Currency => self.currency.as_ref(),
            FieldKey::Subtotal => self.subtotal.as_ref(),
            FieldKey::Tax => self.tax.as_ref(),
            FieldKey::TotalAmount => self.total_amount.as_ref(),
            FieldKey::LineItems => None,
        }
    }
}
