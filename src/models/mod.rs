pub mod check;
pub mod discrepancy;
pub mod document;
pub mod result;
pub mod verification;

pub use check::{FieldCheck, FieldKey, FieldStatus};
pub use discrepancy::{Discrepancy, DiscrepancyField, DiscrepancyReport};
pub use document::{DocumentRecord, LineItem, RawValue};
pub use result::{ComparisonResult, OverallStatus};
pub use verification::{
    DocumentSummary, NewVerification, VerificationRecord, VerificationRequest, VerificationStats,
};
