pub mod comparator;
pub mod discrepancy;
pub mod export;
pub mod extraction;
pub mod line_items;
pub mod normalizer;
pub mod resolver;
pub mod verifier;

pub use comparator::{compare, Comparator, ComparisonOptions};
pub use discrepancy::DiscrepancyDetector;
pub use extraction::{parse_extractor_response, DocumentKind};
pub use normalizer::{normalize_amount, normalize_date, normalize_string};
pub use verifier::VerificationService;
