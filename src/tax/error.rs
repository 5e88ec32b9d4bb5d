use rust_decimal::Decimal;

use super::declaration::{EntityType, MAX_AMOUNT};
use super::year::AssessmentYear;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaxError {
    #[error("tax configuration for assessment year {0} not found")]
    ConfigurationMissing(AssessmentYear),
    #[error("invalid assessment year: {0} (expected e.g. 2024-25)")]
    InvalidAssessmentYear(String),
    #[error("regime comparison unavailable for {entity:?} in assessment year {year}")]
    RegimeComparisonUnavailable {
        entity: EntityType,
        year: AssessmentYear,
    },
    #[error("{field} amount {amount} exceeds the supported maximum of {}", MAX_AMOUNT)]
    AmountOutOfRange { field: String, amount: Decimal },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
