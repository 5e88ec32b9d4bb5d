pub mod aggregate;
pub mod business;
pub mod compute;
pub mod config;
pub mod credit;
pub mod declaration;
pub mod error;
pub mod house_property;
pub mod inclusion;
pub mod interest;
pub mod international;
pub mod rates;
pub mod setoff;
pub mod trust;
pub mod warnings;
pub mod year;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub use compute::{compare_regimes, compute, ComputationResult, RegimeComparison};
pub use config::{YearConfig, YearConfiguration};
pub use declaration::{read_declaration_json, Declaration, EntityType, Regime, Residency};
pub use error::TaxError;
pub use setoff::{Head, LossSource, SetOffEntry};
pub use warnings::Warning;
pub use year::AssessmentYear;

/// Round to the nearest rupee, halves up
pub fn round_half_up(amount: Decimal) -> Decimal {
    (amount + dec!(0.5)).floor()
}
