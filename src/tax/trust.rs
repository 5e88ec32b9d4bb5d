use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::declaration::{Residency, TrustReceipts};
use super::inclusion::{taxable_value, IncomeKind};

/// A trust that lost its exemption, taxed as an AOP at the maximum marginal rate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrustComputation {
    #[schemars(with = "f64")]
    pub total_income_before_exemption: Decimal,
    #[serde(rename = "disallowed_12a")]
    #[schemars(with = "f64")]
    pub disallowed_12a: Decimal,
    #[serde(rename = "disallowed_10_23c")]
    #[schemars(with = "f64")]
    pub disallowed_10_23c: Decimal,
    #[schemars(with = "f64")]
    pub taxable_income: Decimal,
    #[schemars(with = "f64")]
    pub applicable_rate: Decimal,
    pub violation_flags: Vec<String>,
    #[schemars(with = "f64")]
    pub tax: Decimal,
}

pub fn trust_computation(
    receipts: &TrustReceipts,
    total_income: Decimal,
    residency: Residency,
    mmr: Decimal,
) -> TrustComputation {
    let disallowed_12a = taxable_value(&receipts.disallowed_12a, residency, IncomeKind::Other);
    let disallowed_10_23c =
        taxable_value(&receipts.disallowed_10_23c, residency, IncomeKind::Other);
    let taxable_income = total_income + disallowed_12a + disallowed_10_23c;

    let mut violation_flags = Vec::new();
    if disallowed_12a > Decimal::ZERO {
        violation_flags.push(format!(
            "Receipts disallowed u/s 12A/12AA/12AB: {:.2}",
            disallowed_12a
        ));
    }
    if disallowed_10_23c > Decimal::ZERO {
        violation_flags.push(format!(
            "Receipts disallowed u/s 10(23C): {:.2}",
            disallowed_10_23c
        ));
    }

    TrustComputation {
        total_income_before_exemption: total_income,
        disallowed_12a,
        disallowed_10_23c,
        taxable_income,
        applicable_rate: mmr,
        violation_flags,
        tax: taxable_income * mmr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::declaration::LineItem;
    use rust_decimal_macros::dec;

    #[test]
    fn disallowed_receipts_taxed_at_mmr() {
        let receipts = TrustReceipts {
            disallowed_12a: vec![LineItem::india(dec!(400000))],
            disallowed_10_23c: Vec::new(),
        };
        let trust = trust_computation(
            &receipts,
            dec!(600000),
            Residency::ResidentOrdinary,
            dec!(0.30),
        );
        assert_eq!(trust.taxable_income, dec!(1000000));
        assert_eq!(trust.tax, dec!(300000));
        assert_eq!(
            trust.violation_flags,
            vec!["Receipts disallowed u/s 12A/12AA/12AB: 400000.00".to_string()]
        );
    }

    #[test]
    fn no_flags_without_disallowance() {
        let trust = trust_computation(
            &TrustReceipts::default(),
            dec!(100000),
            Residency::ResidentOrdinary,
            dec!(0.30),
        );
        assert!(trust.violation_flags.is_empty());
        assert_eq!(trust.tax, dec!(30000));
    }
}
