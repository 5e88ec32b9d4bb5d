use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::international::{ClassifiedForeignItem, ForeignRate};

/// A foreign item with the Indian tax charged on it
#[derive(Debug, Clone, PartialEq)]
pub struct TaxedForeignItem {
    pub item: ClassifiedForeignItem,
    pub applicable_rate: Decimal,
    pub indian_tax: Decimal,
}

/// Itemized foreign tax credit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignItemResult {
    pub id: String,
    pub country: String,
    #[schemars(with = "f64")]
    pub taxable_amount: Decimal,
    #[schemars(with = "f64")]
    pub applicable_rate: Decimal,
    #[schemars(with = "f64")]
    pub indian_tax: Decimal,
    /// Relief under a tax treaty (s.90/90A)
    #[serde(rename = "ftc_90_90a")]
    #[schemars(with = "f64")]
    pub ftc_90_90a: Decimal,
    /// Unilateral relief (s.91)
    #[serde(rename = "ftc_91")]
    #[schemars(with = "f64")]
    pub ftc_91: Decimal,
    #[schemars(with = "f64")]
    pub total_ftc: Decimal,
    #[schemars(with = "f64")]
    pub net_tax: Decimal,
}

/// Indian tax per item: special rate, or the average rate on normal income,
/// capped at the treaty rate when form 67 was filed under a treaty
pub fn tax_on_foreign_income(
    items: &[ClassifiedForeignItem],
    average_normal_rate: Decimal,
) -> Vec<TaxedForeignItem> {
    items
        .iter()
        .map(|item| {
            let mut rate = match item.rate {
                ForeignRate::Special(rate) => rate,
                ForeignRate::Slab => average_normal_rate,
            };
            if item.form67_filed && item.dtaa_applicable {
                if let Some(dtaa_rate) = item.dtaa_rate {
                    rate = rate.min(dtaa_rate);
                }
            }
            TaxedForeignItem {
                item: item.clone(),
                applicable_rate: rate,
                indian_tax: item.taxable_amount * rate,
            }
        })
        .collect()
}

/// Credit for tax paid abroad. Nothing is allowed without form 67.
pub fn foreign_tax_credit(items: &[TaxedForeignItem], average_rate: Decimal) -> Vec<ForeignItemResult> {
    items
        .iter()
        .map(|taxed| {
            let item = &taxed.item;
            let (ftc_90_90a, ftc_91) = match (item.form67_filed, item.dtaa_applicable) {
                (false, _) => (Decimal::ZERO, Decimal::ZERO),
                (true, true) => (item.tax_paid.min(taxed.indian_tax), Decimal::ZERO),
                (true, false) => (
                    Decimal::ZERO,
                    item.tax_paid.min(item.taxable_amount * average_rate),
                ),
            };
            let total_ftc = ftc_90_90a + ftc_91;
            log::debug!(
                "FTC {} ({}): indian tax={}, paid={}, allowed={}",
                item.id,
                item.country,
                taxed.indian_tax,
                item.tax_paid,
                total_ftc
            );
            ForeignItemResult {
                id: item.id.clone(),
                country: item.country.clone(),
                taxable_amount: item.taxable_amount,
                applicable_rate: taxed.applicable_rate,
                indian_tax: taxed.indian_tax,
                ftc_90_90a,
                ftc_91,
                total_ftc,
                net_tax: taxed.indian_tax - total_ftc,
            }
        })
        .collect()
}
