use rust_decimal::Decimal;
use serde::Serialize;

use super::config::TaxRates;
use super::declaration::{ForeignIncomeItem, ForeignIncomeNature, SpecialSection};
use super::setoff::{Head, IncomePool};

/// How a foreign item is taxed in India
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "rate")]
pub enum ForeignRate {
    /// Flat rate under a special section
    Special(Decimal),
    /// Merged into the domestic heads and taxed at the average slab rate
    Slab,
}

/// A foreign item after transfer-pricing adjustment and classification
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedForeignItem {
    pub id: String,
    pub country: String,
    pub nature: ForeignIncomeNature,
    pub taxable_amount: Decimal,
    pub rate: ForeignRate,
    pub tax_paid: Decimal,
    pub dtaa_applicable: bool,
    pub dtaa_rate: Option<Decimal>,
    pub form67_filed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForeignIncomeSplit {
    pub items: Vec<ClassifiedForeignItem>,
    /// Slab-rate amounts bucketed into domestic heads
    pub slab_buckets: IncomePool,
    /// Every adjusted foreign amount, special or slab
    pub net_income_added: Decimal,
}

/// Amount taxable in India, using the arm's-length price for business
/// transactions with an associated enterprise
pub fn taxable_amount(item: &ForeignIncomeItem) -> Decimal {
    let declared = item.amount.unwrap_or(Decimal::ZERO);
    match (&item.nature, &item.transfer_pricing) {
        (ForeignIncomeNature::BusinessProfessional, Some(tp)) if tp.associated_enterprise => {
            tp.arms_length_price.unwrap_or(declared)
        }
        _ => declared,
    }
}

/// Rate under the claimed special section, zero when the section does not
/// cover the nature of the income
pub fn special_rate(item: &ForeignIncomeItem, rates: &TaxRates) -> Decimal {
    use ForeignIncomeNature::*;

    let capital_gain = item.nature.is_capital_gain();
    match item.special_section {
        SpecialSection::Sec115A => match item.nature {
            Dividend | Interest => rates.foreign_115a_dividend_interest,
            Royalty | FeesForTechnicalServices => rates.foreign_115a_royalty_fts,
            _ => Decimal::ZERO,
        },
        SpecialSection::Sec115AB if capital_gain => rates.offshore_fund_ltcg_115ab,
        SpecialSection::Sec115AB => rates.offshore_fund_income_115ab,
        SpecialSection::Sec115AC | SpecialSection::Sec115ACA if capital_gain => {
            rates.gdr_fccb_ltcg_115ac
        }
        SpecialSection::Sec115AC | SpecialSection::Sec115ACA => rates.gdr_fccb_income_115ac,
        SpecialSection::Sec115AD if capital_gain => {
            if item.is_ltcg {
                rates.fii_fpi_ltcg_115ad
            } else {
                rates.fii_fpi_stcg_other_115ad
            }
        }
        SpecialSection::Sec115AD => match item.nature {
            Interest => rates.fii_fpi_interest_115ad,
            _ => Decimal::ZERO,
        },
        SpecialSection::Sec115AE => rates.specified_fund_income_115ae,
        SpecialSection::Sec115BBA => rates.foreign_115bba,
        SpecialSection::None => Decimal::ZERO,
    }
}

/// Domestic head that a slab-rate foreign item is merged into
pub fn bucket_for(nature: ForeignIncomeNature) -> Head {
    match nature {
        ForeignIncomeNature::Salary => Head::Salary,
        ForeignIncomeNature::BusinessProfessional => Head::BusinessNonSpeculative,
        ForeignIncomeNature::ShortTermCapitalGain => Head::StcgOther,
        ForeignIncomeNature::LongTermCapitalGain => Head::LtcgOther,
        ForeignIncomeNature::HouseProperty
        | ForeignIncomeNature::Interest
        | ForeignIncomeNature::Dividend
        | ForeignIncomeNature::Royalty
        | ForeignIncomeNature::FeesForTechnicalServices
        | ForeignIncomeNature::Others => Head::OtherSources,
    }
}

/// Classify foreign items as special-rate or slab-rate
pub fn split_foreign_income(items: &[ForeignIncomeItem], rates: &TaxRates) -> ForeignIncomeSplit {
    let mut split = ForeignIncomeSplit::default();
    for item in items {
        let amount = taxable_amount(item);
        split.net_income_added += amount;

        let special = special_rate(item, rates);
        let rate = if special > Decimal::ZERO {
            ForeignRate::Special(special)
        } else {
            let head = bucket_for(item.nature);
            split.slab_buckets.add(head, amount);
            ForeignRate::Slab
        };
        log::debug!(
            "Foreign item {} ({}): amount={}, rate={:?}",
            item.id,
            item.country,
            amount,
            rate
        );

        split.items.push(ClassifiedForeignItem {
            id: item.id.clone(),
            country: item.country.clone(),
            nature: item.nature,
            taxable_amount: amount,
            rate,
            tax_paid: item.tax_paid.unwrap_or(Decimal::ZERO),
            dtaa_applicable: item.dtaa_applicable,
            dtaa_rate: item.dtaa_rate,
            form67_filed: item.form67_filed,
        });
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::config::YearConfiguration;
    use crate::tax::declaration::TransferPricing;
    use crate::tax::year::AssessmentYear;
    use rust_decimal_macros::dec;

    fn rates() -> TaxRates {
        YearConfiguration::builtin()
            .get(AssessmentYear(2024))
            .unwrap()
            .tax_rates
            .clone()
    }

    fn item(nature: ForeignIncomeNature, section: SpecialSection, amount: Decimal) -> ForeignIncomeItem {
        ForeignIncomeItem {
            id: "f1".to_string(),
            country: "USA".to_string(),
            nature,
            amount: Some(amount),
            special_section: section,
            ..Default::default()
        }
    }

    #[test]
    fn section_115a_rates_by_nature() {
        let rates = rates();
        let dividend = item(ForeignIncomeNature::Dividend, SpecialSection::Sec115A, dec!(1));
        let royalty = item(ForeignIncomeNature::Royalty, SpecialSection::Sec115A, dec!(1));
        let salary = item(ForeignIncomeNature::Salary, SpecialSection::Sec115A, dec!(1));
        assert_eq!(special_rate(&dividend, &rates), dec!(0.20));
        assert_eq!(special_rate(&royalty, &rates), dec!(0.10));
        assert_eq!(special_rate(&salary, &rates), Decimal::ZERO);
    }

    #[test]
    fn section_115ad_capital_gains_follow_ltcg_flag() {
        let rates = rates();
        let mut gain = item(
            ForeignIncomeNature::ShortTermCapitalGain,
            SpecialSection::Sec115AD,
            dec!(1),
        );
        assert_eq!(special_rate(&gain, &rates), dec!(0.30));
        gain.is_ltcg = true;
        assert_eq!(special_rate(&gain, &rates), dec!(0.10));
        let dividend = item(ForeignIncomeNature::Dividend, SpecialSection::Sec115AD, dec!(1));
        assert_eq!(special_rate(&dividend, &rates), Decimal::ZERO);
    }

    #[test]
    fn transfer_pricing_substitutes_arms_length_price() {
        let mut business = item(
            ForeignIncomeNature::BusinessProfessional,
            SpecialSection::None,
            dec!(100000),
        );
        business.transfer_pricing = Some(TransferPricing {
            associated_enterprise: true,
            arms_length_price: Some(dec!(160000)),
        });
        assert_eq!(taxable_amount(&business), dec!(160000));

        business.transfer_pricing = Some(TransferPricing {
            associated_enterprise: false,
            arms_length_price: Some(dec!(160000)),
        });
        assert_eq!(taxable_amount(&business), dec!(100000));
    }

    #[test]
    fn slab_items_bucket_into_domestic_heads() {
        let split = split_foreign_income(
            &[
                item(ForeignIncomeNature::Salary, SpecialSection::None, dec!(500000)),
                item(ForeignIncomeNature::Dividend, SpecialSection::Sec115A, dec!(100000)),
                item(ForeignIncomeNature::Royalty, SpecialSection::None, dec!(30000)),
                item(
                    ForeignIncomeNature::LongTermCapitalGain,
                    SpecialSection::None,
                    dec!(70000),
                ),
            ],
            &rates(),
        );
        assert_eq!(split.net_income_added, dec!(700000));
        assert_eq!(split.slab_buckets.salary, dec!(500000));
        assert_eq!(split.slab_buckets.other_sources, dec!(30000));
        assert_eq!(split.slab_buckets.ltcg_other, dec!(70000));
        assert_eq!(split.slab_buckets.total(), dec!(600000));
        assert_eq!(split.items[1].rate, ForeignRate::Special(dec!(0.20)));
        assert_eq!(split.items[0].rate, ForeignRate::Slab);
    }
}
