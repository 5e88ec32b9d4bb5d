use rust_decimal::Decimal;
use serde::Serialize;

use super::business::{business_income, BusinessIncome};
use super::config::DeductionLimits;
use super::declaration::{
    items_for, CapitalGainsComponent, CapitalGainsRole, Declaration, DeductionHead,
    DeemedIncomeSection, LineItem, OtherSourcesComponent, OtherSourcesRole, SalaryComponent,
};
use super::house_property::{house_property_income, HousePropertySummary};
use super::inclusion::{taxable_value, IncomeKind};
use super::setoff::{Head, IncomePool};

/// Domestic income summed per head, before foreign items and set-off
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedIncome {
    /// Raw head amounts; may be negative until floored
    pub pool: IncomePool,
    pub salary: Decimal,
    pub house_property: HousePropertySummary,
    pub business: BusinessIncome,
    pub capital_gains_additions: Decimal,
    pub other_sources_additions: Decimal,
    /// Exempt; reported only
    pub agricultural_income: Decimal,
    pub deemed_income: Decimal,
    pub disallowed_deductions: Decimal,
}

pub fn aggregate_income(declaration: &Declaration, limits: &DeductionLimits) -> AggregatedIncome {
    let residency = declaration.residency;
    let other = |items: &[LineItem]| taxable_value(items, residency, IncomeKind::Other);
    let business_kind = IncomeKind::Business {
        controlled_from_india: declaration.business.controlled_from_india,
    };

    let salary: Decimal = SalaryComponent::ALL
        .iter()
        .map(|&c| other(items_for(&declaration.salary, c)))
        .sum();

    let house_property = house_property_income(
        &declaration.house_properties,
        residency,
        limits.hp_interest_deduction_limit_sop,
    );

    let mut pool = IncomePool::default();
    let mut capital_gains_additions = Decimal::ZERO;
    let mut adjustment_43ca = Decimal::ZERO;
    for component in CapitalGainsComponent::ALL {
        let items = items_for(&declaration.capital_gains, component);
        match component.role() {
            CapitalGainsRole::Stcg111A => pool.add(Head::Stcg111A, other(items)),
            CapitalGainsRole::StcgOther => pool.add(Head::StcgOther, other(items)),
            CapitalGainsRole::Ltcg112A => pool.add(Head::Ltcg112A, other(items)),
            CapitalGainsRole::LtcgOther => pool.add(Head::LtcgOther, other(items)),
            CapitalGainsRole::Adjustment => capital_gains_additions += other(items),
            CapitalGainsRole::Business => {
                adjustment_43ca += taxable_value(items, residency, business_kind)
            }
        }
    }
    pool.add(Head::StcgOther, capital_gains_additions);

    let business = business_income(&declaration.business, residency, adjustment_43ca);

    let mut other_sources_additions = Decimal::ZERO;
    let mut agricultural_income = Decimal::ZERO;
    for component in OtherSourcesComponent::ALL {
        let amount = other(items_for(&declaration.other_sources, component));
        match component.role() {
            OtherSourcesRole::OtherSources => other_sources_additions += amount,
            OtherSourcesRole::RaceHorse => pool.add(Head::RaceHorse, amount),
            OtherSourcesRole::Winnings => pool.add(Head::Winnings, amount),
            OtherSourcesRole::Agricultural => agricultural_income += amount,
        }
    }

    pool.add(Head::Salary, salary);
    pool.add(Head::HouseProperty, house_property.pooled_income());
    pool.add(Head::BusinessNonSpeculative, business.non_speculative);
    pool.add(Head::BusinessSpeculative, business.speculative);
    pool.add(Head::OtherSources, other_sources_additions);

    let deemed_income: Decimal = DeemedIncomeSection::ALL
        .iter()
        .map(|&s| other(items_for(&declaration.deemed_income, s)))
        .sum();
    let disallowed_deductions: Decimal = DeductionHead::ALL
        .iter()
        .map(|&d| other(items_for(&declaration.deductions, d)))
        .sum();

    AggregatedIncome {
        pool,
        salary,
        house_property,
        business,
        capital_gains_additions,
        other_sources_additions,
        agricultural_income,
        deemed_income,
        disallowed_deductions,
    }
}
