use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::declaration::{HouseProperty, Residency};
use super::inclusion::{taxable_value, IncomeKind};
use super::round_half_up;

/// Standard deduction u/s 24(a) as a share of net annual value
const STANDARD_DEDUCTION_RATE: Decimal = dec!(0.30);

/// Computed income from one property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyIncome {
    pub id: Option<String>,
    pub self_occupied: bool,
    pub net_annual_value: Decimal,
    pub standard_deduction: Decimal,
    pub interest_deduction: Decimal,
    /// Rounded; negative when the property makes a loss
    pub income: Decimal,
}

/// Aggregate of all properties, treated as a single head for set-off
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HousePropertySummary {
    pub properties: Vec<PropertyIncome>,
    pub net_annual_value: Decimal,
    pub standard_deduction: Decimal,
    pub income: Decimal,
}

impl HousePropertySummary {
    /// Positive aggregate income entering the income pool
    pub fn pooled_income(&self) -> Decimal {
        self.income.max(Decimal::ZERO)
    }

    /// Current-year loss available for set-off
    pub fn loss(&self) -> Decimal {
        (-self.income).max(Decimal::ZERO)
    }
}

/// Income from one property
pub fn property_income(
    property: &HouseProperty,
    residency: Residency,
    sop_interest_limit: Decimal,
) -> PropertyIncome {
    let gross_rent = taxable_value(&property.gross_rent, residency, IncomeKind::Other);
    let municipal_taxes = taxable_value(&property.municipal_taxes, residency, IncomeKind::Other);
    let interest = taxable_value(&property.interest_on_loan, residency, IncomeKind::Other);

    let (nav, standard_deduction, interest_deduction) = if property.self_occupied {
        // Annual value of a self-occupied property is nil; interest is capped
        (Decimal::ZERO, Decimal::ZERO, interest.min(sop_interest_limit))
    } else {
        let nav = (gross_rent - municipal_taxes).max(Decimal::ZERO);
        (nav, nav * STANDARD_DEDUCTION_RATE, interest)
    };

    let income = round_half_up(nav - standard_deduction - interest_deduction);
    log::debug!(
        "House property {:?}: NAV={}, 24(a)={}, 24(b)={}, income={}",
        property.id,
        nav,
        standard_deduction,
        interest_deduction,
        income
    );

    PropertyIncome {
        id: property.id.clone(),
        self_occupied: property.self_occupied,
        net_annual_value: round_half_up(nav),
        standard_deduction: round_half_up(standard_deduction),
        interest_deduction,
        income,
    }
}

/// Sum every property into one house-property head
pub fn house_property_income(
    properties: &[HouseProperty],
    residency: Residency,
    sop_interest_limit: Decimal,
) -> HousePropertySummary {
    let properties: Vec<PropertyIncome> = properties
        .iter()
        .map(|p| property_income(p, residency, sop_interest_limit))
        .collect();

    HousePropertySummary {
        net_annual_value: properties.iter().map(|p| p.net_annual_value).sum(),
        standard_deduction: properties.iter().map(|p| p.standard_deduction).sum(),
        income: properties.iter().map(|p| p.income).sum(),
        properties,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::declaration::LineItem;

    const LIMIT: Decimal = dec!(200000);

    fn self_occupied(interest: Decimal) -> HouseProperty {
        HouseProperty {
            interest_on_loan: vec![LineItem::india(interest)],
            self_occupied: true,
            ..Default::default()
        }
    }

    fn let_out(rent: Decimal, municipal: Decimal, interest: Decimal) -> HouseProperty {
        HouseProperty {
            gross_rent: vec![LineItem::india(rent)],
            municipal_taxes: vec![LineItem::india(municipal)],
            interest_on_loan: vec![LineItem::india(interest)],
            self_occupied: false,
            ..Default::default()
        }
    }

    #[test]
    fn self_occupied_interest_within_cap() {
        let p = property_income(&self_occupied(dec!(180000)), Residency::ResidentOrdinary, LIMIT);
        assert_eq!(p.net_annual_value, Decimal::ZERO);
        assert_eq!(p.standard_deduction, Decimal::ZERO);
        assert_eq!(p.income, dec!(-180000));
    }

    #[test]
    fn self_occupied_interest_capped() {
        let p = property_income(&self_occupied(dec!(250000)), Residency::ResidentOrdinary, LIMIT);
        assert_eq!(p.interest_deduction, dec!(200000));
        assert_eq!(p.income, dec!(-200000));
    }

    #[test]
    fn let_out_property() {
        let p = property_income(
            &let_out(dec!(600000), dec!(50000), dec!(100000)),
            Residency::ResidentOrdinary,
            LIMIT,
        );
        assert_eq!(p.net_annual_value, dec!(550000));
        assert_eq!(p.standard_deduction, dec!(165000));
        assert_eq!(p.income, dec!(285000));
    }

    #[test]
    fn let_out_interest_uncapped() {
        let p = property_income(
            &let_out(dec!(100000), Decimal::ZERO, dec!(400000)),
            Residency::ResidentOrdinary,
            LIMIT,
        );
        assert_eq!(p.income, dec!(-330000));
    }

    #[test]
    fn municipal_taxes_above_rent_floor_nav_at_zero() {
        let p = property_income(
            &let_out(dec!(10000), dec!(20000), Decimal::ZERO),
            Residency::ResidentOrdinary,
            LIMIT,
        );
        assert_eq!(p.net_annual_value, Decimal::ZERO);
        assert_eq!(p.income, Decimal::ZERO);
    }

    #[test]
    fn income_rounded_to_nearest_rupee() {
        let p = property_income(
            &let_out(dec!(1001), Decimal::ZERO, Decimal::ZERO),
            Residency::ResidentOrdinary,
            LIMIT,
        );
        // 1001 - 300.3 = 700.7
        assert_eq!(p.income, dec!(701));
    }

    #[test]
    fn foreign_rent_excluded_for_non_resident() {
        let property = HouseProperty {
            gross_rent: vec![LineItem::foreign(dec!(500000), "UK")],
            ..Default::default()
        };
        let p = property_income(&property, Residency::NonResident, LIMIT);
        assert_eq!(p.income, Decimal::ZERO);
    }

    #[test]
    fn properties_aggregate_into_one_head() {
        let summary = house_property_income(
            &[
                let_out(dec!(600000), dec!(50000), dec!(100000)),
                self_occupied(dec!(250000)),
            ],
            Residency::ResidentOrdinary,
            LIMIT,
        );
        assert_eq!(summary.properties.len(), 2);
        assert_eq!(summary.income, dec!(85000));
        assert_eq!(summary.pooled_income(), dec!(85000));
        assert_eq!(summary.loss(), Decimal::ZERO);

        let loss_only =
            house_property_income(&[self_occupied(dec!(90000))], Residency::ResidentOrdinary, LIMIT);
        assert_eq!(loss_only.pooled_income(), Decimal::ZERO);
        assert_eq!(loss_only.loss(), dec!(90000));
    }
}
