use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::declaration::{
    items_for, Business, BusinessAddition, GoodsVehicle, LineItem, PresumptiveScheme, Residency,
    VehicleKind,
};
use super::inclusion::{taxable_value, IncomeKind};

const HEAVY_VEHICLE_RATE_PER_TONNE: Decimal = dec!(1000);
const OTHER_VEHICLE_RATE: Decimal = dec!(7500);
const MAX_VEHICLE_MONTHS: u32 = 12;

/// Profits and gains of business or profession
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BusinessIncome {
    /// Declared net profit, or the presumptive income of the scheme
    pub base_amount: Decimal,
    /// Disallowances plus the 43CA adjustment
    pub total_additions: Decimal,
    pub non_speculative: Decimal,
    pub speculative: Decimal,
}

/// Income for one goods carriage under 44AE
pub fn vehicle_income(vehicle: &GoodsVehicle) -> Decimal {
    let months = Decimal::from(vehicle.months.unwrap_or(0).min(MAX_VEHICLE_MONTHS));
    match vehicle.kind {
        VehicleKind::Heavy => {
            vehicle.tonnage.unwrap_or(Decimal::ZERO) * HEAVY_VEHICLE_RATE_PER_TONNE * months
        }
        VehicleKind::Other => OTHER_VEHICLE_RATE * months,
    }
}

/// Compute business income. `adjustment_43ca` is the stamp-duty adjustment
/// declared alongside capital gains, already residency-filtered.
pub fn business_income(
    business: &Business,
    residency: Residency,
    adjustment_43ca: Decimal,
) -> BusinessIncome {
    let kind = IncomeKind::Business {
        controlled_from_india: business.controlled_from_india,
    };
    let assess = |items: &[LineItem]| taxable_value(items, residency, kind);

    let (base_amount, disallowances) = match &business.scheme {
        PresumptiveScheme::Regular {
            net_profit,
            additions,
        } => {
            let disallowances = BusinessAddition::ALL
                .iter()
                .map(|&addition| assess(items_for(additions, addition)))
                .sum();
            (assess(net_profit), disallowances)
        }
        PresumptiveScheme::Sec44AD {
            digital_turnover,
            other_turnover,
        } => (
            assess(digital_turnover) * dec!(0.06) + assess(other_turnover) * dec!(0.08),
            Decimal::ZERO,
        ),
        PresumptiveScheme::Sec44ADA { gross_receipts } => {
            (assess(gross_receipts) * dec!(0.50), Decimal::ZERO)
        }
        PresumptiveScheme::Sec44AE { vehicles } => {
            (vehicles.iter().map(vehicle_income).sum(), Decimal::ZERO)
        }
        PresumptiveScheme::Sec44B { aggregate_receipts } => {
            (assess(aggregate_receipts) * dec!(0.075), Decimal::ZERO)
        }
        PresumptiveScheme::Sec44BB { aggregate_receipts } => {
            (assess(aggregate_receipts) * dec!(0.10), Decimal::ZERO)
        }
        PresumptiveScheme::Sec44BBA { aggregate_receipts } => {
            (assess(aggregate_receipts) * dec!(0.05), Decimal::ZERO)
        }
        PresumptiveScheme::Sec44BBB { aggregate_receipts } => {
            (assess(aggregate_receipts) * dec!(0.10), Decimal::ZERO)
        }
    };

    let total_additions = disallowances + adjustment_43ca;
    let income = BusinessIncome {
        base_amount,
        total_additions,
        non_speculative: base_amount + total_additions,
        speculative: assess(&business.speculative_income),
    };
    log::debug!(
        "Business income: base={}, additions={}, speculative={}",
        income.base_amount,
        income.total_additions,
        income.speculative
    );
    income
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::declaration::HeadItems;

    fn business(scheme: PresumptiveScheme) -> Business {
        Business {
            controlled_from_india: false,
            speculative_income: Vec::new(),
            scheme,
        }
    }

    #[test]
    fn regular_profit_plus_disallowances() {
        let mut additions = HeadItems::new();
        additions.insert(
            BusinessAddition::BogusPurchases,
            vec![LineItem::india(dec!(50000))],
        );
        additions.insert(
            BusinessAddition::CashPayments,
            vec![LineItem::india(dec!(20000))],
        );
        let b = business(PresumptiveScheme::Regular {
            net_profit: vec![LineItem::india(dec!(800000))],
            additions,
        });
        let income = business_income(&b, Residency::ResidentOrdinary, dec!(10000));
        assert_eq!(income.base_amount, dec!(800000));
        assert_eq!(income.total_additions, dec!(80000));
        assert_eq!(income.non_speculative, dec!(880000));
    }

    #[test]
    fn presumptive_44ad_rates() {
        let b = business(PresumptiveScheme::Sec44AD {
            digital_turnover: vec![LineItem::india(dec!(1000000))],
            other_turnover: vec![LineItem::india(dec!(1000000))],
        });
        let income = business_income(&b, Residency::ResidentOrdinary, Decimal::ZERO);
        assert_eq!(income.non_speculative, dec!(140000));
    }

    #[test]
    fn presumptive_44ada_half_of_receipts() {
        let b = business(PresumptiveScheme::Sec44ADA {
            gross_receipts: vec![LineItem::india(dec!(3000000))],
        });
        let income = business_income(&b, Residency::ResidentOrdinary, Decimal::ZERO);
        assert_eq!(income.non_speculative, dec!(1500000));
    }

    #[test]
    fn presumptive_44ae_vehicles() {
        let heavy = GoodsVehicle {
            kind: VehicleKind::Heavy,
            tonnage: Some(dec!(15)),
            months: Some(10),
        };
        let light = GoodsVehicle {
            kind: VehicleKind::Other,
            tonnage: None,
            months: Some(14),
        };
        assert_eq!(vehicle_income(&heavy), dec!(150000));
        assert_eq!(vehicle_income(&light), dec!(90000));

        let b = business(PresumptiveScheme::Sec44AE {
            vehicles: vec![heavy, light],
        });
        let income = business_income(&b, Residency::NonResident, Decimal::ZERO);
        assert_eq!(income.non_speculative, dec!(240000));
    }

    #[test]
    fn presumptive_receipts_schemes() {
        let receipts = vec![LineItem::india(dec!(1000000))];
        let cases = [
            (
                PresumptiveScheme::Sec44B {
                    aggregate_receipts: receipts.clone(),
                },
                dec!(75000),
            ),
            (
                PresumptiveScheme::Sec44BB {
                    aggregate_receipts: receipts.clone(),
                },
                dec!(100000),
            ),
            (
                PresumptiveScheme::Sec44BBA {
                    aggregate_receipts: receipts.clone(),
                },
                dec!(50000),
            ),
            (
                PresumptiveScheme::Sec44BBB {
                    aggregate_receipts: receipts,
                },
                dec!(100000),
            ),
        ];
        for (scheme, expected) in cases {
            let income =
                business_income(&business(scheme), Residency::ResidentOrdinary, Decimal::ZERO);
            assert_eq!(income.non_speculative, expected);
        }
    }

    #[test]
    fn rnor_foreign_profit_needs_control_from_india() {
        let mut b = business(PresumptiveScheme::Regular {
            net_profit: vec![LineItem::foreign(dec!(500000), "Singapore")],
            additions: HeadItems::new(),
        });
        b.speculative_income = vec![LineItem::foreign(dec!(30000), "Singapore")];

        let income = business_income(&b, Residency::ResidentNotOrdinary, Decimal::ZERO);
        assert_eq!(income.non_speculative, Decimal::ZERO);
        assert_eq!(income.speculative, Decimal::ZERO);

        b.controlled_from_india = true;
        let income = business_income(&b, Residency::ResidentNotOrdinary, Decimal::ZERO);
        assert_eq!(income.non_speculative, dec!(500000));
        assert_eq!(income.speculative, dec!(30000));
    }
}
