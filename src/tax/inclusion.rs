//! Residency-based inclusion of declared line items.

use rust_decimal::Decimal;

use super::declaration::{LineItem, Residency};

/// Nature of the income being filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeKind {
    /// Profits and gains of business or profession, with whether the
    /// business is controlled from India
    Business { controlled_from_india: bool },
    Other,
}

/// Amount of a single item that counts toward taxable income
pub fn included_amount(item: &LineItem, residency: Residency, kind: IncomeKind) -> Decimal {
    let Some(amount) = item.amount else {
        return Decimal::ZERO;
    };
    let included = match residency {
        Residency::ResidentOrdinary => true,
        Residency::ResidentNotOrdinary => {
            item.is_india_sourced()
                || matches!(
                    kind,
                    IncomeKind::Business {
                        controlled_from_india: true
                    }
                )
        }
        Residency::NonResident => item.is_india_sourced(),
    };
    if included {
        amount
    } else {
        Decimal::ZERO
    }
}

/// Sum of the included amounts of a list of items
pub fn taxable_value(items: &[LineItem], residency: Residency, kind: IncomeKind) -> Decimal {
    items
        .iter()
        .map(|item| included_amount(item, residency, kind))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn mixed() -> Vec<LineItem> {
        vec![
            LineItem::india(dec!(1000)),
            LineItem::foreign(dec!(500), "UAE"),
            LineItem {
                amount: None,
                location: None,
            },
        ]
    }

    #[test]
    fn resident_ordinary_includes_everything() {
        assert_eq!(
            taxable_value(&mixed(), Residency::ResidentOrdinary, IncomeKind::Other),
            dec!(1500)
        );
    }

    #[test]
    fn non_resident_includes_only_india_sourced() {
        let business = IncomeKind::Business {
            controlled_from_india: true,
        };
        assert_eq!(
            taxable_value(&mixed(), Residency::NonResident, IncomeKind::Other),
            dec!(1000)
        );
        assert_eq!(
            taxable_value(&mixed(), Residency::NonResident, business),
            dec!(1000)
        );
    }

    #[test]
    fn rnor_includes_foreign_business_controlled_from_india() {
        let controlled = IncomeKind::Business {
            controlled_from_india: true,
        };
        let not_controlled = IncomeKind::Business {
            controlled_from_india: false,
        };
        assert_eq!(
            taxable_value(&mixed(), Residency::ResidentNotOrdinary, controlled),
            dec!(1500)
        );
        assert_eq!(
            taxable_value(&mixed(), Residency::ResidentNotOrdinary, not_controlled),
            dec!(1000)
        );
        assert_eq!(
            taxable_value(&mixed(), Residency::ResidentNotOrdinary, IncomeKind::Other),
            dec!(1000)
        );
    }

    #[test]
    fn missing_location_excluded_unless_resident_ordinary() {
        let item = LineItem {
            amount: Some(dec!(700)),
            location: None,
        };
        assert_eq!(
            included_amount(&item, Residency::ResidentOrdinary, IncomeKind::Other),
            dec!(700)
        );
        assert_eq!(
            included_amount(&item, Residency::NonResident, IncomeKind::Other),
            Decimal::ZERO
        );
    }

    #[test]
    fn empty_list_is_zero() {
        assert_eq!(
            taxable_value(&[], Residency::ResidentOrdinary, IncomeKind::Other),
            Decimal::ZERO
        );
    }
}
