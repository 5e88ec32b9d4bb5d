//! Interest for late filing (234A), advance-tax default (234B) and
//! deferment of installments (234C).

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::declaration::{AdvanceTaxInstallments, AssessmentType};
use super::round_half_up;

const MONTHLY_RATE: Decimal = dec!(0.01);

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Calendar months from `start` to `end`, a part month counting in full.
/// Zero when `end` precedes `start`.
pub fn interest_months(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32 + 1;
    months.max(0) as u32
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuarterMonths {
    pub q1: u32,
    pub q2: u32,
    pub q3: u32,
    pub q4: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InterestResult {
    #[serde(rename = "u_s_234a")]
    #[schemars(with = "f64")]
    pub u_s_234a: Decimal,
    #[serde(rename = "u_s_234b")]
    #[schemars(with = "f64")]
    pub u_s_234b: Decimal,
    #[serde(rename = "u_s_234c")]
    #[schemars(with = "f64")]
    pub u_s_234c: Decimal,
    /// Sum of the three sections, rounded to the rupee
    #[schemars(with = "f64")]
    pub total: Decimal,
    #[serde(rename = "months_234a")]
    pub months_234a: u32,
    #[serde(rename = "months_234b")]
    pub months_234b: u32,
    #[serde(rename = "months_234c")]
    pub months_234c: QuarterMonths,
}

/// Already-validated inputs. Invalid or missing dates are `None`.
#[derive(Debug, Clone)]
pub struct InterestInput<'a> {
    pub assessment_type: AssessmentType,
    /// First day of the assessment year
    pub year_start: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub actual_date: Option<NaiveDate>,
    pub notice_148_due_date: Option<NaiveDate>,
    pub tax_on_earlier_assessment: Decimal,
    /// Final tax payable after reliefs, before interest
    pub tax_payable: Decimal,
    pub tds: Decimal,
    pub advance_tax: Decimal,
    pub installments: &'a AdvanceTaxInstallments,
    /// 44AD/44ADA taxpayers pay one installment
    pub single_installment: bool,
    /// Tax on capital gains, winnings and foreign income, paid whenever it arises
    pub tax_on_excluded_income: Decimal,
}

pub fn compute_interest(input: &InterestInput) -> InterestResult {
    let mut result = InterestResult::default();

    let (u_s_234a, months_234a) = late_filing(input);
    result.u_s_234a = u_s_234a;
    result.months_234a = months_234a;

    let assessed = (input.tax_payable - input.tds).max(Decimal::ZERO);
    let (u_s_234b, months_234b) = advance_tax_default(input, assessed);
    result.u_s_234b = u_s_234b;
    result.months_234b = months_234b;

    let (u_s_234c, months_234c) = deferment(input, assessed);
    result.u_s_234c = u_s_234c;
    result.months_234c = months_234c;

    result.total = round_half_up(result.u_s_234a + result.u_s_234b + result.u_s_234c);
    log::debug!(
        "Interest: 234A={} ({}m), 234B={} ({}m), 234C={}, total={}",
        result.u_s_234a,
        result.months_234a,
        result.u_s_234b,
        result.months_234b,
        result.u_s_234c,
        result.total
    );
    result
}

fn late_filing(input: &InterestInput) -> (Decimal, u32) {
    let (start, base) = match input.assessment_type {
        AssessmentType::Reassessment => (
            input.notice_148_due_date.or(input.due_date),
            input.tax_payable - input.tax_on_earlier_assessment,
        ),
        AssessmentType::Regular | AssessmentType::BestJudgment => (
            input.due_date,
            input.tax_payable - input.advance_tax - input.tds,
        ),
    };
    let base = base.max(Decimal::ZERO);

    match (start, input.actual_date) {
        (Some(start), Some(end)) if base > Decimal::ZERO => {
            // interest runs from the day after the due date
            let start = start + Duration::days(1);
            if end >= start {
                let months = interest_months(start, end);
                (base * MONTHLY_RATE * Decimal::from(months), months)
            } else {
                (Decimal::ZERO, 0)
            }
        }
        _ => (Decimal::ZERO, 0),
    }
}

fn advance_tax_default(input: &InterestInput, assessed: Decimal) -> (Decimal, u32) {
    if input.advance_tax >= assessed * dec!(0.9) {
        return (Decimal::ZERO, 0);
    }
    let shortfall = assessed - input.advance_tax;
    if shortfall <= Decimal::ZERO {
        return (Decimal::ZERO, 0);
    }
    let end = match input.actual_date {
        Some(date) if date > input.year_start => date,
        _ => input.year_start,
    };
    let months = interest_months(input.year_start, end);
    (shortfall * MONTHLY_RATE * Decimal::from(months), months)
}

fn deferment(input: &InterestInput, assessed: Decimal) -> (Decimal, QuarterMonths) {
    let paid = input.installments;
    let paid_q1 = paid.q1;
    let paid_q2 = paid_q1 + paid.q2;
    let paid_q3 = paid_q2 + paid.q3;
    let paid_q4 = paid_q3 + paid.q4;

    let mut interest = Decimal::ZERO;
    let mut months = QuarterMonths::default();

    if !input.single_installment {
        let adjusted = (assessed - input.tax_on_excluded_income).max(Decimal::ZERO);
        // (cumulative share due, share below which no relief applies, paid so far)
        let installments = [
            (dec!(0.15), Some(dec!(0.12)), paid_q1, &mut months.q1),
            (dec!(0.45), Some(dec!(0.36)), paid_q2, &mut months.q2),
            (dec!(0.75), None, paid_q3, &mut months.q3),
        ];
        for (share, relief_share, paid, slot) in installments {
            let required = adjusted * share;
            let relieved = relief_share.is_some_and(|relief| paid >= adjusted * relief);
            if paid < required && !relieved {
                interest += (required - paid) * MONTHLY_RATE * dec!(3);
                *slot = 3;
            }
        }
    }

    if paid_q4 < assessed {
        interest += (assessed - paid_q4) * MONTHLY_RATE;
        months.q4 = 1;
    }
    (interest, months)
}
