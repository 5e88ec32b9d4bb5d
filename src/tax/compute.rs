use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::aggregate::aggregate_income;
use super::business::BusinessIncome;
use super::config::{YearConfig, YearConfiguration};
use super::credit::{foreign_tax_credit, ForeignItemResult};
use super::declaration::{Declaration, EntityType, Regime, Residency};
use super::error::TaxError;
use super::house_property::HousePropertySummary;
use super::interest::{compute_interest, parse_date, InterestInput, InterestResult};
use super::international::split_foreign_income;
use super::rates::{assess_tax, entity_schedule, surcharge_slab, TaxBreakdown, TaxInput};
use super::setoff::{set_off_losses, CarriedForward, IncomePool, SetOffEntry};
use super::trust::{trust_computation, TrustComputation};
use super::warnings::Warning;
use super::year::AssessmentYear;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InternationalSummary {
    pub net_income_added: Decimal,
    pub tax_on_income: Decimal,
    pub total_ftc_allowed: Decimal,
    pub itemized: Vec<ForeignItemResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncomeBreakdown {
    pub before_set_off: IncomePool,
    pub after_set_off: IncomePool,
    pub salary: Decimal,
    pub house_property: HousePropertySummary,
    pub business: BusinessIncome,
    pub capital_gains_additions: Decimal,
    pub other_sources_additions: Decimal,
    pub agricultural_income: Decimal,
    pub deemed_income: Decimal,
    pub international: InternationalSummary,
}

/// Outcome of one run of the pipeline. Plain amounts, unrounded unless noted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputationResult {
    pub assessment_year: AssessmentYear,
    pub entity: EntityType,
    pub regime: Regime,
    pub residency: Residency,
    pub income: IncomeBreakdown,
    pub gross_total_income: Decimal,
    pub disallowed_deductions: Decimal,
    /// Floored at zero
    pub net_taxable_income: Decimal,
    pub normal_income: Decimal,
    pub tax: TaxBreakdown,
    /// Tax before surcharge
    pub tax_liability: Decimal,
    pub surcharge: Decimal,
    pub marginal_relief: Decimal,
    pub rebate_87a: Decimal,
    pub cess: Decimal,
    pub tax_payable_before_relief: Decimal,
    /// Foreign tax credit
    pub relief: Decimal,
    /// Never negative; interest is added afterwards
    pub total_tax_payable: Decimal,
    pub interest: InterestResult,
    pub tds: Decimal,
    pub advance_tax: Decimal,
    pub net_payable: Decimal,
    pub set_off: Vec<SetOffEntry>,
    pub losses_carried_forward: CarriedForward,
    pub trust: Option<TrustComputation>,
    pub warnings: Vec<Warning>,
}

impl ComputationResult {
    /// SHA-256 of the serialized result, identical for identical runs
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Parse an optional date, recording a warning when it is present but malformed
fn checked_date(field: &str, value: Option<&str>, warnings: &mut Vec<Warning>) -> Option<NaiveDate> {
    let value = value?;
    let date = parse_date(value);
    if date.is_none() {
        log::warn!("Ignoring invalid {} '{}'", field, value);
        warnings.push(Warning::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    date
}

fn default_due_date(entity: EntityType, config: &YearConfig) -> NaiveDate {
    if entity.is_audit_case() {
        config.filing_due_dates.audit
    } else {
        config.filing_due_dates.non_audit
    }
}

/// Compute the tax liability for a declaration
pub fn compute(
    declaration: &Declaration,
    configuration: &YearConfiguration,
) -> Result<ComputationResult, TaxError> {
    let config = configuration.get(declaration.assessment_year)?;
    declaration.check_amounts()?;
    let rates = &config.tax_rates;
    let mut warnings = Vec::new();

    if declaration.regime == Regime::New && !config.new_regime_available {
        log::warn!(
            "New regime is not available for assessment year {}",
            declaration.assessment_year
        );
        warnings.push(Warning::NewRegimeUnavailable);
    }

    let aggregated = aggregate_income(declaration, &config.deduction_limits);
    let foreign = split_foreign_income(&declaration.international_income, rates);

    let mut pool = aggregated.pool.clone();
    pool.merge(&foreign.slab_buckets);
    let pool = pool.non_negative();

    let set_off = set_off_losses(
        pool.clone(),
        aggregated.house_property.loss(),
        &declaration.losses,
        config.deduction_limits.hp_loss_setoff_limit,
    );

    let filing = &declaration.filing;
    let gross_total_income = set_off.pool.total()
        + aggregated.deemed_income
        + filing
            .income_as_per_earlier_assessment
            .unwrap_or(Decimal::ZERO);
    let mut net_taxable_income = gross_total_income + aggregated.disallowed_deductions;
    log::debug!(
        "GTI={}, disallowed deductions={}",
        gross_total_income,
        aggregated.disallowed_deductions
    );

    let schedule = entity_schedule(declaration, config);
    let mut trust = None;
    let assessment = if declaration.entity == EntityType::Trust {
        let computation = trust_computation(
            &declaration.trust,
            gross_total_income,
            declaration.residency,
            rates.aop_mmr,
        );
        net_taxable_income = computation.taxable_income;
        let surcharge = surcharge_slab(net_taxable_income, schedule.surcharge)
            .map(|(rate, _)| computation.tax * rate)
            .unwrap_or(Decimal::ZERO);
        let assessment = Assessment {
            normal_income: net_taxable_income,
            breakdown: TaxBreakdown {
                on_normal_income: computation.tax,
                ..Default::default()
            },
            tax_before_surcharge: computation.tax,
            surcharge,
            marginal_relief: Decimal::ZERO,
            rebate: Decimal::ZERO,
            credits: Vec::new(),
        };
        trust = Some(computation);
        assessment
    } else {
        let tax = assess_tax(
            TaxInput {
                net_taxable_income,
                pool: &set_off.pool,
                deemed_income: aggregated.deemed_income,
                net_foreign_income: foreign.net_income_added,
                foreign_items: &foreign.items,
            },
            &schedule,
            rates,
        );

        let tax_after_rebate =
            (tax.tax_before_surcharge + tax.surcharge - tax.rebate).max(Decimal::ZERO);
        let before_relief = tax_after_rebate * (Decimal::ONE + rates.cess);
        let average_rate = if net_taxable_income > Decimal::ZERO {
            before_relief / net_taxable_income
        } else {
            Decimal::ZERO
        };
        Assessment {
            normal_income: tax.normal_income,
            breakdown: tax.breakdown,
            tax_before_surcharge: tax.tax_before_surcharge,
            surcharge: tax.surcharge,
            marginal_relief: tax.marginal_relief,
            rebate: tax.rebate,
            credits: foreign_tax_credit(&tax.foreign_items, average_rate),
        }
    };

    let tax_after_rebate = (assessment.tax_before_surcharge + assessment.surcharge
        - assessment.rebate)
        .max(Decimal::ZERO);
    let cess = tax_after_rebate * rates.cess;
    let tax_payable_before_relief = tax_after_rebate + cess;
    let relief: Decimal = assessment.credits.iter().map(|c| c.total_ftc).sum();
    let total_tax_payable = (tax_payable_before_relief - relief).max(Decimal::ZERO);

    let due_date = match filing.due_date.as_deref() {
        Some(value) => checked_date("due_date", Some(value), &mut warnings),
        None => Some(default_due_date(declaration.entity, config)),
    };
    let actual_date = checked_date("actual_date", filing.actual_date.as_deref(), &mut warnings);
    let notice_148_due_date = checked_date(
        "notice_148_due_date",
        filing.notice_148_due_date.as_deref(),
        &mut warnings,
    );

    let breakdown = &assessment.breakdown;
    let interest = compute_interest(&InterestInput {
        assessment_type: filing.assessment_type,
        year_start: declaration.assessment_year.start_date(),
        due_date,
        actual_date,
        notice_148_due_date,
        tax_on_earlier_assessment: filing.tax_on_earlier_assessment.unwrap_or(Decimal::ZERO),
        tax_payable: total_tax_payable,
        tds: declaration.tds,
        advance_tax: declaration.advance_tax,
        installments: &filing.installments,
        single_installment: declaration.business.scheme.is_single_installment(),
        tax_on_excluded_income: breakdown.on_special_income(),
    });

    let net_payable =
        total_tax_payable + interest.total - declaration.tds - declaration.advance_tax;

    let international = InternationalSummary {
        net_income_added: foreign.net_income_added,
        tax_on_income: breakdown.on_foreign_income,
        total_ftc_allowed: relief,
        itemized: assessment.credits.clone(),
    };

    Ok(ComputationResult {
        assessment_year: declaration.assessment_year,
        entity: declaration.entity,
        regime: declaration.regime,
        residency: declaration.residency,
        income: IncomeBreakdown {
            before_set_off: pool,
            after_set_off: set_off.pool,
            salary: aggregated.salary,
            house_property: aggregated.house_property,
            business: aggregated.business,
            capital_gains_additions: aggregated.capital_gains_additions,
            other_sources_additions: aggregated.other_sources_additions,
            agricultural_income: aggregated.agricultural_income,
            deemed_income: aggregated.deemed_income,
            international,
        },
        gross_total_income,
        disallowed_deductions: aggregated.disallowed_deductions,
        net_taxable_income: net_taxable_income.max(Decimal::ZERO),
        normal_income: assessment.normal_income,
        tax: assessment.breakdown,
        tax_liability: assessment.tax_before_surcharge,
        surcharge: assessment.surcharge,
        marginal_relief: assessment.marginal_relief,
        rebate_87a: assessment.rebate,
        cess,
        tax_payable_before_relief,
        relief,
        total_tax_payable,
        interest,
        tds: declaration.tds,
        advance_tax: declaration.advance_tax,
        net_payable,
        set_off: set_off.ledger,
        losses_carried_forward: set_off.carried_forward,
        trust,
        warnings,
    })
}

/// Tax figures common to the trust and standard branches
struct Assessment {
    normal_income: Decimal,
    breakdown: TaxBreakdown,
    tax_before_surcharge: Decimal,
    surcharge: Decimal,
    marginal_relief: Decimal,
    rebate: Decimal,
    credits: Vec<ForeignItemResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeComparison {
    pub old: ComputationResult,
    pub new: ComputationResult,
    /// Regime with the lower net payable; none on a tie
    pub recommended: Option<Regime>,
    pub savings: Decimal,
}

/// Compute under both regimes on independent copies of the declaration
pub fn compare_regimes(
    declaration: &Declaration,
    configuration: &YearConfiguration,
) -> Result<RegimeComparison, TaxError> {
    let config = configuration.get(declaration.assessment_year)?;
    if !declaration.entity.is_individual_like() || !config.new_regime_available {
        return Err(TaxError::RegimeComparisonUnavailable {
            entity: declaration.entity,
            year: declaration.assessment_year,
        });
    }

    let old = compute(&declaration.with_regime(Regime::Old), configuration)?;
    let new = compute(&declaration.with_regime(Regime::New), configuration)?;
    let recommended = match old.net_payable.cmp(&new.net_payable) {
        std::cmp::Ordering::Less => Some(Regime::Old),
        std::cmp::Ordering::Greater => Some(Regime::New),
        std::cmp::Ordering::Equal => None,
    };
    let savings = (old.net_payable - new.net_payable).abs();
    log::debug!(
        "Regime comparison: old={}, new={}, recommended={:?}",
        old.net_payable,
        new.net_payable,
        recommended
    );

    Ok(RegimeComparison {
        old,
        new,
        recommended,
        savings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::declaration::{
        ForeignIncomeItem, ForeignIncomeNature, LineItem, OtherSourcesComponent,
        SalaryComponent, SpecialSection, MAX_AMOUNT,
    };
    use rust_decimal_macros::dec;

    fn salaried(amount: Decimal) -> Declaration {
        let mut decl = Declaration::new(AssessmentYear(2024));
        decl.salary
            .insert(SalaryComponent::BasicSalary, vec![LineItem::india(amount)]);
        decl
    }

    #[test]
    fn salaried_individual_old_regime() {
        let mut decl = salaried(dec!(1000000));
        decl.tds = dec!(117000);
        let result = compute(&decl, &YearConfiguration::builtin()).unwrap();

        assert_eq!(result.gross_total_income, dec!(1000000));
        assert_eq!(result.net_taxable_income, dec!(1000000));
        assert_eq!(result.tax_liability, dec!(112500));
        assert_eq!(result.surcharge, Decimal::ZERO);
        assert_eq!(result.cess, dec!(4500));
        assert_eq!(result.total_tax_payable, dec!(117000));
        assert_eq!(result.interest.total, Decimal::ZERO);
        assert_eq!(result.net_payable, Decimal::ZERO);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn rebate_clears_small_liability() {
        let result = compute(&salaried(dec!(500000)), &YearConfiguration::builtin()).unwrap();
        assert_eq!(result.tax_liability, dec!(12500));
        assert_eq!(result.rebate_87a, dec!(12500));
        assert_eq!(result.total_tax_payable, Decimal::ZERO);
        assert_eq!(result.net_payable, Decimal::ZERO);
    }

    #[test]
    fn missing_year_is_an_error() {
        let decl = salaried(dec!(100000));
        let result = compute(&decl, &YearConfiguration::new());
        assert_eq!(
            result.unwrap_err(),
            TaxError::ConfigurationMissing(AssessmentYear(2024))
        );
    }

    #[test]
    fn invalid_dates_are_reported() {
        let mut decl = salaried(dec!(1000000));
        decl.filing.actual_date = Some("2024-13-01".to_string());
        let result = compute(&decl, &YearConfiguration::builtin()).unwrap();
        assert_eq!(
            result.warnings,
            vec![Warning::InvalidDate {
                field: "actual_date".to_string(),
                value: "2024-13-01".to_string(),
            }]
        );
        assert_eq!(result.interest.u_s_234a, Decimal::ZERO);
    }

    #[test]
    fn new_regime_before_availability_warns() {
        let mut decl = salaried(dec!(1000000)).with_regime(Regime::New);
        decl.assessment_year = AssessmentYear(2019);
        let result = compute(&decl, &YearConfiguration::builtin()).unwrap();
        assert_eq!(result.warnings, vec![Warning::NewRegimeUnavailable]);
    }

    #[test]
    fn trust_losing_exemption_taxed_at_mmr() {
        let mut decl = Declaration::new(AssessmentYear(2024));
        decl.entity = EntityType::Trust;
        decl.other_sources.insert(
            OtherSourcesComponent::OtherIncomes,
            vec![LineItem::india(dec!(600000))],
        );
        decl.trust.disallowed_12a = vec![LineItem::india(dec!(400000))];
        decl.tds = dec!(312000);

        let result = compute(&decl, &YearConfiguration::builtin()).unwrap();
        let trust = result.trust.as_ref().unwrap();
        assert_eq!(trust.taxable_income, dec!(1000000));
        assert_eq!(result.net_taxable_income, dec!(1000000));
        assert_eq!(result.tax_liability, dec!(300000));
        assert_eq!(result.rebate_87a, Decimal::ZERO);
        assert_eq!(result.total_tax_payable, dec!(312000));
        assert!(result.income.international.itemized.is_empty());
    }

    #[test]
    fn fingerprint_is_stable() {
        let config = YearConfiguration::builtin();
        let decl = salaried(dec!(750000));
        let first = compute(&decl, &config).unwrap().fingerprint().unwrap();
        let second = compute(&decl, &config).unwrap().fingerprint().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);

        let other = compute(&salaried(dec!(750001)), &config)
            .unwrap()
            .fingerprint()
            .unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn comparison_recommends_cheaper_regime() {
        let mut decl = salaried(dec!(1000000));
        decl.tds = dec!(200000);
        let comparison = compare_regimes(&decl, &YearConfiguration::builtin()).unwrap();

        assert_eq!(comparison.old.total_tax_payable, dec!(117000));
        assert_eq!(comparison.new.total_tax_payable, dec!(62400));
        assert_eq!(comparison.recommended, Some(Regime::New));
        assert_eq!(comparison.savings, dec!(54600));
        // the caller's declaration is untouched
        assert_eq!(decl.regime, Regime::Old);
    }

    #[test]
    fn comparison_requires_eligible_entity_and_year() {
        let config = YearConfiguration::builtin();

        let mut company = salaried(dec!(1000000));
        company.entity = EntityType::Company;
        assert!(matches!(
            compare_regimes(&company, &config),
            Err(TaxError::RegimeComparisonUnavailable { .. })
        ));

        let mut early = salaried(dec!(1000000));
        early.assessment_year = AssessmentYear(2019);
        assert!(matches!(
            compare_regimes(&early, &config),
            Err(TaxError::RegimeComparisonUnavailable { .. })
        ));
    }

    fn us_dividend(amount: Decimal, tax_paid: Decimal, dtaa_applicable: bool) -> ForeignIncomeItem {
        ForeignIncomeItem {
            id: "div-1".to_string(),
            country: "USA".to_string(),
            nature: ForeignIncomeNature::Dividend,
            amount: Some(amount),
            tax_paid: Some(tax_paid),
            special_section: SpecialSection::Sec115A,
            dtaa_applicable,
            form67_filed: true,
            ..Default::default()
        }
    }

    #[test]
    fn special_rate_foreign_income_stays_out_of_normal_income() {
        let mut decl = salaried(dec!(1000000));
        decl.international_income = vec![us_dividend(dec!(100000), dec!(500000), true)];
        let result = compute(&decl, &YearConfiguration::builtin()).unwrap();

        assert_eq!(result.normal_income, dec!(900000));
        assert_eq!(result.tax.on_normal_income, dec!(92500));
        assert_eq!(result.tax.on_foreign_income, dec!(20000));
        assert_eq!(result.income.international.net_income_added, dec!(100000));
        assert_eq!(result.tax_payable_before_relief, dec!(117000));

        // credit is limited to the Indian tax on the item, not the tax paid abroad
        let credit = &result.income.international.itemized[0];
        assert_eq!(credit.ftc_90_90a, dec!(20000));
        assert_eq!(credit.net_tax, Decimal::ZERO);
        assert_eq!(result.relief, dec!(20000));
        assert_eq!(result.total_tax_payable, dec!(97000));
    }

    #[test]
    fn unilateral_credit_uses_rate_including_cess() {
        let mut decl = salaried(dec!(1000000));
        decl.international_income = vec![us_dividend(dec!(100000), dec!(500000), false)];
        let result = compute(&decl, &YearConfiguration::builtin()).unwrap();

        // 117000 payable before relief over 1000000 net taxable income
        let credit = &result.income.international.itemized[0];
        assert_eq!(credit.ftc_91, dec!(11700));
        assert_eq!(credit.ftc_90_90a, Decimal::ZERO);
        assert_eq!(result.relief, dec!(11700));
        assert_eq!(result.total_tax_payable, dec!(105300));
    }

    #[test]
    fn relief_is_taken_after_cess_and_never_below_zero() {
        let mut decl = salaried(dec!(400000));
        decl.international_income = vec![us_dividend(dec!(100000), dec!(500000), true)];
        let result = compute(&decl, &YearConfiguration::builtin()).unwrap();

        // the rebate only absorbs tax on normal income
        assert_eq!(result.rebate_87a, dec!(2500));
        assert_eq!(result.cess, dec!(800));
        assert_eq!(result.tax_payable_before_relief, dec!(20800));
        assert_eq!(result.relief, dec!(20000));
        assert_eq!(result.total_tax_payable, dec!(800));

        let mut decl = Declaration::new(AssessmentYear(2024));
        decl.international_income = vec![us_dividend(dec!(100000), dec!(500000), false)];
        let result = compute(&decl, &YearConfiguration::builtin()).unwrap();
        assert_eq!(result.net_taxable_income, Decimal::ZERO);
        assert_eq!(result.relief, Decimal::ZERO);
        assert!(result.total_tax_payable >= Decimal::ZERO);
    }

    #[test]
    fn oversized_amounts_are_an_error() {
        let huge = dec!(50000000000000000000000000000);
        let mut decl = salaried(huge);
        decl.other_sources.insert(
            OtherSourcesComponent::OtherIncomes,
            vec![LineItem::india(huge)],
        );
        assert_eq!(
            compute(&decl, &YearConfiguration::builtin()),
            Err(TaxError::AmountOutOfRange {
                field: "salary".to_string(),
                amount: huge,
            })
        );

        let at_limit = salaried(MAX_AMOUNT);
        assert!(compute(&at_limit, &YearConfiguration::builtin()).is_ok());
    }
}
