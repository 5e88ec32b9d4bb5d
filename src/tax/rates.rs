use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::config::{PersonalSchedule, Rebate, Slab, TaxRates, YearConfig};
use super::credit::{tax_on_foreign_income, TaxedForeignItem};
use super::declaration::{CompanyKind, Declaration, EntityType};
use super::international::ClassifiedForeignItem;
use super::setoff::IncomePool;

/// Tax on income under a marginal-rate table
pub fn slab_tax(income: Decimal, slabs: &[Slab]) -> Decimal {
    let mut tax = Decimal::ZERO;
    let mut remaining = income;
    let mut previous_limit = Decimal::ZERO;
    for slab in slabs {
        if remaining <= Decimal::ZERO {
            break;
        }
        let in_slab = match slab.limit {
            Some(limit) => remaining.min(limit - previous_limit),
            None => remaining,
        };
        tax += in_slab * slab.rate;
        remaining -= in_slab;
        if let Some(limit) = slab.limit {
            previous_limit = limit;
        }
    }
    tax
}

/// The surcharge slab applicable to `income`: the highest limit that income
/// strictly exceeds. Returns `(rate, threshold)`.
pub fn surcharge_slab(income: Decimal, slabs: &[Slab]) -> Option<(Decimal, Decimal)> {
    slabs.iter().rev().find_map(|slab| match slab.limit {
        Some(limit) if income > limit => Some((slab.rate, limit)),
        _ => None,
    })
}

/// How normal income is taxed for an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalSchedule<'a> {
    Slabs(&'a [Slab]),
    Flat(Decimal),
}

impl NormalSchedule<'_> {
    pub fn tax(&self, income: Decimal) -> Decimal {
        match self {
            NormalSchedule::Slabs(slabs) => slab_tax(income, slabs),
            NormalSchedule::Flat(rate) => income * *rate,
        }
    }
}

/// Everything the calculator needs to know about the taxpayer's rate tables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySchedule<'a> {
    pub normal: NormalSchedule<'a>,
    pub surcharge: &'a [Slab],
    /// Only individuals are eligible for the 87A rebate
    pub rebate: Option<&'a Rebate>,
}

/// Select the rate schedule for the declaration's entity, age band and regime
pub fn entity_schedule<'a>(declaration: &Declaration, config: &'a YearConfig) -> EntitySchedule<'a> {
    let regime = declaration.regime;
    let personal = |schedule: &'a PersonalSchedule, individual: bool| {
        let slabs = schedule.slabs.for_regime(regime);
        let slabs = if individual {
            slabs.for_age(declaration.age)
        } else {
            slabs.below_60.as_slice()
        };
        EntitySchedule {
            normal: NormalSchedule::Slabs(slabs),
            surcharge: schedule.surcharge_for(regime),
            rebate: if individual {
                schedule.rebate_for(regime)
            } else {
                None
            },
        }
    };
    let flat = |rate: Decimal, surcharge: &'a [Slab]| EntitySchedule {
        normal: NormalSchedule::Flat(rate),
        surcharge,
        rebate: None,
    };

    match declaration.entity {
        EntityType::Individual => personal(&config.individual, true),
        EntityType::Huf => personal(&config.huf, false),
        EntityType::Aop => personal(&config.aop, false),
        EntityType::Boi => personal(&config.boi, false),
        EntityType::ArtificialJuridicalPerson => {
            personal(&config.artificial_juridical_person, false)
        }
        EntityType::Firm => flat(config.firm.rate, &config.firm.surcharge_rates),
        EntityType::Llp => flat(config.llp.rate, &config.llp.surcharge_rates),
        EntityType::LocalAuthority => flat(
            config.local_authority.rate,
            &config.local_authority.surcharge_rates,
        ),
        EntityType::Company => match declaration.company_kind {
            CompanyKind::Domestic => {
                let domestic = &config.company.domestic;
                let turnover = declaration.previous_year_turnover.unwrap_or(Decimal::ZERO);
                let rate = if turnover <= domestic.turnover_threshold {
                    domestic.rate_within_threshold
                } else {
                    domestic.rate_above_threshold
                };
                flat(rate, &domestic.surcharge_rates)
            }
            CompanyKind::Foreign => flat(
                config.company.foreign.rate,
                &config.company.foreign.surcharge_rates,
            ),
        },
        EntityType::Trust => flat(config.tax_rates.aop_mmr, &config.aop.surcharge_rates),
    }
}

/// Tax by income category, before surcharge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaxBreakdown {
    #[schemars(with = "f64")]
    pub on_normal_income: Decimal,
    #[serde(rename = "on_stcg_111a")]
    #[schemars(with = "f64")]
    pub on_stcg_111a: Decimal,
    #[serde(rename = "on_ltcg_112a")]
    #[schemars(with = "f64")]
    pub on_ltcg_112a: Decimal,
    #[schemars(with = "f64")]
    pub on_ltcg_other: Decimal,
    #[schemars(with = "f64")]
    pub on_winnings: Decimal,
    /// Including the surcharge embedded in the deemed-income rate
    #[schemars(with = "f64")]
    pub on_deemed_income: Decimal,
    #[schemars(with = "f64")]
    pub on_foreign_income: Decimal,
}

impl TaxBreakdown {
    /// Tax on income charged at flat special rates (capital gains, winnings, foreign)
    pub fn on_special_income(&self) -> Decimal {
        self.on_stcg_111a + self.on_ltcg_112a + self.on_ltcg_other + self.on_winnings
            + self.on_foreign_income
    }
}

/// Inputs to the tax calculation, all after set-off
#[derive(Debug, Clone, Copy)]
pub struct TaxInput<'a> {
    pub net_taxable_income: Decimal,
    pub pool: &'a IncomePool,
    pub deemed_income: Decimal,
    pub net_foreign_income: Decimal,
    pub foreign_items: &'a [ClassifiedForeignItem],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxAssessment {
    pub normal_income: Decimal,
    pub breakdown: TaxBreakdown,
    pub foreign_items: Vec<TaxedForeignItem>,
    /// All tax before surcharge, deemed income at its base rate
    pub tax_before_surcharge: Decimal,
    /// Surcharge on non-deemed tax before marginal relief
    pub gross_surcharge: Decimal,
    pub marginal_relief: Decimal,
    /// Net non-deemed surcharge plus the deemed-income surcharge
    pub surcharge: Decimal,
    pub rebate: Decimal,
}

/// Slab and special-rate tax, surcharge with marginal relief, and rebate
pub fn assess_tax(input: TaxInput, schedule: &EntitySchedule, rates: &TaxRates) -> TaxAssessment {
    let pool = input.pool;
    let nti = input.net_taxable_income;

    let deemed_base = input.deemed_income * rates.deemed_income_115bbe;
    let deemed_surcharge = deemed_base * rates.deemed_income_surcharge;

    let mut breakdown = TaxBreakdown {
        on_stcg_111a: pool.stcg_111a * rates.stcg_111a,
        on_ltcg_112a: (pool.ltcg_112a - rates.ltcg_112a_exemption).max(Decimal::ZERO)
            * rates.ltcg_112a_rate,
        on_ltcg_other: pool.ltcg_other * rates.ltcg_other_rate,
        on_winnings: pool.winnings * rates.winnings,
        on_deemed_income: deemed_base + deemed_surcharge,
        ..Default::default()
    };

    let domestic_special =
        pool.winnings + pool.ltcg_112a + pool.ltcg_other + pool.stcg_111a + input.deemed_income;
    let normal_income_for = |income: Decimal| {
        (income - domestic_special - input.net_foreign_income).max(Decimal::ZERO)
    };

    let normal_income = normal_income_for(nti);
    breakdown.on_normal_income = schedule.normal.tax(normal_income);

    let average_normal_rate = if normal_income > Decimal::ZERO {
        breakdown.on_normal_income / normal_income
    } else {
        Decimal::ZERO
    };
    let foreign_items = tax_on_foreign_income(input.foreign_items, average_normal_rate);
    breakdown.on_foreign_income = foreign_items.iter().map(|item| item.indian_tax).sum();

    let special_tax = breakdown.on_special_income();
    let tax_on_other_incomes = breakdown.on_normal_income + special_tax;
    let tax_before_surcharge = tax_on_other_incomes + deemed_base;

    let mut gross_surcharge = Decimal::ZERO;
    let mut marginal_relief = Decimal::ZERO;
    if let Some((rate, threshold)) = surcharge_slab(nti, schedule.surcharge) {
        gross_surcharge = tax_on_other_incomes * rate;

        let tax_plus_surcharge = tax_on_other_incomes + gross_surcharge + breakdown.on_deemed_income;
        let tax_at_threshold =
            schedule.normal.tax(normal_income_for(threshold)) + special_tax;
        let surcharge_at_threshold = surcharge_slab(threshold, schedule.surcharge)
            .map(|(rate, _)| tax_at_threshold * rate)
            .unwrap_or(Decimal::ZERO);
        let cap = tax_at_threshold
            + surcharge_at_threshold
            + breakdown.on_deemed_income
            + (nti - threshold);

        if tax_plus_surcharge > cap {
            marginal_relief = (tax_plus_surcharge - cap).min(gross_surcharge);
        }
        log::debug!(
            "Surcharge {} above {}: gross={}, cap={}, relief={}",
            rate,
            threshold,
            gross_surcharge,
            cap,
            marginal_relief
        );
    }

    let net_surcharge = gross_surcharge - marginal_relief;
    let surcharge = net_surcharge + deemed_surcharge;

    let mut rebate = Decimal::ZERO;
    if let Some(rebate_config) = schedule.rebate {
        if nti <= rebate_config.income_ceiling {
            let special_surcharge_share = if tax_on_other_incomes > Decimal::ZERO {
                net_surcharge * (special_tax / tax_on_other_incomes)
            } else {
                Decimal::ZERO
            };
            let excluded = breakdown.on_deemed_income + special_tax + special_surcharge_share;
            let eligible = (tax_before_surcharge + surcharge - excluded).max(Decimal::ZERO);
            rebate = eligible.min(rebate_config.limit);
        }
    }

    TaxAssessment {
        normal_income,
        breakdown,
        foreign_items,
        tax_before_surcharge,
        gross_surcharge,
        marginal_relief,
        surcharge,
        rebate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::config::YearConfiguration;
    use crate::tax::declaration::{AgeBand, Regime};
    use crate::tax::year::AssessmentYear;
    use rust_decimal_macros::dec;

    fn config() -> YearConfig {
        YearConfiguration::builtin()
            .get(AssessmentYear(2024))
            .unwrap()
            .clone()
    }

    fn assess(decl: &Declaration, config: &YearConfig, pool: &IncomePool, nti: Decimal) -> TaxAssessment {
        let schedule = entity_schedule(decl, config);
        assess_tax(
            TaxInput {
                net_taxable_income: nti,
                pool,
                deemed_income: Decimal::ZERO,
                net_foreign_income: Decimal::ZERO,
                foreign_items: &[],
            },
            &schedule,
            &config.tax_rates,
        )
    }

    #[test]
    fn slab_tax_old_regime_below_60() {
        let config = config();
        let slabs = config.individual.slabs.old.for_age(AgeBand::Below60);
        assert_eq!(slab_tax(dec!(1200000), slabs), dec!(172500));
        assert_eq!(slab_tax(dec!(250000), slabs), Decimal::ZERO);
        assert_eq!(slab_tax(Decimal::ZERO, slabs), Decimal::ZERO);
    }

    #[test]
    fn slab_tax_senior_citizens() {
        let config = config();
        let senior = config.individual.slabs.old.for_age(AgeBand::From60To80);
        let super_senior = config.individual.slabs.old.for_age(AgeBand::Above80);
        assert_eq!(slab_tax(dec!(1200000), senior), dec!(170000));
        assert_eq!(slab_tax(dec!(1200000), super_senior), dec!(160000));
    }

    #[test]
    fn surcharge_slab_requires_strictly_greater_income() {
        let config = config();
        let slabs = &config.individual.surcharge_rates;
        assert_eq!(surcharge_slab(dec!(5000000), slabs), None);
        assert_eq!(
            surcharge_slab(dec!(5000001), slabs),
            Some((dec!(0.10), dec!(5000000)))
        );
        assert_eq!(
            surcharge_slab(dec!(60000000), slabs),
            Some((dec!(0.37), dec!(50000000)))
        );
        let new = config.individual.surcharge_for(Regime::New);
        assert_eq!(
            surcharge_slab(dec!(60000000), new),
            Some((dec!(0.25), dec!(20000000)))
        );
    }

    #[test]
    fn new_regime_rebate_zeroes_tax() {
        let config = config();
        let decl = Declaration::new(AssessmentYear(2024)).with_regime(Regime::New);
        let mut pool = IncomePool::default();
        pool.salary = dec!(650000);
        let tax = assess(&decl, &config, &pool, dec!(650000));
        assert_eq!(tax.breakdown.on_normal_income, dec!(20000));
        assert_eq!(tax.rebate, dec!(20000));
    }

    #[test]
    fn rebate_not_available_above_ceiling_or_for_huf() {
        let config = config();
        let mut pool = IncomePool::default();
        pool.salary = dec!(750000);
        let decl = Declaration::new(AssessmentYear(2024)).with_regime(Regime::New);
        assert_eq!(assess(&decl, &config, &pool, dec!(750000)).rebate, Decimal::ZERO);

        pool.salary = dec!(450000);
        let mut huf = Declaration::new(AssessmentYear(2024));
        huf.entity = EntityType::Huf;
        let tax = assess(&huf, &config, &pool, dec!(450000));
        assert_eq!(tax.breakdown.on_normal_income, dec!(10000));
        assert_eq!(tax.rebate, Decimal::ZERO);
    }

    #[test]
    fn rebate_excludes_special_rate_tax() {
        let config = config();
        let decl = Declaration::new(AssessmentYear(2024));
        let mut pool = IncomePool::default();
        pool.salary = dec!(300000);
        pool.stcg_111a = dec!(100000);
        let tax = assess(&decl, &config, &pool, dec!(400000));
        assert_eq!(tax.breakdown.on_normal_income, dec!(2500));
        assert_eq!(tax.breakdown.on_stcg_111a, dec!(15000));
        assert_eq!(tax.rebate, dec!(2500));
    }

    #[test]
    fn marginal_relief_just_above_threshold() {
        let config = config();
        let decl = Declaration::new(AssessmentYear(2024));
        let mut pool = IncomePool::default();
        pool.salary = dec!(5010000);
        let tax = assess(&decl, &config, &pool, dec!(5010000));
        assert_eq!(tax.breakdown.on_normal_income, dec!(1315500));
        assert_eq!(tax.gross_surcharge, dec!(131550));
        assert_eq!(tax.marginal_relief, dec!(124550));
        assert_eq!(tax.surcharge, dec!(7000));
        // never more than tax at the threshold plus the excess income
        assert!(tax.tax_before_surcharge + tax.surcharge <= dec!(1312500) + dec!(10000));
    }

    #[test]
    fn no_marginal_relief_well_above_threshold() {
        let config = config();
        let decl = Declaration::new(AssessmentYear(2024));
        let mut pool = IncomePool::default();
        pool.salary = dec!(6000000);
        let tax = assess(&decl, &config, &pool, dec!(6000000));
        assert_eq!(tax.marginal_relief, Decimal::ZERO);
        assert_eq!(tax.surcharge, tax.breakdown.on_normal_income * dec!(0.10));
    }

    #[test]
    fn ltcg_112a_taxed_above_exemption() {
        let config = config();
        let decl = Declaration::new(AssessmentYear(2024));
        let mut pool = IncomePool::default();
        pool.ltcg_112a = dec!(250000);
        let tax = assess(&decl, &config, &pool, dec!(250000));
        assert_eq!(tax.normal_income, Decimal::ZERO);
        assert_eq!(tax.breakdown.on_ltcg_112a, dec!(15000));
    }

    #[test]
    fn deemed_income_carries_embedded_surcharge() {
        let config = config();
        let decl = Declaration::new(AssessmentYear(2024));
        let pool = IncomePool::default();
        let schedule = entity_schedule(&decl, &config);
        let tax = assess_tax(
            TaxInput {
                net_taxable_income: dec!(100000),
                pool: &pool,
                deemed_income: dec!(100000),
                net_foreign_income: Decimal::ZERO,
                foreign_items: &[],
            },
            &schedule,
            &config.tax_rates,
        );
        assert_eq!(tax.tax_before_surcharge, dec!(60000));
        assert_eq!(tax.surcharge, dec!(15000));
        assert_eq!(tax.breakdown.on_deemed_income, dec!(75000));
        assert_eq!(tax.rebate, Decimal::ZERO);
    }

    #[test]
    fn company_rate_depends_on_turnover() {
        let config = config();
        let mut decl = Declaration::new(AssessmentYear(2024));
        decl.entity = EntityType::Company;
        decl.previous_year_turnover = Some(dec!(4000000000));
        assert_eq!(
            entity_schedule(&decl, &config).normal,
            NormalSchedule::Flat(dec!(0.25))
        );
        decl.previous_year_turnover = Some(dec!(4000000001));
        assert_eq!(
            entity_schedule(&decl, &config).normal,
            NormalSchedule::Flat(dec!(0.30))
        );
        decl.company_kind = CompanyKind::Foreign;
        assert_eq!(
            entity_schedule(&decl, &config).normal,
            NormalSchedule::Flat(dec!(0.40))
        );
    }

    #[test]
    fn firm_marginal_relief_uses_flat_rate() {
        let config = config();
        let mut decl = Declaration::new(AssessmentYear(2024));
        decl.entity = EntityType::Firm;
        let mut pool = IncomePool::default();
        pool.business_non_speculative = dec!(10050000);
        let tax = assess(&decl, &config, &pool, dec!(10050000));
        // 30% of 10,050,000 with 12% surcharge, capped at 3,000,000 + 50,000
        assert_eq!(tax.breakdown.on_normal_income, dec!(3015000));
        assert_eq!(tax.gross_surcharge, dec!(361800));
        assert_eq!(tax.marginal_relief, dec!(326800));
        assert_eq!(tax.surcharge, dec!(35000));
    }
}
