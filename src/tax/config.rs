use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

use super::declaration::{AgeBand, Regime};
use super::error::TaxError;
use super::year::AssessmentYear;

/// One bracket of a marginal-rate table. A missing limit means unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Slab {
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub limit: Option<Decimal>,
    #[schemars(with = "f64")]
    pub rate: Decimal,
}

impl Slab {
    pub fn upto(limit: Decimal, rate: Decimal) -> Self {
        Slab {
            limit: Some(limit),
            rate,
        }
    }

    pub fn above(rate: Decimal) -> Self {
        Slab { limit: None, rate }
    }
}

/// Slab tables by age band. Bands without their own table use `below_60`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct AgeSlabs {
    pub below_60: Vec<Slab>,
    #[serde(default, rename = "60_to_80")]
    pub from_60_to_80: Option<Vec<Slab>>,
    #[serde(default)]
    pub above_80: Option<Vec<Slab>>,
}

impl AgeSlabs {
    pub fn uniform(slabs: Vec<Slab>) -> Self {
        AgeSlabs {
            below_60: slabs,
            from_60_to_80: None,
            above_80: None,
        }
    }

    pub fn for_age(&self, age: AgeBand) -> &[Slab] {
        let table = match age {
            AgeBand::Below60 => None,
            AgeBand::From60To80 => self.from_60_to_80.as_ref(),
            AgeBand::Above80 => self.above_80.as_ref(),
        };
        table.unwrap_or(&self.below_60)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RegimeSlabs {
    pub old: AgeSlabs,
    pub new: AgeSlabs,
}

impl RegimeSlabs {
    pub fn for_regime(&self, regime: Regime) -> &AgeSlabs {
        match regime {
            Regime::Old => &self.old,
            Regime::New => &self.new,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Rebate {
    #[schemars(with = "f64")]
    pub limit: Decimal,
    #[schemars(with = "f64")]
    pub income_ceiling: Decimal,
}

/// Individuals, HUFs, AOPs, BOIs and artificial juridical persons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PersonalSchedule {
    pub slabs: RegimeSlabs,
    pub surcharge_rates: Vec<Slab>,
    #[serde(default)]
    pub surcharge_rates_new: Option<Vec<Slab>>,
    #[serde(default, rename = "REBATE_87A")]
    pub rebate_87a: Option<Rebate>,
    #[serde(default, rename = "REBATE_87A_NEW")]
    pub rebate_87a_new: Option<Rebate>,
}

impl PersonalSchedule {
    pub fn surcharge_for(&self, regime: Regime) -> &[Slab] {
        match (regime, &self.surcharge_rates_new) {
            (Regime::New, Some(rates)) => rates,
            _ => &self.surcharge_rates,
        }
    }

    pub fn rebate_for(&self, regime: Regime) -> Option<&Rebate> {
        match regime {
            Regime::New => self.rebate_87a_new.as_ref().or(self.rebate_87a.as_ref()),
            Regime::Old => self.rebate_87a.as_ref(),
        }
    }
}

/// Firms, LLPs and local authorities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FlatSchedule {
    #[schemars(with = "f64")]
    pub rate: Decimal,
    pub surcharge_rates: Vec<Slab>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DomesticCompanySchedule {
    /// Previous-year turnover at or below which the lower rate applies
    #[schemars(with = "f64")]
    pub turnover_threshold: Decimal,
    #[schemars(with = "f64")]
    pub rate_within_threshold: Decimal,
    #[schemars(with = "f64")]
    pub rate_above_threshold: Decimal,
    pub surcharge_rates: Vec<Slab>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CompanySchedules {
    pub domestic: DomesticCompanySchedule,
    pub foreign: FlatSchedule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DeductionLimits {
    #[schemars(with = "f64")]
    pub hp_loss_setoff_limit: Decimal,
    #[serde(rename = "HP_INTEREST_DEDUCTION_LIMIT_SOP")]
    #[schemars(with = "f64")]
    pub hp_interest_deduction_limit_sop: Decimal,
}

impl Default for DeductionLimits {
    fn default() -> Self {
        DeductionLimits {
            hp_loss_setoff_limit: dec!(200000),
            hp_interest_deduction_limit_sop: dec!(200000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TaxRates {
    #[schemars(with = "f64")]
    pub cess: Decimal,
    #[schemars(with = "f64")]
    pub winnings: Decimal,
    #[serde(rename = "DEEMED_INCOME_115BBE")]
    #[schemars(with = "f64")]
    pub deemed_income_115bbe: Decimal,
    #[schemars(with = "f64")]
    pub deemed_income_surcharge: Decimal,
    #[serde(rename = "STCG_111A")]
    #[schemars(with = "f64")]
    pub stcg_111a: Decimal,
    #[serde(rename = "LTCG_112A_EXEMPTION")]
    #[schemars(with = "f64")]
    pub ltcg_112a_exemption: Decimal,
    #[serde(rename = "LTCG_112A_RATE")]
    #[schemars(with = "f64")]
    pub ltcg_112a_rate: Decimal,
    #[schemars(with = "f64")]
    pub ltcg_other_rate: Decimal,
    /// Maximum marginal rate applied to trusts taxed as AOP
    #[serde(rename = "AOP_MMR")]
    #[schemars(with = "f64")]
    pub aop_mmr: Decimal,
    #[serde(rename = "FOREIGN_INCOME_115A_DIVIDEND_INTEREST")]
    #[schemars(with = "f64")]
    pub foreign_115a_dividend_interest: Decimal,
    #[serde(rename = "FOREIGN_INCOME_115A_ROYALTY_FTS")]
    #[schemars(with = "f64")]
    pub foreign_115a_royalty_fts: Decimal,
    #[serde(rename = "FOREIGN_INCOME_115BBA")]
    #[schemars(with = "f64")]
    pub foreign_115bba: Decimal,
    #[serde(rename = "FII_FPI_INTEREST_115AD")]
    #[schemars(with = "f64")]
    pub fii_fpi_interest_115ad: Decimal,
    #[serde(rename = "FII_FPI_LTCG_115AD")]
    #[schemars(with = "f64")]
    pub fii_fpi_ltcg_115ad: Decimal,
    #[serde(rename = "FII_FPI_STCG_OTHER_115AD")]
    #[schemars(with = "f64")]
    pub fii_fpi_stcg_other_115ad: Decimal,
    #[serde(rename = "GDR_FCCB_INCOME_115AC_ACA")]
    #[schemars(with = "f64")]
    pub gdr_fccb_income_115ac: Decimal,
    #[serde(rename = "GDR_FCCB_LTCG_115AC_ACA")]
    #[schemars(with = "f64")]
    pub gdr_fccb_ltcg_115ac: Decimal,
    #[serde(rename = "OFFSHORE_FUND_UNITS_INCOME_115AB")]
    #[schemars(with = "f64")]
    pub offshore_fund_income_115ab: Decimal,
    #[serde(rename = "OFFSHORE_FUND_UNITS_LTCG_115AB")]
    #[schemars(with = "f64")]
    pub offshore_fund_ltcg_115ab: Decimal,
    #[serde(rename = "SPECIFIED_FUND_UNITS_INCOME_115AE")]
    #[schemars(with = "f64")]
    pub specified_fund_income_115ae: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FilingDueDates {
    #[schemars(with = "String")]
    pub non_audit: NaiveDate,
    #[schemars(with = "String")]
    pub audit: NaiveDate,
}

/// Rates, limits and schedules in force for one assessment year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct YearConfig {
    pub new_regime_available: bool,
    #[serde(default)]
    pub deduction_limits: DeductionLimits,
    pub tax_rates: TaxRates,
    pub filing_due_dates: FilingDueDates,
    pub individual: PersonalSchedule,
    pub huf: PersonalSchedule,
    pub aop: PersonalSchedule,
    pub boi: PersonalSchedule,
    pub artificial_juridical_person: PersonalSchedule,
    pub firm: FlatSchedule,
    pub llp: FlatSchedule,
    pub local_authority: FlatSchedule,
    pub company: CompanySchedules,
}

/// Year-keyed configuration table with a fail-fast lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct YearConfiguration {
    years: BTreeMap<AssessmentYear, YearConfig>,
}

impl YearConfiguration {
    pub fn new() -> Self {
        YearConfiguration::default()
    }

    /// Tables for AY 2015-16 to 2024-25
    pub fn builtin() -> Self {
        let current = config_2024_25();
        let mut years = BTreeMap::new();
        for first_year in 2015..2024 {
            let mut config = current.clone();
            config.new_regime_available = first_year >= 2020;
            config.filing_due_dates = due_dates(first_year);
            years.insert(AssessmentYear(first_year), config);
        }
        years.insert(AssessmentYear(2024), current);
        YearConfiguration { years }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let configuration: YearConfiguration = serde_json::from_reader(reader)?;
        for (year, config) in &configuration.years {
            config.validate().map_err(|reason| {
                TaxError::InvalidConfiguration(format!("{}: {}", year, reason))
            })?;
        }
        Ok(configuration)
    }

    pub fn get(&self, year: AssessmentYear) -> Result<&YearConfig, TaxError> {
        self.years
            .get(&year)
            .ok_or(TaxError::ConfigurationMissing(year))
    }

    pub fn insert(&mut self, year: AssessmentYear, config: YearConfig) {
        self.years.insert(year, config);
    }

    /// Years in `other` replace the same years here
    pub fn merge(&mut self, other: YearConfiguration) {
        self.years.extend(other.years);
    }

    pub fn years(&self) -> impl Iterator<Item = AssessmentYear> + '_ {
        self.years.keys().copied()
    }
}

impl YearConfig {
    /// Slab limits must ascend and only the last slab may be unbounded
    fn validate(&self) -> Result<(), String> {
        let personal = [
            ("individual", &self.individual),
            ("huf", &self.huf),
            ("aop", &self.aop),
            ("boi", &self.boi),
            ("artificial_juridical_person", &self.artificial_juridical_person),
        ];
        for (name, schedule) in personal {
            for regime in [Regime::Old, Regime::New] {
                for age in [AgeBand::Below60, AgeBand::From60To80, AgeBand::Above80] {
                    check_ascending(schedule.slabs.for_regime(regime).for_age(age))
                        .map_err(|e| format!("{} slabs: {}", name, e))?;
                }
            }
        }
        Ok(())
    }
}

fn check_ascending(slabs: &[Slab]) -> Result<(), String> {
    let mut previous = Decimal::ZERO;
    for (i, slab) in slabs.iter().enumerate() {
        match slab.limit {
            Some(limit) if limit < previous => {
                return Err(format!("limit {} below previous limit {}", limit, previous))
            }
            Some(limit) => previous = limit,
            None if i + 1 != slabs.len() => {
                return Err("unbounded slab before the last".to_string())
            }
            None => {}
        }
    }
    Ok(())
}

fn due_dates(first_year: i32) -> FilingDueDates {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
    match first_year {
        2020 => FilingDueDates {
            non_audit: date(2020, 11, 30),
            audit: date(2021, 1, 31),
        },
        2019 => FilingDueDates {
            non_audit: date(2019, 8, 31),
            audit: date(2019, 10, 31),
        },
        2015 => FilingDueDates {
            non_audit: date(2015, 8, 31),
            audit: date(2015, 9, 30),
        },
        y => FilingDueDates {
            non_audit: date(y, 7, 31),
            audit: date(y, 10, 31),
        },
    }
}

fn personal_surcharge() -> Vec<Slab> {
    vec![
        Slab::upto(dec!(5000000), dec!(0.10)),
        Slab::upto(dec!(10000000), dec!(0.15)),
        Slab::upto(dec!(20000000), dec!(0.25)),
        Slab::upto(dec!(50000000), dec!(0.37)),
    ]
}

fn old_regime_below_60() -> Vec<Slab> {
    vec![
        Slab::upto(dec!(250000), dec!(0)),
        Slab::upto(dec!(500000), dec!(0.05)),
        Slab::upto(dec!(1000000), dec!(0.20)),
        Slab::above(dec!(0.30)),
    ]
}

fn new_regime_slabs() -> Vec<Slab> {
    vec![
        Slab::upto(dec!(300000), dec!(0)),
        Slab::upto(dec!(600000), dec!(0.05)),
        Slab::upto(dec!(900000), dec!(0.10)),
        Slab::upto(dec!(1200000), dec!(0.15)),
        Slab::upto(dec!(1500000), dec!(0.20)),
        Slab::above(dec!(0.30)),
    ]
}

fn non_individual_personal() -> PersonalSchedule {
    PersonalSchedule {
        slabs: RegimeSlabs {
            old: AgeSlabs::uniform(old_regime_below_60()),
            new: AgeSlabs::uniform(new_regime_slabs()),
        },
        surcharge_rates: personal_surcharge(),
        surcharge_rates_new: None,
        rebate_87a: None,
        rebate_87a_new: None,
    }
}

fn flat_30() -> FlatSchedule {
    FlatSchedule {
        rate: dec!(0.30),
        surcharge_rates: vec![Slab::upto(dec!(10000000), dec!(0.12))],
    }
}

fn config_2024_25() -> YearConfig {
    YearConfig {
        new_regime_available: true,
        deduction_limits: DeductionLimits::default(),
        tax_rates: TaxRates {
            cess: dec!(0.04),
            winnings: dec!(0.30),
            deemed_income_115bbe: dec!(0.60),
            deemed_income_surcharge: dec!(0.25),
            stcg_111a: dec!(0.15),
            ltcg_112a_exemption: dec!(100000),
            ltcg_112a_rate: dec!(0.10),
            ltcg_other_rate: dec!(0.20),
            aop_mmr: dec!(0.30),
            foreign_115a_dividend_interest: dec!(0.20),
            foreign_115a_royalty_fts: dec!(0.10),
            foreign_115bba: dec!(0.20),
            fii_fpi_interest_115ad: dec!(0.20),
            fii_fpi_ltcg_115ad: dec!(0.10),
            fii_fpi_stcg_other_115ad: dec!(0.30),
            gdr_fccb_income_115ac: dec!(0.10),
            gdr_fccb_ltcg_115ac: dec!(0.10),
            offshore_fund_income_115ab: dec!(0.10),
            offshore_fund_ltcg_115ab: dec!(0.10),
            specified_fund_income_115ae: dec!(0.10),
        },
        filing_due_dates: due_dates(2024),
        individual: PersonalSchedule {
            slabs: RegimeSlabs {
                old: AgeSlabs {
                    below_60: old_regime_below_60(),
                    from_60_to_80: Some(vec![
                        Slab::upto(dec!(300000), dec!(0)),
                        Slab::upto(dec!(500000), dec!(0.05)),
                        Slab::upto(dec!(1000000), dec!(0.20)),
                        Slab::above(dec!(0.30)),
                    ]),
                    above_80: Some(vec![
                        Slab::upto(dec!(500000), dec!(0)),
                        Slab::upto(dec!(1000000), dec!(0.20)),
                        Slab::above(dec!(0.30)),
                    ]),
                },
                new: AgeSlabs::uniform(new_regime_slabs()),
            },
            surcharge_rates: personal_surcharge(),
            surcharge_rates_new: Some(vec![
                Slab::upto(dec!(5000000), dec!(0.10)),
                Slab::upto(dec!(10000000), dec!(0.15)),
                Slab::upto(dec!(20000000), dec!(0.25)),
                Slab::above(dec!(0.25)),
            ]),
            rebate_87a: Some(Rebate {
                limit: dec!(12500),
                income_ceiling: dec!(500000),
            }),
            rebate_87a_new: Some(Rebate {
                limit: dec!(25000),
                income_ceiling: dec!(700000),
            }),
        },
        huf: non_individual_personal(),
        aop: non_individual_personal(),
        boi: non_individual_personal(),
        artificial_juridical_person: non_individual_personal(),
        firm: flat_30(),
        llp: flat_30(),
        local_authority: flat_30(),
        company: CompanySchedules {
            domestic: DomesticCompanySchedule {
                turnover_threshold: dec!(4000000000),
                rate_within_threshold: dec!(0.25),
                rate_above_threshold: dec!(0.30),
                surcharge_rates: vec![
                    Slab::upto(dec!(10000000), dec!(0.07)),
                    Slab::upto(dec!(100000000), dec!(0.12)),
                ],
            },
            foreign: FlatSchedule {
                rate: dec!(0.40),
                surcharge_rates: vec![
                    Slab::upto(dec!(10000000), dec!(0.02)),
                    Slab::upto(dec!(100000000), dec!(0.05)),
                ],
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_ten_years() {
        let config = YearConfiguration::builtin();
        let years: Vec<_> = config.years().collect();
        assert_eq!(years.first(), Some(&AssessmentYear(2015)));
        assert_eq!(years.last(), Some(&AssessmentYear(2024)));
        assert_eq!(years.len(), 10);
    }

    #[test]
    fn missing_year_fails_fast() {
        let config = YearConfiguration::builtin();
        assert_eq!(
            config.get(AssessmentYear(2026)).unwrap_err(),
            TaxError::ConfigurationMissing(AssessmentYear(2026))
        );
    }

    #[test]
    fn new_regime_from_2020_21() {
        let config = YearConfiguration::builtin();
        assert!(!config.get(AssessmentYear(2019)).unwrap().new_regime_available);
        assert!(config.get(AssessmentYear(2020)).unwrap().new_regime_available);
        assert!(config.get(AssessmentYear(2024)).unwrap().new_regime_available);
    }

    #[test]
    fn older_years_keep_their_due_dates() {
        let config = YearConfiguration::builtin();
        let ay_2020 = config.get(AssessmentYear(2020)).unwrap();
        assert_eq!(
            ay_2020.filing_due_dates.non_audit,
            NaiveDate::from_ymd_opt(2020, 11, 30).unwrap()
        );
        let ay_2024 = config.get(AssessmentYear(2024)).unwrap();
        assert_eq!(
            ay_2024.filing_due_dates.audit,
            NaiveDate::from_ymd_opt(2024, 10, 31).unwrap()
        );
    }

    #[test]
    fn age_band_falls_back_to_below_60() {
        let config = YearConfiguration::builtin();
        let year = config.get(AssessmentYear(2024)).unwrap();
        let huf_senior = year.huf.slabs.for_regime(Regime::Old).for_age(AgeBand::Above80);
        assert_eq!(huf_senior, old_regime_below_60().as_slice());
        let individual_senior = year
            .individual
            .slabs
            .for_regime(Regime::Old)
            .for_age(AgeBand::Above80);
        assert_eq!(individual_senior[0].limit, Some(dec!(500000)));
    }

    #[test]
    fn regime_specific_surcharge_and_rebate() {
        let config = YearConfiguration::builtin();
        let individual = &config.get(AssessmentYear(2024)).unwrap().individual;
        assert_eq!(individual.surcharge_for(Regime::New).last().unwrap().limit, None);
        assert_eq!(
            individual.surcharge_for(Regime::Old).last().unwrap().rate,
            dec!(0.37)
        );
        assert_eq!(individual.rebate_for(Regime::New).unwrap().limit, dec!(25000));
        assert_eq!(individual.rebate_for(Regime::Old).unwrap().limit, dec!(12500));
    }

    #[test]
    fn json_round_trip_and_merge() {
        let builtin = YearConfiguration::builtin();
        let json = serde_json::to_string(&builtin).unwrap();
        assert!(json.contains("\"2024-25\""));
        assert!(json.contains("\"REBATE_87A_NEW\""));

        let mut loaded = YearConfiguration::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(loaded, builtin);

        let mut override_year = YearConfiguration::new();
        let mut config = builtin.get(AssessmentYear(2024)).unwrap().clone();
        config.tax_rates.cess = dec!(0.05);
        override_year.insert(AssessmentYear(2024), config);
        loaded.merge(override_year);
        assert_eq!(
            loaded.get(AssessmentYear(2024)).unwrap().tax_rates.cess,
            dec!(0.05)
        );
        assert_eq!(
            loaded.get(AssessmentYear(2023)).unwrap().tax_rates.cess,
            dec!(0.04)
        );
    }

    #[test]
    fn descending_slabs_rejected() {
        assert!(check_ascending(&[
            Slab::upto(dec!(500000), dec!(0)),
            Slab::upto(dec!(250000), dec!(0.05)),
        ])
        .is_err());
        assert!(check_ascending(&[Slab::above(dec!(0.1)), Slab::above(dec!(0.2))]).is_err());
        assert!(check_ascending(&old_regime_below_60()).is_ok());
    }
}
