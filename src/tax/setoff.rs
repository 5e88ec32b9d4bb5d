use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::declaration::Losses;

/// Statutory income heads that losses are set off against
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Head {
    Salary,
    HouseProperty,
    BusinessNonSpeculative,
    BusinessSpeculative,
    #[serde(rename = "stcg_111a")]
    Stcg111A,
    StcgOther,
    #[serde(rename = "ltcg_112a")]
    Ltcg112A,
    LtcgOther,
    OtherSources,
    RaceHorse,
    Winnings,
}

impl Head {
    pub const ALL: [Head; 11] = [
        Head::Salary,
        Head::HouseProperty,
        Head::BusinessNonSpeculative,
        Head::BusinessSpeculative,
        Head::Stcg111A,
        Head::StcgOther,
        Head::Ltcg112A,
        Head::LtcgOther,
        Head::OtherSources,
        Head::RaceHorse,
        Head::Winnings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Head::Salary => "Salary",
            Head::HouseProperty => "House Property",
            Head::BusinessNonSpeculative => "Business Income",
            Head::BusinessSpeculative => "Speculative Income",
            Head::Stcg111A => "STCG (111A)",
            Head::StcgOther => "STCG (Other)",
            Head::Ltcg112A => "LTCG (112A)",
            Head::LtcgOther => "LTCG (Other)",
            Head::OtherSources => "Other Sources",
            Head::RaceHorse => "Race Horse Income",
            Head::Winnings => "Winnings",
        }
    }
}

impl std::fmt::Display for Head {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Income per head. Every amount is non-negative once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IncomePool {
    #[schemars(with = "f64")]
    pub salary: Decimal,
    #[schemars(with = "f64")]
    pub house_property: Decimal,
    #[schemars(with = "f64")]
    pub business_non_speculative: Decimal,
    #[schemars(with = "f64")]
    pub business_speculative: Decimal,
    #[serde(rename = "stcg_111a")]
    #[schemars(with = "f64")]
    pub stcg_111a: Decimal,
    #[schemars(with = "f64")]
    pub stcg_other: Decimal,
    #[serde(rename = "ltcg_112a")]
    #[schemars(with = "f64")]
    pub ltcg_112a: Decimal,
    #[schemars(with = "f64")]
    pub ltcg_other: Decimal,
    #[schemars(with = "f64")]
    pub other_sources: Decimal,
    #[schemars(with = "f64")]
    pub race_horse: Decimal,
    #[schemars(with = "f64")]
    pub winnings: Decimal,
}

impl IncomePool {
    pub fn get(&self, head: Head) -> Decimal {
        match head {
            Head::Salary => self.salary,
            Head::HouseProperty => self.house_property,
            Head::BusinessNonSpeculative => self.business_non_speculative,
            Head::BusinessSpeculative => self.business_speculative,
            Head::Stcg111A => self.stcg_111a,
            Head::StcgOther => self.stcg_other,
            Head::Ltcg112A => self.ltcg_112a,
            Head::LtcgOther => self.ltcg_other,
            Head::OtherSources => self.other_sources,
            Head::RaceHorse => self.race_horse,
            Head::Winnings => self.winnings,
        }
    }

    fn slot_mut(&mut self, head: Head) -> &mut Decimal {
        match head {
            Head::Salary => &mut self.salary,
            Head::HouseProperty => &mut self.house_property,
            Head::BusinessNonSpeculative => &mut self.business_non_speculative,
            Head::BusinessSpeculative => &mut self.business_speculative,
            Head::Stcg111A => &mut self.stcg_111a,
            Head::StcgOther => &mut self.stcg_other,
            Head::Ltcg112A => &mut self.ltcg_112a,
            Head::LtcgOther => &mut self.ltcg_other,
            Head::OtherSources => &mut self.other_sources,
            Head::RaceHorse => &mut self.race_horse,
            Head::Winnings => &mut self.winnings,
        }
    }

    /// Add a (possibly negative) raw amount to a head
    pub fn add(&mut self, head: Head, amount: Decimal) {
        *self.slot_mut(head) += amount;
    }

    /// Add every head of `other` into this pool
    pub fn merge(&mut self, other: &IncomePool) {
        for head in Head::ALL {
            self.add(head, other.get(head));
        }
    }

    /// Floor every head at zero
    pub fn non_negative(mut self) -> Self {
        for head in Head::ALL {
            let slot = self.slot_mut(head);
            *slot = (*slot).max(Decimal::ZERO);
        }
        self
    }

    pub fn total(&self) -> Decimal {
        Head::ALL.iter().map(|&head| self.get(head)).sum()
    }
}

/// Where a set-off amount came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LossSource {
    CurrentSpeculative,
    CurrentRaceHorse,
    CurrentStcl,
    CurrentLtcl,
    CurrentHouseProperty,
    CurrentBusiness,
    BroughtForwardUnabsorbedDepreciation,
    BroughtForwardBusiness,
    BroughtForwardSpeculative,
    BroughtForwardHouseProperty,
    BroughtForwardRaceHorse,
    BroughtForwardStcl,
    BroughtForwardLtcl,
}

impl LossSource {
    pub fn label(&self) -> &'static str {
        match self {
            LossSource::CurrentSpeculative => "CY Speculative Loss",
            LossSource::CurrentRaceHorse => "CY Race Horse Loss",
            LossSource::CurrentStcl => "CY STCL",
            LossSource::CurrentLtcl => "CY LTCL",
            LossSource::CurrentHouseProperty => "CY HP Loss",
            LossSource::CurrentBusiness => "CY Business Loss",
            LossSource::BroughtForwardUnabsorbedDepreciation => "BF Unabsorbed Depreciation",
            LossSource::BroughtForwardBusiness => "BF Business Loss",
            LossSource::BroughtForwardSpeculative => "BF Speculative Loss",
            LossSource::BroughtForwardHouseProperty => "BF HP Loss",
            LossSource::BroughtForwardRaceHorse => "BF Race Horse Loss",
            LossSource::BroughtForwardStcl => "BF STCL",
            LossSource::BroughtForwardLtcl => "BF LTCL",
        }
    }
}

impl std::fmt::Display for LossSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One transfer from a loss to an income head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SetOffEntry {
    pub source: LossSource,
    pub against: Head,
    #[schemars(with = "f64")]
    pub amount: Decimal,
}

/// Losses left after set-off (current-year plus brought-forward remainders)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CarriedForward {
    #[schemars(with = "f64")]
    pub house_property: Decimal,
    #[schemars(with = "f64")]
    pub business_non_speculative: Decimal,
    #[schemars(with = "f64")]
    pub business_speculative: Decimal,
    #[schemars(with = "f64")]
    pub stcl: Decimal,
    #[schemars(with = "f64")]
    pub ltcl: Decimal,
    #[schemars(with = "f64")]
    pub race_horses: Decimal,
    #[schemars(with = "f64")]
    pub unabsorbed_depreciation: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetOff {
    pub pool: IncomePool,
    pub ledger: Vec<SetOffEntry>,
    pub carried_forward: CarriedForward,
}

impl SetOff {
    /// Total consumed from one loss source
    pub fn transferred_from(&self, source: LossSource) -> Decimal {
        self.ledger
            .iter()
            .filter(|entry| entry.source == source)
            .map(|entry| entry.amount)
            .sum()
    }
}

const CAPITAL_GAINS_FOR_STCL: [Head; 4] = [
    Head::StcgOther,
    Head::Stcg111A,
    Head::LtcgOther,
    Head::Ltcg112A,
];

const CAPITAL_GAINS_FOR_LTCL: [Head; 2] = [Head::LtcgOther, Head::Ltcg112A];

const HOUSE_PROPERTY_LOSS_ORDER: [Head; 10] = [
    Head::BusinessNonSpeculative,
    Head::BusinessSpeculative,
    Head::StcgOther,
    Head::LtcgOther,
    Head::OtherSources,
    Head::RaceHorse,
    Head::Salary,
    Head::Stcg111A,
    Head::Ltcg112A,
    Head::Winnings,
];

const BUSINESS_LOSS_ORDER: [Head; 9] = [
    Head::HouseProperty,
    Head::BusinessSpeculative,
    Head::StcgOther,
    Head::LtcgOther,
    Head::OtherSources,
    Head::RaceHorse,
    Head::Stcg111A,
    Head::Ltcg112A,
    Head::Winnings,
];

const UNABSORBED_DEPRECIATION_ORDER: [Head; 10] = [
    Head::HouseProperty,
    Head::BusinessNonSpeculative,
    Head::BusinessSpeculative,
    Head::StcgOther,
    Head::LtcgOther,
    Head::OtherSources,
    Head::RaceHorse,
    Head::Stcg111A,
    Head::Ltcg112A,
    Head::Winnings,
];

struct Engine {
    pool: IncomePool,
    ledger: Vec<SetOffEntry>,
}

impl Engine {
    /// Consume `loss` against each target in order, returning what is left
    fn consume(&mut self, source: LossSource, mut loss: Decimal, targets: &[Head]) -> Decimal {
        for &head in targets {
            if loss <= Decimal::ZERO {
                break;
            }
            let slot = self.pool.slot_mut(head);
            let reduction = loss.min(*slot);
            if reduction > Decimal::ZERO {
                *slot -= reduction;
                loss -= reduction;
                log::debug!(
                    "Set-off {} -> {}: amount={}, remaining loss={}, remaining income={}",
                    source,
                    head,
                    reduction,
                    loss,
                    *slot
                );
                self.ledger.push(SetOffEntry {
                    source,
                    against: head,
                    amount: reduction,
                });
            }
        }
        loss
    }
}

/// Set losses off against the pooled income in the statutory order.
///
/// `house_property_loss` is the current-year aggregate house-property loss;
/// only `hp_setoff_limit` of it may be set off against other heads.
pub fn set_off_losses(
    pool: IncomePool,
    house_property_loss: Decimal,
    losses: &Losses,
    hp_setoff_limit: Decimal,
) -> SetOff {
    let mut engine = Engine {
        pool: pool.non_negative(),
        ledger: Vec::new(),
    };
    let positive = |amount: Decimal| amount.max(Decimal::ZERO);
    let cy = &losses.current_year;
    let bf = &losses.brought_forward;

    // Intra-head, current year
    let cy_speculative = engine.consume(
        LossSource::CurrentSpeculative,
        positive(cy.business_speculative),
        &[Head::BusinessSpeculative],
    );
    let cy_race_horses = engine.consume(
        LossSource::CurrentRaceHorse,
        positive(cy.race_horses),
        &[Head::RaceHorse],
    );
    let cy_stcl = engine.consume(
        LossSource::CurrentStcl,
        positive(cy.stcl),
        &CAPITAL_GAINS_FOR_STCL,
    );
    let cy_ltcl = engine.consume(
        LossSource::CurrentLtcl,
        positive(cy.ltcl),
        &CAPITAL_GAINS_FOR_LTCL,
    );

    // Inter-head, current year
    let hp_loss = positive(house_property_loss);
    let hp_allowed = hp_loss.min(positive(hp_setoff_limit));
    let hp_unused = engine.consume(
        LossSource::CurrentHouseProperty,
        hp_allowed,
        &HOUSE_PROPERTY_LOSS_ORDER,
    );
    let cy_house_property = hp_loss - (hp_allowed - hp_unused);
    let cy_business = engine.consume(
        LossSource::CurrentBusiness,
        positive(cy.business_non_speculative),
        &BUSINESS_LOSS_ORDER,
    );

    // Brought forward
    let bf_depreciation = engine.consume(
        LossSource::BroughtForwardUnabsorbedDepreciation,
        positive(bf.unabsorbed_depreciation),
        &UNABSORBED_DEPRECIATION_ORDER,
    );
    let bf_business = engine.consume(
        LossSource::BroughtForwardBusiness,
        positive(bf.business_non_speculative),
        &[Head::BusinessNonSpeculative],
    );
    let bf_speculative = engine.consume(
        LossSource::BroughtForwardSpeculative,
        positive(bf.business_speculative),
        &[Head::BusinessSpeculative],
    );
    let bf_house_property = engine.consume(
        LossSource::BroughtForwardHouseProperty,
        positive(bf.house_property),
        &[Head::HouseProperty],
    );
    let bf_race_horses = engine.consume(
        LossSource::BroughtForwardRaceHorse,
        positive(bf.race_horses),
        &[Head::RaceHorse],
    );
    let bf_stcl = engine.consume(
        LossSource::BroughtForwardStcl,
        positive(bf.stcl),
        &CAPITAL_GAINS_FOR_STCL,
    );
    let bf_ltcl = engine.consume(
        LossSource::BroughtForwardLtcl,
        positive(bf.ltcl),
        &CAPITAL_GAINS_FOR_LTCL,
    );

    SetOff {
        pool: engine.pool,
        ledger: engine.ledger,
        carried_forward: CarriedForward {
            house_property: cy_house_property + bf_house_property,
            business_non_speculative: cy_business + bf_business,
            business_speculative: cy_speculative + bf_speculative,
            stcl: cy_stcl + bf_stcl,
            ltcl: cy_ltcl + bf_ltcl,
            race_horses: cy_race_horses + bf_race_horses,
            unabsorbed_depreciation: bf_depreciation,
        },
    }
}
