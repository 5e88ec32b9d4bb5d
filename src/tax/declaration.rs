use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

use super::error::TaxError;
use super::year::AssessmentYear;

/// Largest magnitude accepted for any declared amount (10^15 rupees).
/// Keeps every sum and product in the computation inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Line items keyed by an enumerated component of a head.
pub type HeadItems<K> = BTreeMap<K, Vec<LineItem>>;

/// Look up the line items recorded for one component (empty if none).
pub fn items_for<K: Ord>(map: &HeadItems<K>, key: K) -> &[LineItem] {
    map.get(&key).map(Vec::as_slice).unwrap_or(&[])
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Residency {
    #[default]
    ResidentOrdinary,
    ResidentNotOrdinary,
    NonResident,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    #[default]
    Individual,
    Huf,
    Aop,
    Boi,
    ArtificialJuridicalPerson,
    Firm,
    Llp,
    LocalAuthority,
    Company,
    Trust,
}

impl EntityType {
    /// Entities taxed on personal slab tables (and eligible for regime choice)
    pub fn is_individual_like(self) -> bool {
        matches!(
            self,
            EntityType::Individual
                | EntityType::Huf
                | EntityType::Aop
                | EntityType::Boi
                | EntityType::ArtificialJuridicalPerson
        )
    }

    /// Entities whose return falls due on the audit-case date
    pub fn is_audit_case(self) -> bool {
        matches!(
            self,
            EntityType::Company | EntityType::Firm | EntityType::Llp | EntityType::LocalAuthority
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
pub enum AgeBand {
    #[default]
    #[serde(rename = "below_60")]
    Below60,
    #[serde(rename = "60_to_80")]
    From60To80,
    #[serde(rename = "above_80")]
    Above80,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    #[default]
    Old,
    New,
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regime::Old => write!(f, "Old"),
            Regime::New => write!(f, "New"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CompanyKind {
    #[default]
    Domestic,
    Foreign,
}

/// Where a line item was sourced. Anything other than "India" is foreign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceLocation {
    India,
    Foreign(String),
}

impl From<String> for SourceLocation {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("india") {
            SourceLocation::India
        } else {
            SourceLocation::Foreign(value)
        }
    }
}

impl From<SourceLocation> for String {
    fn from(location: SourceLocation) -> Self {
        match location {
            SourceLocation::India => "India".to_string(),
            SourceLocation::Foreign(country) => country,
        }
    }
}

/// A single declared amount and where it arose
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineItem {
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub amount: Option<Decimal>,
    /// "India" or the foreign country of source
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub location: Option<SourceLocation>,
}

impl LineItem {
    pub fn india(amount: Decimal) -> Self {
        LineItem {
            amount: Some(amount),
            location: Some(SourceLocation::India),
        }
    }

    pub fn foreign(amount: Decimal, country: &str) -> Self {
        LineItem {
            amount: Some(amount),
            location: Some(SourceLocation::Foreign(country.to_string())),
        }
    }

    pub fn is_india_sourced(&self) -> bool {
        matches!(self.location, Some(SourceLocation::India))
    }
}

/// Salary components. Exemptions and deductions are entered as signed additions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SalaryComponent {
    BasicSalary,
    Allowances,
    BonusAndCommission,
    RentFreeAccommodation,
    MotorCar,
    OtherPerquisites,
    TerminationCompensation,
    CommutedPension,
    RetrenchmentCompensation,
    VrsCompensation,
    OtherProfitsInLieu,
    ExemptHra,
    ExemptLta,
    ExemptGratuity,
    ExemptLeaveEncashment,
    ExemptCommutedPension,
    ExemptRetrenchmentCompensation,
    ExemptVrsCompensation,
    ExemptProvidentFund,
    ExemptSuperannuationFund,
    ExemptSpecialAllowances,
    OtherExemptions,
    ProfessionalTax,
    EntertainmentAllowance,
}

impl SalaryComponent {
    pub const ALL: [SalaryComponent; 24] = [
        SalaryComponent::BasicSalary,
        SalaryComponent::Allowances,
        SalaryComponent::BonusAndCommission,
        SalaryComponent::RentFreeAccommodation,
        SalaryComponent::MotorCar,
        SalaryComponent::OtherPerquisites,
        SalaryComponent::TerminationCompensation,
        SalaryComponent::CommutedPension,
        SalaryComponent::RetrenchmentCompensation,
        SalaryComponent::VrsCompensation,
        SalaryComponent::OtherProfitsInLieu,
        SalaryComponent::ExemptHra,
        SalaryComponent::ExemptLta,
        SalaryComponent::ExemptGratuity,
        SalaryComponent::ExemptLeaveEncashment,
        SalaryComponent::ExemptCommutedPension,
        SalaryComponent::ExemptRetrenchmentCompensation,
        SalaryComponent::ExemptVrsCompensation,
        SalaryComponent::ExemptProvidentFund,
        SalaryComponent::ExemptSuperannuationFund,
        SalaryComponent::ExemptSpecialAllowances,
        SalaryComponent::OtherExemptions,
        SalaryComponent::ProfessionalTax,
        SalaryComponent::EntertainmentAllowance,
    ];
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum CapitalGainsComponent {
    #[serde(rename = "stcg_111a")]
    Stcg111A,
    #[serde(rename = "stcg_other")]
    StcgOther,
    #[serde(rename = "ltcg_112a")]
    Ltcg112A,
    #[serde(rename = "ltcg_other")]
    LtcgOther,
    #[serde(rename = "adjustment_50c")]
    Adjustment50C,
    #[serde(rename = "adjustment_50ca")]
    Adjustment50CA,
    #[serde(rename = "adjustment_50d")]
    Adjustment50D,
    #[serde(rename = "adjustment_50")]
    Adjustment50,
    #[serde(rename = "cost_of_improvement")]
    CostOfImprovement,
    #[serde(rename = "exemption_54")]
    Exemption54,
    #[serde(rename = "exemption_54b_ltcg")]
    Exemption54BLtcg,
    #[serde(rename = "exemption_54b_stcg")]
    Exemption54BStcg,
    #[serde(rename = "exemption_54d")]
    Exemption54D,
    #[serde(rename = "exemption_54ec")]
    Exemption54EC,
    #[serde(rename = "exemption_54ee")]
    Exemption54EE,
    #[serde(rename = "exemption_54f")]
    Exemption54F,
    #[serde(rename = "exemption_54g")]
    Exemption54G,
    #[serde(rename = "exemption_54ga")]
    Exemption54GA,
    #[serde(rename = "exemption_54gb")]
    Exemption54GB,
    /// Stamp-duty value adjustment on stock-in-trade; assessed as business income
    #[serde(rename = "adjustment_43ca")]
    Adjustment43CA,
}

/// Which pool a capital gains component feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapitalGainsRole {
    Stcg111A,
    StcgOther,
    Ltcg112A,
    LtcgOther,
    /// Adjustments and exemption reversals, pooled with STCG (other)
    Adjustment,
    /// Added to non-speculative business income
    Business,
}

impl CapitalGainsComponent {
    pub const ALL: [CapitalGainsComponent; 20] = [
        CapitalGainsComponent::Stcg111A,
        CapitalGainsComponent::StcgOther,
        CapitalGainsComponent::Ltcg112A,
        CapitalGainsComponent::LtcgOther,
        CapitalGainsComponent::Adjustment50C,
        CapitalGainsComponent::Adjustment50CA,
        CapitalGainsComponent::Adjustment50D,
        CapitalGainsComponent::Adjustment50,
        CapitalGainsComponent::CostOfImprovement,
        CapitalGainsComponent::Exemption54,
        CapitalGainsComponent::Exemption54BLtcg,
        CapitalGainsComponent::Exemption54BStcg,
        CapitalGainsComponent::Exemption54D,
        CapitalGainsComponent::Exemption54EC,
        CapitalGainsComponent::Exemption54EE,
        CapitalGainsComponent::Exemption54F,
        CapitalGainsComponent::Exemption54G,
        CapitalGainsComponent::Exemption54GA,
        CapitalGainsComponent::Exemption54GB,
        CapitalGainsComponent::Adjustment43CA,
    ];

    pub fn role(self) -> CapitalGainsRole {
        match self {
            CapitalGainsComponent::Stcg111A => CapitalGainsRole::Stcg111A,
            CapitalGainsComponent::StcgOther => CapitalGainsRole::StcgOther,
            CapitalGainsComponent::Ltcg112A => CapitalGainsRole::Ltcg112A,
            CapitalGainsComponent::LtcgOther => CapitalGainsRole::LtcgOther,
            CapitalGainsComponent::Adjustment43CA => CapitalGainsRole::Business,
            CapitalGainsComponent::Adjustment50C
            | CapitalGainsComponent::Adjustment50CA
            | CapitalGainsComponent::Adjustment50D
            | CapitalGainsComponent::Adjustment50
            | CapitalGainsComponent::CostOfImprovement
            | CapitalGainsComponent::Exemption54
            | CapitalGainsComponent::Exemption54BLtcg
            | CapitalGainsComponent::Exemption54BStcg
            | CapitalGainsComponent::Exemption54D
            | CapitalGainsComponent::Exemption54EC
            | CapitalGainsComponent::Exemption54EE
            | CapitalGainsComponent::Exemption54F
            | CapitalGainsComponent::Exemption54G
            | CapitalGainsComponent::Exemption54GA
            | CapitalGainsComponent::Exemption54GB => CapitalGainsRole::Adjustment,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum OtherSourcesComponent {
    OtherIncomes,
    DeemedDividend,
    Gifts,
    FamilyPension,
    InterestOnEnhancedCompensation,
    Disallowance14a,
    OtherExemptIncomeSec10,
    RaceHorseIncome,
    Winnings,
    /// Exempt agricultural income; reported, never taxed
    AgriculturalIncome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherSourcesRole {
    OtherSources,
    RaceHorse,
    Winnings,
    Agricultural,
}

impl OtherSourcesComponent {
    pub const ALL: [OtherSourcesComponent; 10] = [
        OtherSourcesComponent::OtherIncomes,
        OtherSourcesComponent::DeemedDividend,
        OtherSourcesComponent::Gifts,
        OtherSourcesComponent::FamilyPension,
        OtherSourcesComponent::InterestOnEnhancedCompensation,
        OtherSourcesComponent::Disallowance14a,
        OtherSourcesComponent::OtherExemptIncomeSec10,
        OtherSourcesComponent::RaceHorseIncome,
        OtherSourcesComponent::Winnings,
        OtherSourcesComponent::AgriculturalIncome,
    ];

    pub fn role(self) -> OtherSourcesRole {
        match self {
            OtherSourcesComponent::RaceHorseIncome => OtherSourcesRole::RaceHorse,
            OtherSourcesComponent::Winnings => OtherSourcesRole::Winnings,
            OtherSourcesComponent::AgriculturalIncome => OtherSourcesRole::Agricultural,
            OtherSourcesComponent::OtherIncomes
            | OtherSourcesComponent::DeemedDividend
            | OtherSourcesComponent::Gifts
            | OtherSourcesComponent::FamilyPension
            | OtherSourcesComponent::InterestOnEnhancedCompensation
            | OtherSourcesComponent::Disallowance14a
            | OtherSourcesComponent::OtherExemptIncomeSec10 => OtherSourcesRole::OtherSources,
        }
    }
}

/// Unexplained credits, investments and expenditure taxed at the punitive rate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum DeemedIncomeSection {
    #[serde(rename = "68_cash_credits")]
    CashCredits68,
    #[serde(rename = "69_unexplained_investments")]
    UnexplainedInvestments69,
    #[serde(rename = "69a_unexplained_money")]
    UnexplainedMoney69A,
    #[serde(rename = "69b_undisclosed_investments")]
    UndisclosedInvestments69B,
    #[serde(rename = "69c_unexplained_expenditure")]
    UnexplainedExpenditure69C,
    #[serde(rename = "69d_hundi_borrowing")]
    HundiBorrowing69D,
}

impl DeemedIncomeSection {
    pub const ALL: [DeemedIncomeSection; 6] = [
        DeemedIncomeSection::CashCredits68,
        DeemedIncomeSection::UnexplainedInvestments69,
        DeemedIncomeSection::UnexplainedMoney69A,
        DeemedIncomeSection::UndisclosedInvestments69B,
        DeemedIncomeSection::UnexplainedExpenditure69C,
        DeemedIncomeSection::HundiBorrowing69D,
    ];
}

/// Chapter VI-A deductions disallowed on assessment; added back to total income
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum DeductionHead {
    #[serde(rename = "80c")]
    Sec80C,
    #[serde(rename = "80ccd_1b")]
    Sec80CCD1B,
    #[serde(rename = "80ccd_1b_minor")]
    Sec80CCD1BMinor,
    #[serde(rename = "80ccd_2")]
    Sec80CCD2,
    #[serde(rename = "80d")]
    Sec80D,
    #[serde(rename = "80dd")]
    Sec80DD,
    #[serde(rename = "80ddb")]
    Sec80DDB,
    #[serde(rename = "80e")]
    Sec80E,
    #[serde(rename = "80g")]
    Sec80G,
    #[serde(rename = "80ggc")]
    Sec80GGC,
    #[serde(rename = "80tta")]
    Sec80TTA,
    #[serde(rename = "80ttb")]
    Sec80TTB,
    #[serde(rename = "80u")]
    Sec80U,
    #[serde(rename = "80jjaa")]
    Sec80JJAA,
    #[serde(rename = "80gg")]
    Sec80GG,
    #[serde(rename = "80gga")]
    Sec80GGA,
    #[serde(rename = "80qqb")]
    Sec80QQB,
    #[serde(rename = "80rrb")]
    Sec80RRB,
    #[serde(rename = "80ia")]
    Sec80IA,
}

impl DeductionHead {
    pub const ALL: [DeductionHead; 19] = [
        DeductionHead::Sec80C,
        DeductionHead::Sec80CCD1B,
        DeductionHead::Sec80CCD1BMinor,
        DeductionHead::Sec80CCD2,
        DeductionHead::Sec80D,
        DeductionHead::Sec80DD,
        DeductionHead::Sec80DDB,
        DeductionHead::Sec80E,
        DeductionHead::Sec80G,
        DeductionHead::Sec80GGC,
        DeductionHead::Sec80TTA,
        DeductionHead::Sec80TTB,
        DeductionHead::Sec80U,
        DeductionHead::Sec80JJAA,
        DeductionHead::Sec80GG,
        DeductionHead::Sec80GGA,
        DeductionHead::Sec80QQB,
        DeductionHead::Sec80RRB,
        DeductionHead::Sec80IA,
    ];
}

/// Disallowances and additions made to declared business profit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum BusinessAddition {
    UnreportedSales,
    UnaccountedBusinessIncome,
    BogusPurchases,
    UnrecordedCredits,
    GpNpRatioDifference,
    StockSuppression,
    EmployeeContributions,
    Provisions,
    BorrowedCapitalInterest,
    NonBusinessExpenditure,
    PersonalExpenditure,
    CapitalExpenditure,
    TdsDefault,
    PartnerPayments,
    RelatedPartyPayments,
    CashPayments,
    GratuityProvision,
    UnapprovedFunds,
    StatutoryDues,
    ExemptIncomeExpenditure,
    IncorrectDepreciation,
    UnexplainedExpenditure,
    OtherDisallowances,
}

impl BusinessAddition {
    pub const ALL: [BusinessAddition; 23] = [
        BusinessAddition::UnreportedSales,
        BusinessAddition::UnaccountedBusinessIncome,
        BusinessAddition::BogusPurchases,
        BusinessAddition::UnrecordedCredits,
        BusinessAddition::GpNpRatioDifference,
        BusinessAddition::StockSuppression,
        BusinessAddition::EmployeeContributions,
        BusinessAddition::Provisions,
        BusinessAddition::BorrowedCapitalInterest,
        BusinessAddition::NonBusinessExpenditure,
        BusinessAddition::PersonalExpenditure,
        BusinessAddition::CapitalExpenditure,
        BusinessAddition::TdsDefault,
        BusinessAddition::PartnerPayments,
        BusinessAddition::RelatedPartyPayments,
        BusinessAddition::CashPayments,
        BusinessAddition::GratuityProvision,
        BusinessAddition::UnapprovedFunds,
        BusinessAddition::StatutoryDues,
        BusinessAddition::ExemptIncomeExpenditure,
        BusinessAddition::IncorrectDepreciation,
        BusinessAddition::UnexplainedExpenditure,
        BusinessAddition::OtherDisallowances,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HouseProperty {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub gross_rent: Vec<LineItem>,
    #[serde(default)]
    pub municipal_taxes: Vec<LineItem>,
    #[serde(default)]
    pub interest_on_loan: Vec<LineItem>,
    #[serde(default)]
    pub self_occupied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    Heavy,
    #[default]
    Other,
}

/// Goods carriage for the 44AE scheme
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GoodsVehicle {
    #[serde(default)]
    pub kind: VehicleKind,
    /// Gross vehicle weight in tonnes (heavy vehicles only)
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub tonnage: Option<Decimal>,
    /// Months owned during the year
    #[serde(default)]
    pub months: Option<u32>,
}

/// How business income is determined; each scheme carries only its own inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind")]
pub enum PresumptiveScheme {
    /// Books of account: net profit plus disallowances
    #[serde(rename = "regular")]
    Regular {
        #[serde(default)]
        net_profit: Vec<LineItem>,
        #[serde(default)]
        additions: HeadItems<BusinessAddition>,
    },
    #[serde(rename = "44ad")]
    Sec44AD {
        #[serde(default)]
        digital_turnover: Vec<LineItem>,
        #[serde(default)]
        other_turnover: Vec<LineItem>,
    },
    #[serde(rename = "44ada")]
    Sec44ADA {
        #[serde(default)]
        gross_receipts: Vec<LineItem>,
    },
    #[serde(rename = "44ae")]
    Sec44AE {
        #[serde(default)]
        vehicles: Vec<GoodsVehicle>,
    },
    #[serde(rename = "44b")]
    Sec44B {
        #[serde(default)]
        aggregate_receipts: Vec<LineItem>,
    },
    #[serde(rename = "44bb")]
    Sec44BB {
        #[serde(default)]
        aggregate_receipts: Vec<LineItem>,
    },
    #[serde(rename = "44bba")]
    Sec44BBA {
        #[serde(default)]
        aggregate_receipts: Vec<LineItem>,
    },
    #[serde(rename = "44bbb")]
    Sec44BBB {
        #[serde(default)]
        aggregate_receipts: Vec<LineItem>,
    },
}

impl Default for PresumptiveScheme {
    fn default() -> Self {
        PresumptiveScheme::Regular {
            net_profit: Vec::new(),
            additions: HeadItems::new(),
        }
    }
}

impl PresumptiveScheme {
    /// 44AD/44ADA taxpayers pay advance tax in a single installment
    pub fn is_single_installment(&self) -> bool {
        matches!(
            self,
            PresumptiveScheme::Sec44AD { .. } | PresumptiveScheme::Sec44ADA { .. }
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Business {
    /// Control and management of the business is situated in India
    #[serde(default)]
    pub controlled_from_india: bool,
    #[serde(default)]
    pub speculative_income: Vec<LineItem>,
    #[serde(default)]
    pub scheme: PresumptiveScheme,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CurrentYearLosses {
    #[serde(default)]
    #[schemars(with = "f64")]
    pub business_non_speculative: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub business_speculative: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub stcl: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub ltcl: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub race_horses: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BroughtForwardLosses {
    #[serde(default)]
    #[schemars(with = "f64")]
    pub house_property: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub business_non_speculative: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub business_speculative: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub stcl: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub ltcl: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub race_horses: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub unabsorbed_depreciation: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Losses {
    #[serde(default)]
    pub current_year: CurrentYearLosses,
    #[serde(default)]
    pub brought_forward: BroughtForwardLosses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ForeignIncomeNature {
    #[default]
    Salary,
    BusinessProfessional,
    HouseProperty,
    Interest,
    Dividend,
    Royalty,
    FeesForTechnicalServices,
    ShortTermCapitalGain,
    LongTermCapitalGain,
    Others,
}

impl ForeignIncomeNature {
    pub fn is_capital_gain(self) -> bool {
        matches!(
            self,
            ForeignIncomeNature::ShortTermCapitalGain | ForeignIncomeNature::LongTermCapitalGain
        )
    }
}

/// Special-rate section claimed for a foreign income item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum SpecialSection {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "115A")]
    Sec115A,
    #[serde(rename = "115AB")]
    Sec115AB,
    #[serde(rename = "115AC")]
    Sec115AC,
    #[serde(rename = "115ACA")]
    Sec115ACA,
    #[serde(rename = "115AD")]
    Sec115AD,
    #[serde(rename = "115AE")]
    Sec115AE,
    #[serde(rename = "115BBA")]
    Sec115BBA,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransferPricing {
    #[serde(default)]
    pub associated_enterprise: bool,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub arms_length_price: Option<Decimal>,
}

/// Income earned outside India, amounts already converted to INR
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignIncomeItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub nature: ForeignIncomeNature,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub amount: Option<Decimal>,
    /// Tax paid outside India
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub tax_paid: Option<Decimal>,
    #[serde(default)]
    pub special_section: SpecialSection,
    #[serde(default)]
    pub is_ltcg: bool,
    #[serde(default)]
    pub dtaa_applicable: bool,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub dtaa_rate: Option<Decimal>,
    /// Form 67 (foreign tax credit statement) was filed
    #[serde(default)]
    pub form67_filed: bool,
    #[serde(default)]
    pub transfer_pricing: Option<TransferPricing>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrustReceipts {
    /// Receipts disallowed u/s 12A/12AA/12AB
    #[serde(default)]
    pub disallowed_12a: Vec<LineItem>,
    /// Receipts disallowed u/s 10(23C)
    #[serde(default)]
    pub disallowed_10_23c: Vec<LineItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    /// Late return, or first return filed in response to a notice
    #[default]
    Regular,
    /// No return filed; assessed u/s 144
    BestJudgment,
    /// Reassessment u/s 147 after an earlier assessment
    Reassessment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AdvanceTaxInstallments {
    #[serde(default)]
    #[schemars(with = "f64")]
    pub q1: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub q2: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub q3: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub q4: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FilingDetails {
    /// Due date of the return (YYYY-MM-DD); defaults to the configured date for the year
    #[serde(default)]
    pub due_date: Option<String>,
    /// Date the return was filed, or assessment completed (YYYY-MM-DD)
    #[serde(default)]
    pub actual_date: Option<String>,
    #[serde(default)]
    pub assessment_type: AssessmentType,
    /// Due date under the s.148 notice (YYYY-MM-DD)
    #[serde(default)]
    pub notice_148_due_date: Option<String>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub tax_on_earlier_assessment: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub income_as_per_earlier_assessment: Option<Decimal>,
    #[serde(default)]
    pub installments: AdvanceTaxInstallments,
}

/// Immutable snapshot of everything declared for one assessment year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Declaration {
    pub assessment_year: AssessmentYear,
    #[serde(default)]
    pub entity: EntityType,
    #[serde(default)]
    pub age: AgeBand,
    #[serde(default)]
    pub company_kind: CompanyKind,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub previous_year_turnover: Option<Decimal>,
    #[serde(default)]
    pub residency: Residency,
    #[serde(default)]
    pub regime: Regime,
    #[serde(default)]
    pub salary: HeadItems<SalaryComponent>,
    #[serde(default)]
    pub house_properties: Vec<HouseProperty>,
    #[serde(default)]
    pub business: Business,
    #[serde(default)]
    pub capital_gains: HeadItems<CapitalGainsComponent>,
    #[serde(default)]
    pub other_sources: HeadItems<OtherSourcesComponent>,
    #[serde(default)]
    pub deemed_income: HeadItems<DeemedIncomeSection>,
    #[serde(default)]
    pub deductions: HeadItems<DeductionHead>,
    #[serde(default)]
    pub international_income: Vec<ForeignIncomeItem>,
    #[serde(default)]
    pub losses: Losses,
    #[serde(default)]
    pub trust: TrustReceipts,
    #[serde(default)]
    pub filing: FilingDetails,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub tds: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub advance_tax: Decimal,
}

impl Declaration {
    /// An empty declaration for a resident individual under the old regime
    pub fn new(assessment_year: AssessmentYear) -> Self {
        Declaration {
            assessment_year,
            entity: EntityType::default(),
            age: AgeBand::default(),
            company_kind: CompanyKind::default(),
            previous_year_turnover: None,
            residency: Residency::default(),
            regime: Regime::default(),
            salary: HeadItems::new(),
            house_properties: Vec::new(),
            business: Business::default(),
            capital_gains: HeadItems::new(),
            other_sources: HeadItems::new(),
            deemed_income: HeadItems::new(),
            deductions: HeadItems::new(),
            international_income: Vec::new(),
            losses: Losses::default(),
            trust: TrustReceipts::default(),
            filing: FilingDetails::default(),
            tds: Decimal::ZERO,
            advance_tax: Decimal::ZERO,
        }
    }

    /// Reject declarations holding an amount outside `±MAX_AMOUNT`
    pub fn check_amounts(&self) -> Result<(), TaxError> {
        match self
            .amounts()
            .into_iter()
            .find(|(_, amount)| amount.abs() > MAX_AMOUNT)
        {
            Some((field, amount)) => Err(TaxError::AmountOutOfRange {
                field: field.to_string(),
                amount,
            }),
            None => Ok(()),
        }
    }

    fn amounts(&self) -> Vec<(&'static str, Decimal)> {
        fn push_items(out: &mut Vec<(&'static str, Decimal)>, field: &'static str, items: &[LineItem]) {
            out.extend(items.iter().filter_map(|item| item.amount).map(|a| (field, a)));
        }
        fn push_head<K>(out: &mut Vec<(&'static str, Decimal)>, field: &'static str, head: &HeadItems<K>) {
            for items in head.values() {
                push_items(out, field, items);
            }
        }

        let mut out = Vec::new();
        push_head(&mut out, "salary", &self.salary);
        for property in &self.house_properties {
            push_items(&mut out, "house_properties", &property.gross_rent);
            push_items(&mut out, "house_properties", &property.municipal_taxes);
            push_items(&mut out, "house_properties", &property.interest_on_loan);
        }

        push_items(&mut out, "business", &self.business.speculative_income);
        match &self.business.scheme {
            PresumptiveScheme::Regular {
                net_profit,
                additions,
            } => {
                push_items(&mut out, "business", net_profit);
                push_head(&mut out, "business", additions);
            }
            PresumptiveScheme::Sec44AD {
                digital_turnover,
                other_turnover,
            } => {
                push_items(&mut out, "business", digital_turnover);
                push_items(&mut out, "business", other_turnover);
            }
            PresumptiveScheme::Sec44ADA { gross_receipts } => {
                push_items(&mut out, "business", gross_receipts)
            }
            PresumptiveScheme::Sec44AE { vehicles } => out.extend(
                vehicles
                    .iter()
                    .filter_map(|v| v.tonnage)
                    .map(|t| ("business", t)),
            ),
            PresumptiveScheme::Sec44B { aggregate_receipts }
            | PresumptiveScheme::Sec44BB { aggregate_receipts }
            | PresumptiveScheme::Sec44BBA { aggregate_receipts }
            | PresumptiveScheme::Sec44BBB { aggregate_receipts } => {
                push_items(&mut out, "business", aggregate_receipts)
            }
        }

        push_head(&mut out, "capital_gains", &self.capital_gains);
        push_head(&mut out, "other_sources", &self.other_sources);
        push_head(&mut out, "deemed_income", &self.deemed_income);
        push_head(&mut out, "deductions", &self.deductions);

        for item in &self.international_income {
            let arms_length = item
                .transfer_pricing
                .as_ref()
                .and_then(|tp| tp.arms_length_price);
            out.extend(
                [item.amount, item.tax_paid, arms_length]
                    .into_iter()
                    .flatten()
                    .map(|a| ("international_income", a)),
            );
        }

        let cy = &self.losses.current_year;
        let bf = &self.losses.brought_forward;
        out.extend(
            [
                cy.business_non_speculative,
                cy.business_speculative,
                cy.stcl,
                cy.ltcl,
                cy.race_horses,
                bf.house_property,
                bf.business_non_speculative,
                bf.business_speculative,
                bf.stcl,
                bf.ltcl,
                bf.race_horses,
                bf.unabsorbed_depreciation,
            ]
            .map(|a| ("losses", a)),
        );

        push_items(&mut out, "trust", &self.trust.disallowed_12a);
        push_items(&mut out, "trust", &self.trust.disallowed_10_23c);

        let filing = &self.filing;
        let paid = &filing.installments;
        out.extend(
            [
                filing.tax_on_earlier_assessment,
                filing.income_as_per_earlier_assessment,
                Some(paid.q1),
                Some(paid.q2),
                Some(paid.q3),
                Some(paid.q4),
            ]
            .into_iter()
            .flatten()
            .map(|a| ("filing", a)),
        );

        out.push(("tds", self.tds));
        out.push(("advance_tax", self.advance_tax));
        if let Some(turnover) = self.previous_year_turnover {
            out.push(("previous_year_turnover", turnover));
        }
        out
    }

    /// The same declaration under another regime. The original is untouched.
    pub fn with_regime(&self, regime: Regime) -> Self {
        Declaration {
            regime,
            ..self.clone()
        }
    }
}

/// Read a declaration from JSON
pub fn read_declaration_json<R: Read>(reader: R) -> anyhow::Result<Declaration> {
    let declaration: Declaration = serde_json::from_reader(reader)?;
    Ok(declaration)
}
