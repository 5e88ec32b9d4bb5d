use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::error::TaxError;

/// Indian assessment year (runs 1 April to 31 March, following the previous year of income).
/// The value is the first calendar year (e.g., 2024 = "2024-25").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssessmentYear(pub i32);

impl AssessmentYear {
    /// First day of the assessment year (1 April)
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 4, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Display as "2024-25" format
    pub fn display(&self) -> String {
        format!("{}-{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }

    pub fn parse(s: &str) -> Result<Self, TaxError> {
        let invalid = || TaxError::InvalidAssessmentYear(s.to_string());
        let (first, second) = s.trim().split_once('-').ok_or_else(invalid)?;
        if first.len() != 4 || second.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = first.parse().map_err(|_| invalid())?;
        let suffix: i32 = second.parse().map_err(|_| invalid())?;
        if (year + 1).rem_euclid(100) != suffix {
            return Err(invalid());
        }
        Ok(AssessmentYear(year))
    }
}

impl std::str::FromStr for AssessmentYear {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssessmentYear::parse(s)
    }
}

impl TryFrom<String> for AssessmentYear {
    type Error = TaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AssessmentYear::parse(&value)
    }
}

impl From<AssessmentYear> for String {
    fn from(year: AssessmentYear) -> Self {
        year.display()
    }
}

impl std::fmt::Display for AssessmentYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl JsonSchema for AssessmentYear {
    fn schema_name() -> String {
        "AssessmentYear".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_assessment_year() {
        assert_eq!(AssessmentYear::parse("2024-25").unwrap(), AssessmentYear(2024));
        assert_eq!(AssessmentYear::parse("1999-00").unwrap(), AssessmentYear(1999));
    }

    #[test]
    fn parse_rejects_mismatched_suffix() {
        assert!(AssessmentYear::parse("2024-26").is_err());
        assert!(AssessmentYear::parse("2024").is_err());
        assert!(AssessmentYear::parse("24-25").is_err());
        assert!(AssessmentYear::parse("abcd-ef").is_err());
    }

    #[test]
    fn assessment_year_display() {
        assert_eq!(AssessmentYear(2024).display(), "2024-25");
        assert_eq!(AssessmentYear(2015).display(), "2015-16");
        assert_eq!(AssessmentYear(1999).to_string(), "1999-00");
    }

    #[test]
    fn assessment_year_start_date() {
        assert_eq!(
            AssessmentYear(2024).start_date(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );
    }

    #[test]
    fn serde_round_trip_as_string() {
        let json = serde_json::to_string(&AssessmentYear(2023)).unwrap();
        assert_eq!(json, "\"2023-24\"");
        let year: AssessmentYear = serde_json::from_str("\"2020-21\"").unwrap();
        assert_eq!(year, AssessmentYear(2020));
    }
}
