//! Programme configuration: the attribute bundle a patient is asked to accept
//! or decline, and the checks that decide whether it can be evaluated.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive baseline BMI range the model is defined for.
pub const BMI_RANGE: (f64, f64) = (27.0, 35.0);

/// Efficacy (kg/m² reduction) above which a lifestyle-only programme is flagged.
pub const LIFESTYLE_EFFICACY_CEILING: f64 = 6.0;

/// Severity of expected side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideEffectLevel {
    None,
    Mild,
    Moderate,
}

impl SideEffectLevel {
    /// Ordinal score entering the utility function.
    #[must_use]
    pub fn score(self) -> f64 {
        match self {
            SideEffectLevel::None => 0.0,
            SideEffectLevel::Mild => 1.0,
            SideEffectLevel::Moderate => 2.0,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SideEffectLevel::None => "None",
            SideEffectLevel::Mild => "Mild",
            SideEffectLevel::Moderate => "Moderate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DosingFrequency {
    Weekly,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Injection,
    Lifestyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgrammeType {
    Lifestyle,
    Combined,
}

/// Programme length. Only six- and twelve-month courses are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ProgrammeDuration {
    SixMonths,
    TwelveMonths,
}

impl ProgrammeDuration {
    #[must_use]
    pub fn months(self) -> u32 {
        match self {
            ProgrammeDuration::SixMonths => 6,
            ProgrammeDuration::TwelveMonths => 12,
        }
    }
}

impl TryFrom<u32> for ProgrammeDuration {
    type Error = String;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        match months {
            6 => Ok(ProgrammeDuration::SixMonths),
            12 => Ok(ProgrammeDuration::TwelveMonths),
            other => Err(format!("unsupported duration {other} months (expected 6 or 12)")),
        }
    }
}

impl From<ProgrammeDuration> for u32 {
    fn from(duration: ProgrammeDuration) -> Self {
        duration.months()
    }
}

impl fmt::Display for SideEffectLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for DosingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DosingFrequency::Weekly => "weekly",
            DosingFrequency::Other => "other",
        })
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeliveryMethod::Injection => "injection",
            DeliveryMethod::Lifestyle => "lifestyle",
        })
    }
}

impl fmt::Display for ProgrammeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProgrammeType::Lifestyle => "lifestyle",
            ProgrammeType::Combined => "combined",
        })
    }
}

impl fmt::Display for ProgrammeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mo", self.months())
    }
}

impl FromStr for SideEffectLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "0" => Ok(SideEffectLevel::None),
            "mild" | "1" => Ok(SideEffectLevel::Mild),
            "moderate" | "2" => Ok(SideEffectLevel::Moderate),
            other => Err(format!("unknown side-effect level '{other}'")),
        }
    }
}

impl FromStr for DosingFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" => Ok(DosingFrequency::Weekly),
            "other" => Ok(DosingFrequency::Other),
            other => Err(format!("unknown dosing frequency '{other}'")),
        }
    }
}

impl FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "injection" => Ok(DeliveryMethod::Injection),
            "lifestyle" => Ok(DeliveryMethod::Lifestyle),
            other => Err(format!("unknown delivery method '{other}'")),
        }
    }
}

impl FromStr for ProgrammeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lifestyle" => Ok(ProgrammeType::Lifestyle),
            "combined" => Ok(ProgrammeType::Combined),
            other => Err(format!("unknown programme type '{other}'")),
        }
    }
}

impl FromStr for ProgrammeDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let months: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("duration '{s}' is not a whole number of months"))?;
        ProgrammeDuration::try_from(months)
    }
}

/// One hypothetical weight-management programme, as presented to a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammeConfiguration {
    /// Baseline patient BMI. Checked against [`BMI_RANGE`], not used in the model.
    pub bmi: f64,
    /// Patient-facing cost per month.
    pub monthly_cost: f64,
    /// Expected BMI reduction (kg/m²).
    pub efficacy: f64,
    pub side_effects: SideEffectLevel,
    pub frequency: DosingFrequency,
    pub method: DeliveryMethod,
    pub duration: ProgrammeDuration,
    pub programme: ProgrammeType,
}

/// Non-blocking warning attached to an otherwise valid evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advisory {
    /// Lifestyle-only programmes rarely achieve the requested BMI reduction.
    ImplausibleLifestyleEfficacy,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::ImplausibleLifestyleEfficacy => write!(
                f,
                "High efficacy (>{LIFESTYLE_EFFICACY_CEILING} kg/m²) rarely achievable by lifestyle alone."
            ),
        }
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(field, value, 0.0, f64::INFINITY))
    }
}

impl ProgrammeConfiguration {
    /// Checks the configuration and collects any advisories.
    ///
    /// # Errors
    /// Returns [`ValidationError::InconsistentAttributes`] for injections in a
    /// lifestyle-only programme, whatever the other fields hold. Otherwise returns
    /// [`ValidationError::OutOfRangeInput`] when BMI leaves [`BMI_RANGE`] or
    /// cost/efficacy are negative or non-finite.
    ///
    /// # Example
    /// ```
    /// use optiweight::programme::*;
    ///
    /// let config = ProgrammeConfiguration {
    ///     bmi: 30.0,
    ///     monthly_cost: 150.0,
    ///     efficacy: 7.0,
    ///     side_effects: SideEffectLevel::None,
    ///     frequency: DosingFrequency::Other,
    ///     method: DeliveryMethod::Lifestyle,
    ///     duration: ProgrammeDuration::SixMonths,
    ///     programme: ProgrammeType::Lifestyle,
    /// };
    /// let advisories = config.validate().unwrap();
    /// assert_eq!(advisories, vec![Advisory::ImplausibleLifestyleEfficacy]);
    /// ```
    pub fn validate(&self) -> Result<Vec<Advisory>, ValidationError> {
        // Inconsistent whatever the other fields hold, so it is reported ahead of them.
        if self.programme == ProgrammeType::Lifestyle && self.method == DeliveryMethod::Injection
        {
            return Err(ValidationError::inconsistent(self.programme, self.method));
        }

        let (min_bmi, max_bmi) = BMI_RANGE;
        if !(min_bmi..=max_bmi).contains(&self.bmi) {
            return Err(ValidationError::out_of_range("bmi", self.bmi, min_bmi, max_bmi));
        }
        check_non_negative("monthly_cost", self.monthly_cost)?;
        check_non_negative("efficacy", self.efficacy)?;

        let mut advisories = Vec::new();
        if self.programme == ProgrammeType::Lifestyle && self.efficacy > LIFESTYLE_EFFICACY_CEILING
        {
            advisories.push(Advisory::ImplausibleLifestyleEfficacy);
        }
        Ok(advisories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lifestyle_config() -> ProgrammeConfiguration {
        ProgrammeConfiguration {
            bmi: 30.0,
            monthly_cost: 150.0,
            efficacy: 5.0,
            side_effects: SideEffectLevel::None,
            frequency: DosingFrequency::Other,
            method: DeliveryMethod::Lifestyle,
            duration: ProgrammeDuration::SixMonths,
            programme: ProgrammeType::Lifestyle,
        }
    }

    #[test]
    fn test_valid_configuration_has_no_advisories() {
        assert_eq!(lifestyle_config().validate(), Ok(vec![]));
    }

    #[test]
    fn test_bmi_bounds_are_inclusive() {
        for bmi in [27.0, 35.0] {
            let config = ProgrammeConfiguration {
                bmi,
                ..lifestyle_config()
            };
            assert!(config.validate().is_ok(), "bmi {bmi} should be accepted");
        }
    }

    #[test]
    fn test_bmi_out_of_range() {
        for bmi in [26.9, 35.1, f64::NAN] {
            let config = ProgrammeConfiguration {
                bmi,
                ..lifestyle_config()
            };
            assert!(matches!(
                config.validate(),
                Err(ValidationError::OutOfRangeInput { field: "bmi", .. })
            ));
        }
    }

    #[test]
    fn test_negative_cost_and_efficacy_rejected() {
        let config = ProgrammeConfiguration {
            monthly_cost: -1.0,
            ..lifestyle_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRangeInput {
                field: "monthly_cost",
                ..
            })
        ));

        let config = ProgrammeConfiguration {
            efficacy: f64::INFINITY,
            ..lifestyle_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRangeInput {
                field: "efficacy",
                ..
            })
        ));
    }

    #[test]
    fn test_lifestyle_injection_rejected() {
        let config = ProgrammeConfiguration {
            method: DeliveryMethod::Injection,
            ..lifestyle_config()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::inconsistent(
                ProgrammeType::Lifestyle,
                DeliveryMethod::Injection
            ))
        );
    }

    #[test]
    fn test_lifestyle_injection_rejected_before_numeric_checks() {
        let faulty = [
            (26.0, 150.0, 5.0),
            (40.0, 150.0, 5.0),
            (f64::NAN, 150.0, 5.0),
            (30.0, -10.0, 5.0),
            (30.0, f64::INFINITY, 5.0),
            (30.0, 150.0, -1.0),
            (30.0, 150.0, f64::NAN),
            (f64::NAN, -10.0, f64::NEG_INFINITY),
        ];
        for (bmi, monthly_cost, efficacy) in faulty {
            let config = ProgrammeConfiguration {
                bmi,
                monthly_cost,
                efficacy,
                method: DeliveryMethod::Injection,
                ..lifestyle_config()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(ValidationError::InconsistentAttributes { .. })
                ),
                "bmi {bmi}, cost {monthly_cost}, efficacy {efficacy}"
            );
        }
    }

    #[test]
    fn test_combined_injection_accepted() {
        let config = ProgrammeConfiguration {
            method: DeliveryMethod::Injection,
            programme: ProgrammeType::Combined,
            efficacy: 9.0,
            ..lifestyle_config()
        };
        assert_eq!(config.validate(), Ok(vec![]));
    }

    #[test]
    fn test_high_lifestyle_efficacy_is_advisory() {
        let at_ceiling = ProgrammeConfiguration {
            efficacy: 6.0,
            ..lifestyle_config()
        };
        assert_eq!(at_ceiling.validate(), Ok(vec![]));

        let above = ProgrammeConfiguration {
            efficacy: 6.5,
            ..lifestyle_config()
        };
        assert_eq!(
            above.validate(),
            Ok(vec![Advisory::ImplausibleLifestyleEfficacy])
        );
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!("6".parse(), Ok(ProgrammeDuration::SixMonths));
        assert_eq!("12".parse(), Ok(ProgrammeDuration::TwelveMonths));
        assert!("9".parse::<ProgrammeDuration>().is_err());
        assert!("a year".parse::<ProgrammeDuration>().is_err());
    }

    #[test]
    fn test_categorical_parsing() {
        assert_eq!("Moderate".parse(), Ok(SideEffectLevel::Moderate));
        assert_eq!("1".parse(), Ok(SideEffectLevel::Mild));
        assert_eq!("weekly".parse(), Ok(DosingFrequency::Weekly));
        assert_eq!("INJECTION".parse(), Ok(DeliveryMethod::Injection));
        assert_eq!("combined".parse(), Ok(ProgrammeType::Combined));
        assert!("daily".parse::<DosingFrequency>().is_err());
    }

    #[test]
    fn test_configuration_from_toml() {
        let config: ProgrammeConfiguration = toml::from_str(
            r#"
            bmi = 32.0
            monthly_cost = 250.0
            efficacy = 8.0
            side_effects = "moderate"
            frequency = "weekly"
            method = "injection"
            duration = 12
            programme = "combined"
            "#,
        )
        .unwrap();
        assert_eq!(config.duration, ProgrammeDuration::TwelveMonths);
        assert_eq!(config.side_effects, SideEffectLevel::Moderate);

        let bad = toml::from_str::<ProgrammeConfiguration>(
            r#"
            bmi = 32.0
            monthly_cost = 250.0
            efficacy = 8.0
            side_effects = "none"
            frequency = "weekly"
            method = "injection"
            duration = 3
            programme = "combined"
            "#,
        );
        assert!(bad.is_err());
    }
}
