//! Cost-effectiveness engine and the `evaluate` entry point.
//!
//! Figures are kept unrounded; presentation rounding lives in [`crate::report`].

use crate::config::WeightTable;
use crate::error::ValidationError;
use crate::programme::{Advisory, DeliveryMethod, ProgrammeConfiguration, ProgrammeType};
use crate::uptake::uptake;
use serde::Serialize;
use std::fmt;

/// Incremental cost-effectiveness ratio (cost per QALY gained).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Icer {
    Ratio(f64),
    /// The programme gains no QALYs, so no ratio exists.
    NotApplicable,
}

impl Icer {
    /// `totalCost / qalyGain`, or [`Icer::NotApplicable`] when the gain is not positive.
    ///
    /// # Example
    /// ```
    /// use optiweight::economics::Icer;
    ///
    /// assert_eq!(Icer::from_cost_and_gain(390.0, 0.25), Icer::Ratio(1560.0));
    /// assert_eq!(Icer::from_cost_and_gain(390.0, 0.0), Icer::NotApplicable);
    /// ```
    #[must_use]
    pub fn from_cost_and_gain(total_cost: f64, qaly_gain: f64) -> Self {
        if qaly_gain > 0.0 {
            Icer::Ratio(total_cost / qaly_gain)
        } else {
            Icer::NotApplicable
        }
    }

    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Icer::Ratio(value) => Some(value),
            Icer::NotApplicable => None,
        }
    }

    #[must_use]
    pub fn is_applicable(self) -> bool {
        matches!(self, Icer::Ratio(_))
    }
}

impl fmt::Display for Icer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Icer::Ratio(value) => write!(f, "£{value:.0}"),
            Icer::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// Monthly cost components and the whole-programme total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub drug: f64,
    pub monitoring: f64,
    pub admin: f64,
    pub training: f64,
    pub months: u32,
    pub total: f64,
}

impl CostBreakdown {
    /// Prices each component for a configuration.
    #[must_use]
    pub fn for_configuration(config: &ProgrammeConfiguration, weights: &WeightTable) -> Self {
        let drug = match config.method {
            DeliveryMethod::Injection => weights.drug_cost_injection,
            DeliveryMethod::Lifestyle => 0.0,
        };
        let monitoring = match config.programme {
            ProgrammeType::Combined => weights.monitoring_cost_combined,
            ProgrammeType::Lifestyle => weights.monitoring_cost_lifestyle,
        };
        let training = match config.programme {
            ProgrammeType::Lifestyle => weights.training_cost_lifestyle,
            ProgrammeType::Combined => 0.0,
        };
        let admin = weights.admin_cost;
        let months = config.duration.months();

        Self {
            drug,
            monitoring,
            admin,
            training,
            months,
            total: (drug + monitoring + admin + training) * f64::from(months),
        }
    }

    #[must_use]
    pub fn monthly(&self) -> f64 {
        self.drug + self.monitoring + self.admin + self.training
    }

    /// `(name, monthly unit, whole-programme total)` for each component.
    #[must_use]
    pub fn components(&self) -> [(&'static str, f64, f64); 4] {
        let months = f64::from(self.months);
        [
            ("Drug", self.drug, self.drug * months),
            ("Monitoring", self.monitoring, self.monitoring * months),
            ("Admin", self.admin, self.admin * months),
            ("Training", self.training, self.training * months),
        ]
    }
}

/// Everything the engine derives from one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub utility: f64,
    pub uptake: f64,
    pub costs: CostBreakdown,
    pub savings: f64,
    pub qaly_gain: f64,
    pub qaly_value: f64,
    pub net_benefit: f64,
    pub expected_net_benefit: f64,
    pub icer: Icer,
    /// Threshold the QALY value was monetised with.
    pub willingness_to_pay: f64,
    pub advisories: Vec<Advisory>,
}

impl EvaluationResult {
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.costs.total
    }
}

/// Validates and evaluates a programme configuration.
///
/// # Errors
/// Returns the [`ValidationError`] raised by
/// [`ProgrammeConfiguration::validate`]; nothing is computed in that case.
///
/// # Example
/// ```
/// use optiweight::config::WeightTable;
/// use optiweight::economics::{evaluate, Icer};
/// use optiweight::programme::*;
///
/// let config = ProgrammeConfiguration {
///     bmi: 30.0,
///     monthly_cost: 150.0,
///     efficacy: 5.0,
///     side_effects: SideEffectLevel::None,
///     frequency: DosingFrequency::Other,
///     method: DeliveryMethod::Lifestyle,
///     duration: ProgrammeDuration::SixMonths,
///     programme: ProgrammeType::Lifestyle,
/// };
/// let result = evaluate(&config, &WeightTable::default()).unwrap();
/// assert_eq!(result.total_cost(), 390.0);
/// assert_eq!(result.icer, Icer::Ratio(1560.0));
/// ```
pub fn evaluate(
    config: &ProgrammeConfiguration,
    weights: &WeightTable,
) -> Result<EvaluationResult, ValidationError> {
    let advisories = config.validate()?;
    for advisory in &advisories {
        log::warn!("{advisory}");
    }

    let choice = uptake(config, weights);
    let costs = CostBreakdown::for_configuration(config, weights);

    let savings = config.efficacy * weights.savings_per_unit_efficacy;
    let qaly_gain = config.efficacy * weights.qaly_per_unit_efficacy;
    let qaly_value = qaly_gain * weights.willingness_to_pay;
    let net_benefit = savings + qaly_value - costs.total;
    let expected_net_benefit = choice.probability * net_benefit;
    let icer = Icer::from_cost_and_gain(costs.total, qaly_gain);

    log::debug!(
        "evaluated programme: U={:.4} P={:.4} total_cost={} net_benefit={} icer={icer}",
        choice.utility,
        choice.probability,
        costs.total,
        net_benefit
    );

    Ok(EvaluationResult {
        utility: choice.utility,
        uptake: choice.probability,
        costs,
        savings,
        qaly_gain,
        qaly_value,
        net_benefit,
        expected_net_benefit,
        icer,
        willingness_to_pay: weights.willingness_to_pay,
        advisories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programme::{DosingFrequency, ProgrammeDuration, SideEffectLevel};

    fn combined_injection() -> ProgrammeConfiguration {
        ProgrammeConfiguration {
            bmi: 33.0,
            monthly_cost: 250.0,
            efficacy: 8.0,
            side_effects: SideEffectLevel::Moderate,
            frequency: DosingFrequency::Weekly,
            method: DeliveryMethod::Injection,
            duration: ProgrammeDuration::TwelveMonths,
            programme: ProgrammeType::Combined,
        }
    }

    #[test]
    fn test_icer_not_applicable_for_non_positive_gain() {
        assert_eq!(Icer::from_cost_and_gain(100.0, 0.0), Icer::NotApplicable);
        assert_eq!(Icer::from_cost_and_gain(100.0, -0.1), Icer::NotApplicable);
        assert_eq!(Icer::from_cost_and_gain(0.0, 0.0), Icer::NotApplicable);
        assert_eq!(Icer::NotApplicable.value(), None);
        assert!(!Icer::NotApplicable.is_applicable());
    }

    #[test]
    fn test_icer_display() {
        assert_eq!(Icer::Ratio(7350.0).to_string(), "£7350");
        assert_eq!(Icer::NotApplicable.to_string(), "N/A");
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_cost_components_for_combined_injection() {
        let costs = CostBreakdown::for_configuration(&combined_injection(), &WeightTable::default());
        assert_eq!(costs.drug, 175.0);
        assert_eq!(costs.monitoring, 50.0);
        assert_eq!(costs.admin, 20.0);
        assert_eq!(costs.training, 0.0);
        assert_eq!(costs.months, 12);
        assert_eq!(costs.monthly(), 245.0);
        assert_eq!(costs.total, 2940.0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_component_totals_sum_to_total() {
        let costs = CostBreakdown::for_configuration(&combined_injection(), &WeightTable::default());
        let sum: f64 = costs.components().iter().map(|(_, _, total)| total).sum();
        assert_eq!(sum, costs.total);
    }

    #[test]
    fn test_total_cost_linear_in_duration() {
        let weights = WeightTable::default();
        let twelve = combined_injection();
        let six = ProgrammeConfiguration {
            duration: ProgrammeDuration::SixMonths,
            ..twelve.clone()
        };
        let six_total = CostBreakdown::for_configuration(&six, &weights).total;
        let twelve_total = CostBreakdown::for_configuration(&twelve, &weights).total;
        assert!((twelve_total - 2.0 * six_total).abs() < 1e-9);
        assert!((six_total / 6.0 - twelve_total / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_combined_injection() {
        let result = evaluate(&combined_injection(), &WeightTable::default()).unwrap();
        assert!((result.utility - 0.55).abs() < 1e-12);
        assert!((result.uptake - 0.634_136).abs() < 1e-5);
        assert!((result.savings - 736.0).abs() < 1e-9);
        assert!((result.qaly_gain - 0.4).abs() < 1e-12);
        assert!((result.qaly_value - 8000.0).abs() < 1e-9);
        assert!((result.net_benefit - 5796.0).abs() < 1e-9);
        assert!((result.expected_net_benefit - 3675.4).abs() < 0.1);
        let icer = result.icer.value().unwrap();
        assert!((icer - 7350.0).abs() < 1e-6);
        assert!(result.advisories.is_empty());
    }

    #[test]
    fn test_evaluate_rejects_without_result() {
        let config = ProgrammeConfiguration {
            programme: ProgrammeType::Lifestyle,
            ..combined_injection()
        };
        assert!(matches!(
            evaluate(&config, &WeightTable::default()),
            Err(ValidationError::InconsistentAttributes { .. })
        ));
    }

    #[test]
    fn test_zero_efficacy_has_no_icer() {
        let config = ProgrammeConfiguration {
            efficacy: 0.0,
            ..combined_injection()
        };
        let result = evaluate(&config, &WeightTable::default()).unwrap();
        assert_eq!(result.icer, Icer::NotApplicable);
        assert!(result.qaly_gain.abs() < f64::EPSILON);
        assert!((result.net_benefit + 2940.0).abs() < 1e-9);
        assert!(result.expected_net_benefit.is_finite());
    }

    #[test]
    fn test_negative_qaly_coefficient_has_no_icer() {
        let weights = WeightTable {
            qaly_per_unit_efficacy: -0.05,
            ..WeightTable::default()
        };
        let result = evaluate(&combined_injection(), &weights).unwrap();
        assert!(result.qaly_gain < 0.0);
        assert_eq!(result.icer, Icer::NotApplicable);
    }

    #[test]
    fn test_advisory_attached_to_result() {
        let config = ProgrammeConfiguration {
            method: DeliveryMethod::Lifestyle,
            programme: ProgrammeType::Lifestyle,
            efficacy: 7.5,
            ..combined_injection()
        };
        let result = evaluate(&config, &WeightTable::default()).unwrap();
        assert_eq!(result.advisories, vec![Advisory::ImplausibleLifestyleEfficacy]);
        assert!(result.icer.is_applicable());
    }
}
