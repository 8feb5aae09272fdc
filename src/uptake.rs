//! Discrete-choice uptake model.
//!
//! A programme's utility is linear in its attributes; the probability of
//! choosing it over a zero-utility opt-out is the logistic function of that
//! utility.

use crate::config::WeightTable;
use crate::programme::{
    DeliveryMethod, DosingFrequency, ProgrammeConfiguration, ProgrammeDuration, ProgrammeType,
};

/// Choice probability together with the utility it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uptake {
    /// Linear utility of the programme relative to opting out.
    pub utility: f64,
    /// Probability of choosing the programme, strictly inside (0, 1).
    pub probability: f64,
}

/// Logistic function evaluated without overflow on either tail.
///
/// Results are clamped to `[f64::MIN_POSITIVE, 1 - f64::EPSILON / 2]` so a finite
/// utility never produces exactly 0 or 1. Ordering beyond that saturation is
/// carried by the utility itself.
///
/// # Example
/// ```
/// use optiweight::uptake::logistic;
///
/// assert_eq!(logistic(0.0), 0.5);
/// assert!(logistic(1000.0) < 1.0);
/// assert!(logistic(-1000.0) > 0.0);
/// ```
#[must_use]
pub fn logistic(utility: f64) -> f64 {
    let p = if utility >= 0.0 {
        1.0 / (1.0 + (-utility).exp())
    } else {
        let e = utility.exp();
        e / (1.0 + e)
    };
    p.clamp(f64::MIN_POSITIVE, 1.0 - f64::EPSILON / 2.0)
}

fn frequency_weight(weights: &WeightTable, frequency: DosingFrequency) -> f64 {
    match frequency {
        DosingFrequency::Weekly => weights.weekly_frequency,
        DosingFrequency::Other => weights.other_frequency,
    }
}

fn method_weight(weights: &WeightTable, method: DeliveryMethod) -> f64 {
    match method {
        DeliveryMethod::Injection => weights.injection_method,
        DeliveryMethod::Lifestyle => weights.lifestyle_method,
    }
}

fn duration_weight(weights: &WeightTable, duration: ProgrammeDuration) -> f64 {
    match duration {
        ProgrammeDuration::TwelveMonths => weights.twelve_month_duration,
        ProgrammeDuration::SixMonths => weights.other_duration,
    }
}

fn programme_weight(weights: &WeightTable, programme: ProgrammeType) -> f64 {
    match programme {
        ProgrammeType::Combined => weights.combined_programme,
        ProgrammeType::Lifestyle => weights.lifestyle_programme,
    }
}

/// Linear utility of a programme configuration.
#[must_use]
pub fn utility(config: &ProgrammeConfiguration, weights: &WeightTable) -> f64 {
    weights.cost * config.monthly_cost
        + weights.efficacy * config.efficacy
        + weights.side_effect * config.side_effects.score()
        + frequency_weight(weights, config.frequency)
        + method_weight(weights, config.method)
        + duration_weight(weights, config.duration)
        + programme_weight(weights, config.programme)
}

/// Uptake of a validated configuration.
#[must_use]
pub fn uptake(config: &ProgrammeConfiguration, weights: &WeightTable) -> Uptake {
    let utility = utility(config, weights);
    Uptake {
        utility,
        probability: logistic(utility),
    }
}
