//! Monte Carlo uncertainty simulation of the ICER.
//!
//! Total cost and monetised QALY value are perturbed independently; each draw
//! recovers an implied QALY gain from the perturbed value and recomputes the
//! ratio. Draws are produced lazily so a caller can stop a long run early.

#![allow(clippy::cast_precision_loss)]

use crate::config::SimulationParams;
use crate::distributions::Perturbation;
use crate::economics::EvaluationResult;
use crate::histogram::Histogram;
use crate::traits::RandomSource;
use serde::Serialize;
use std::num::NonZeroUsize;

/// Lazy, unbounded stream of ICER draws for one evaluation.
pub struct IcerDraws<'r, R: RandomSource + ?Sized> {
    total_cost: f64,
    qaly_value: f64,
    willingness_to_pay: f64,
    cost: Perturbation,
    benefit: Perturbation,
    rng: &'r mut R,
}

impl<'r, R: RandomSource + ?Sized> IcerDraws<'r, R> {
    pub fn new(result: &EvaluationResult, params: &SimulationParams, rng: &'r mut R) -> Self {
        Self {
            total_cost: result.costs.total,
            qaly_value: result.qaly_value,
            willingness_to_pay: result.willingness_to_pay,
            cost: Perturbation::new(params.cost_perturbation),
            benefit: Perturbation::new(params.benefit_perturbation),
            rng,
        }
    }
}

impl<R: RandomSource + ?Sized> Iterator for IcerDraws<'_, R> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let cost = self.cost.perturb(self.total_cost, &mut *self.rng);
        let value = self.benefit.perturb(self.qaly_value, &mut *self.rng);
        // A non-positive benefit is recorded as 0 rather than discarded.
        let draw = if value > 0.0 {
            cost / (value / self.willingness_to_pay)
        } else {
            0.0
        };
        Some(draw)
    }
}

/// The ordered draws of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UncertaintyDraws {
    draws: Vec<f64>,
    willingness_to_pay: f64,
}

/// Descriptive statistics of a set of draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Fraction of draws at or below the willingness-to-pay threshold.
    pub share_cost_effective: f64,
}

impl UncertaintyDraws {
    #[must_use]
    pub fn draws(&self) -> &[f64] {
        &self.draws
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    #[must_use]
    pub fn histogram(&self, bin_count: NonZeroUsize) -> Histogram {
        Histogram::from_values(&self.draws, bin_count)
    }

    /// Value at quantile `q` of the draws (lower empirical quantile).
    ///
    /// Returns `None` when there are no draws.
    #[must_use]
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if self.draws.is_empty() {
            return None;
        }
        let mut sorted = self.draws.clone();
        sorted.sort_by(f64::total_cmp);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = (q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).floor() as usize;
        Some(sorted[index.min(sorted.len() - 1)])
    }

    /// Fraction of draws not exceeding `threshold`.
    #[must_use]
    pub fn share_at_or_below(&self, threshold: f64) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let count = self.draws.iter().filter(|&&x| x <= threshold).count();
        count as f64 / self.draws.len() as f64
    }

    /// Returns `None` when there are no draws.
    #[must_use]
    pub fn summary(&self) -> Option<DrawSummary> {
        let median = self.quantile(0.5)?;
        let count = self.draws.len();
        let mean = self.draws.iter().sum::<f64>() / count as f64;
        let min = self.draws.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.draws.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(DrawSummary {
            count,
            mean,
            min,
            max,
            median,
            share_cost_effective: self.share_at_or_below(self.willingness_to_pay),
        })
    }
}

/// Runs `params.draw_count` draws.
///
/// # Example
/// ```rust
/// use optiweight::config::{SimulationParams, WeightTable};
/// use optiweight::economics::evaluate;
/// use optiweight::programme::*;
/// use optiweight::simulation::simulate_draws;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
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
/// let draws = simulate_draws(&result, &SimulationParams::default(), &mut StdRng::seed_from_u64(7));
/// assert_eq!(draws.len(), 500);
/// ```
pub fn simulate_draws<R: RandomSource + ?Sized>(
    result: &EvaluationResult,
    params: &SimulationParams,
    rng: &mut R,
) -> UncertaintyDraws {
    let stream = IcerDraws::new(result, params, rng);
    log::debug!(
        "simulating {} ICER draws (cost ±{}, benefit ±{})",
        params.draw_count,
        stream.cost.half_width(),
        stream.benefit.half_width()
    );
    let draws: Vec<f64> = stream.take(params.draw_count).collect();
    UncertaintyDraws {
        draws,
        willingness_to_pay: result.willingness_to_pay,
    }
}

/// Runs the simulation and bins the draws.
///
/// The bin counts always sum to `params.draw_count`.
pub fn simulate<R: RandomSource + ?Sized>(
    result: &EvaluationResult,
    params: &SimulationParams,
    rng: &mut R,
) -> Histogram {
    simulate_draws(result, params, rng).histogram(params.bin_count)
}
