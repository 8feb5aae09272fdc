//! A calculator session: the weights it evaluates with, its own random source,
//! the most recent evaluation and the scenarios saved so far.
//!
//! Sessions share nothing, so independent sessions may run on separate threads.

use crate::config::{EngineConfig, SimulationParams, WeightTable};
use crate::economics::{EvaluationResult, evaluate};
use crate::error::{ConfigError, SessionError};
use crate::histogram::Histogram;
use crate::programme::ProgrammeConfiguration;
use crate::scenario::ScenarioLog;
use crate::simulation::{DrawSummary, simulate_draws};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Histogram and summary of one simulation request.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub histogram: Histogram,
    pub summary: Option<DrawSummary>,
}

pub struct Session {
    weights: WeightTable,
    params: SimulationParams,
    rng: StdRng,
    current: Option<(ProgrammeConfiguration, EvaluationResult)>,
    scenarios: ScenarioLog,
}

impl Session {
    /// Creates a session. `seed` makes every simulation in the session reproducible.
    #[must_use]
    pub fn new(weights: WeightTable, params: SimulationParams, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            weights,
            params,
            rng,
            current: None,
            scenarios: ScenarioLog::new(),
        }
    }

    /// Creates a session from a loaded configuration and optional profile name.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownProfile`] if the profile does not exist.
    pub fn from_config(config: &EngineConfig, profile: Option<&str>) -> Result<Self, ConfigError> {
        let weights = config.weights_for(profile)?.clone();
        Ok(Self::new(weights, config.simulation.clone(), config.seed))
    }

    #[must_use]
    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    #[must_use]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Evaluates a configuration and makes it the current one.
    ///
    /// A rejected configuration leaves the previous current evaluation in place.
    ///
    /// # Errors
    /// Returns [`SessionError::Validation`] when the configuration is rejected.
    pub fn evaluate(
        &mut self,
        config: ProgrammeConfiguration,
    ) -> Result<&EvaluationResult, SessionError> {
        let result = evaluate(&config, &self.weights)?;
        Ok(&self.current.insert((config, result)).1)
    }

    #[must_use]
    pub fn current(&self) -> Option<&EvaluationResult> {
        self.current.as_ref().map(|(_, result)| result)
    }

    #[must_use]
    pub fn current_configuration(&self) -> Option<&ProgrammeConfiguration> {
        self.current.as_ref().map(|(config, _)| config)
    }

    /// Runs the uncertainty simulation on the current evaluation.
    ///
    /// # Errors
    /// Returns [`SessionError::NothingEvaluated`] before the first successful evaluation.
    pub fn simulate(&mut self) -> Result<SimulationReport, SessionError> {
        let (_, result) = self.current.as_ref().ok_or(SessionError::NothingEvaluated)?;
        let draws = simulate_draws(result, &self.params, &mut self.rng);
        Ok(SimulationReport {
            histogram: draws.histogram(self.params.bin_count),
            summary: draws.summary(),
        })
    }

    /// Saves the current evaluation to the scenario log.
    ///
    /// # Errors
    /// Returns [`SessionError::NothingEvaluated`] before the first successful evaluation.
    pub fn save_current(&mut self) -> Result<u64, SessionError> {
        let (config, result) = self
            .current
            .clone()
            .ok_or(SessionError::NothingEvaluated)?;
        let sequence = self.scenarios.append(config, result);
        log::info!("saved scenario {sequence}");
        Ok(sequence)
    }

    #[must_use]
    pub fn scenarios(&self) -> &ScenarioLog {
        &self.scenarios
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(WeightTable::default(), SimulationParams::default(), None)
    }
}
