//! Engine configuration: the weight table, simulation parameters and the
//! TOML/environment sources they are loaded from.
//!
//! A configuration file looks like:
//!
//! ```toml
//! seed = 42
//!
//! [weights]
//! willingness_to_pay = 30000.0
//!
//! [simulation]
//! draw_count = 1000
//! cost_perturbation = 0.2
//!
//! [profiles.high-efficacy-sensitivity]
//! efficacy = 0.8
//! ```
//!
//! Every table is partial; missing fields take the documented defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

/// Prefix for environment variables overriding weight-table fields.
pub const ENV_PREFIX: &str = "OPTIWEIGHT_";

/// Environment variable naming the configuration file used by the CLI.
pub const CONFIG_PATH_ENV: &str = "OPTIWEIGHT_CONFIG";

/// Default coefficients and prices.
pub mod defaults {
    /// Utility per unit of monthly cost.
    pub const COST: f64 = -0.015;
    /// Utility per kg/m² of expected BMI reduction.
    pub const EFFICACY: f64 = 0.6;
    /// Utility per step of side-effect severity.
    pub const SIDE_EFFECT: f64 = -0.25;
    pub const WEEKLY_FREQUENCY: f64 = -0.15;
    pub const OTHER_FREQUENCY: f64 = 0.0;
    pub const INJECTION_METHOD: f64 = -0.1;
    pub const LIFESTYLE_METHOD: f64 = 0.1;
    pub const TWELVE_MONTH_DURATION: f64 = -0.05;
    pub const OTHER_DURATION: f64 = 0.0;
    pub const COMBINED_PROGRAMME: f64 = 0.3;
    pub const LIFESTYLE_PROGRAMME: f64 = 0.0;

    /// Monthly drug cost of injectable delivery.
    pub const DRUG_COST_INJECTION: f64 = 175.0;
    /// Monthly monitoring cost of a combined programme.
    pub const MONITORING_COST_COMBINED: f64 = 50.0;
    /// Monthly monitoring cost of a lifestyle-only programme.
    pub const MONITORING_COST_LIFESTYLE: f64 = 30.0;
    /// Monthly administration cost, charged to every programme.
    pub const ADMIN_COST: f64 = 20.0;
    /// Monthly training cost of a lifestyle-only programme.
    pub const TRAINING_COST_LIFESTYLE: f64 = 15.0;

    /// Complication savings per kg/m² of BMI reduction.
    pub const SAVINGS_PER_UNIT_EFFICACY: f64 = 92.0;
    /// QALYs gained per kg/m² of BMI reduction.
    pub const QALY_PER_UNIT_EFFICACY: f64 = 0.05;
    /// Monetary value of one QALY.
    pub const WILLINGNESS_TO_PAY: f64 = 20_000.0;

    pub const DRAW_COUNT: usize = 500;
    /// Fractional half-width of the multiplicative perturbation (±30%).
    pub const PERTURBATION: f64 = 0.3;
    pub const BIN_COUNT: usize = 15;
}

/// Coefficients of the uptake model and prices of the cost model.
///
/// Read-only during evaluation; one table serves both models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightTable {
    pub cost: f64,
    pub efficacy: f64,
    pub side_effect: f64,
    pub weekly_frequency: f64,
    pub other_frequency: f64,
    pub injection_method: f64,
    pub lifestyle_method: f64,
    pub twelve_month_duration: f64,
    pub other_duration: f64,
    pub combined_programme: f64,
    pub lifestyle_programme: f64,

    pub drug_cost_injection: f64,
    pub monitoring_cost_combined: f64,
    pub monitoring_cost_lifestyle: f64,
    pub admin_cost: f64,
    pub training_cost_lifestyle: f64,

    pub savings_per_unit_efficacy: f64,
    pub qaly_per_unit_efficacy: f64,
    pub willingness_to_pay: f64,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            cost: defaults::COST,
            efficacy: defaults::EFFICACY,
            side_effect: defaults::SIDE_EFFECT,
            weekly_frequency: defaults::WEEKLY_FREQUENCY,
            other_frequency: defaults::OTHER_FREQUENCY,
            injection_method: defaults::INJECTION_METHOD,
            lifestyle_method: defaults::LIFESTYLE_METHOD,
            twelve_month_duration: defaults::TWELVE_MONTH_DURATION,
            other_duration: defaults::OTHER_DURATION,
            combined_programme: defaults::COMBINED_PROGRAMME,
            lifestyle_programme: defaults::LIFESTYLE_PROGRAMME,
            drug_cost_injection: defaults::DRUG_COST_INJECTION,
            monitoring_cost_combined: defaults::MONITORING_COST_COMBINED,
            monitoring_cost_lifestyle: defaults::MONITORING_COST_LIFESTYLE,
            admin_cost: defaults::ADMIN_COST,
            training_cost_lifestyle: defaults::TRAINING_COST_LIFESTYLE,
            savings_per_unit_efficacy: defaults::SAVINGS_PER_UNIT_EFFICACY,
            qaly_per_unit_efficacy: defaults::QALY_PER_UNIT_EFFICACY,
            willingness_to_pay: defaults::WILLINGNESS_TO_PAY,
        }
    }
}

impl WeightTable {
    /// Named mutable access to every field, used for overrides.
    fn fields_mut(&mut self) -> [(&'static str, &mut f64); 19] {
        [
            ("cost", &mut self.cost),
            ("efficacy", &mut self.efficacy),
            ("side_effect", &mut self.side_effect),
            ("weekly_frequency", &mut self.weekly_frequency),
            ("other_frequency", &mut self.other_frequency),
            ("injection_method", &mut self.injection_method),
            ("lifestyle_method", &mut self.lifestyle_method),
            ("twelve_month_duration", &mut self.twelve_month_duration),
            ("other_duration", &mut self.other_duration),
            ("combined_programme", &mut self.combined_programme),
            ("lifestyle_programme", &mut self.lifestyle_programme),
            ("drug_cost_injection", &mut self.drug_cost_injection),
            ("monitoring_cost_combined", &mut self.monitoring_cost_combined),
            ("monitoring_cost_lifestyle", &mut self.monitoring_cost_lifestyle),
            ("admin_cost", &mut self.admin_cost),
            ("training_cost_lifestyle", &mut self.training_cost_lifestyle),
            ("savings_per_unit_efficacy", &mut self.savings_per_unit_efficacy),
            ("qaly_per_unit_efficacy", &mut self.qaly_per_unit_efficacy),
            ("willingness_to_pay", &mut self.willingness_to_pay),
        ]
    }

    /// Named read-only view of every field.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, f64); 19] {
        [
            ("cost", self.cost),
            ("efficacy", self.efficacy),
            ("side_effect", self.side_effect),
            ("weekly_frequency", self.weekly_frequency),
            ("other_frequency", self.other_frequency),
            ("injection_method", self.injection_method),
            ("lifestyle_method", self.lifestyle_method),
            ("twelve_month_duration", self.twelve_month_duration),
            ("other_duration", self.other_duration),
            ("combined_programme", self.combined_programme),
            ("lifestyle_programme", self.lifestyle_programme),
            ("drug_cost_injection", self.drug_cost_injection),
            ("monitoring_cost_combined", self.monitoring_cost_combined),
            ("monitoring_cost_lifestyle", self.monitoring_cost_lifestyle),
            ("admin_cost", self.admin_cost),
            ("training_cost_lifestyle", self.training_cost_lifestyle),
            ("savings_per_unit_efficacy", self.savings_per_unit_efficacy),
            ("qaly_per_unit_efficacy", self.qaly_per_unit_efficacy),
            ("willingness_to_pay", self.willingness_to_pay),
        ]
    }

    /// Parses a (possibly partial) weight table from TOML.
    ///
    /// # Errors
    /// Returns an error if the document is not valid TOML, names an unknown
    /// field, or sets a non-finite value.
    ///
    /// # Example
    /// ```
    /// use optiweight::config::WeightTable;
    ///
    /// let weights = WeightTable::from_toml_str("willingness_to_pay = 30000.0").unwrap();
    /// assert_eq!(weights.willingness_to_pay, 30000.0);
    /// assert_eq!(weights.cost, -0.015);
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let weights: WeightTable = toml::from_str(source)?;
        weights.validate()?;
        Ok(weights)
    }

    /// Loads a weight table from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Rejects non-finite coefficients.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidParameter`] naming the first non-finite field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.fields().into_iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(ConfigError::invalid_parameter(
                name,
                value,
                "must be finite",
            )),
            None => Ok(()),
        }
    }

    /// Applies `OPTIWEIGHT_<FIELD>` overrides from a list of key/value pairs.
    ///
    /// Keys without the prefix, and prefixed keys that name no weight field
    /// (such as [`CONFIG_PATH_ENV`]), are ignored.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidOverride`] if a matching value is not a
    /// finite number.
    ///
    /// # Example
    /// ```
    /// use optiweight::config::WeightTable;
    ///
    /// let weights = WeightTable::default()
    ///     .apply_overrides([("OPTIWEIGHT_ADMIN_COST", "25")])
    ///     .unwrap();
    /// assert_eq!(weights.admin_cost, 25.0);
    /// ```
    pub fn apply_overrides<I, K, V>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, raw) in vars {
            let (key, raw) = (key.as_ref(), raw.as_ref());
            let Some(field) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let field = field.to_ascii_lowercase();
            let Some((name, slot)) = self
                .fields_mut()
                .into_iter()
                .find(|(name, _)| *name == field)
            else {
                continue;
            };
            let value = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ConfigError::invalid_override(key, raw))?;
            log::debug!("weight override {name} = {value}");
            *slot = value;
        }
        Ok(self)
    }

    /// Default table with overrides from the process environment.
    ///
    /// # Errors
    /// See [`WeightTable::apply_overrides`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_overrides(std::env::vars())
    }
}

/// Parameters of the ICER uncertainty simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParams {
    /// Number of independent draws.
    pub draw_count: usize,
    /// Fractional half-width of the total-cost perturbation.
    pub cost_perturbation: f64,
    /// Fractional half-width of the QALY-value perturbation.
    pub benefit_perturbation: f64,
    /// Number of equal-width histogram bins.
    pub bin_count: NonZeroUsize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            draw_count: defaults::DRAW_COUNT,
            cost_perturbation: defaults::PERTURBATION,
            benefit_perturbation: defaults::PERTURBATION,
            bin_count: NonZeroUsize::new(defaults::BIN_COUNT).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl SimulationParams {
    /// Creates validated simulation parameters.
    ///
    /// # Errors
    /// Returns an error if `bin_count` is zero or a perturbation is negative or
    /// non-finite.
    ///
    /// # Example
    /// ```
    /// use optiweight::config::SimulationParams;
    ///
    /// let params = SimulationParams::new(100, 0.15, 0.15, 10).unwrap();
    /// assert_eq!(params.bin_count.get(), 10);
    /// assert!(SimulationParams::new(100, 0.15, 0.15, 0).is_err());
    /// ```
    pub fn new(
        draw_count: usize,
        cost_perturbation: f64,
        benefit_perturbation: f64,
        bin_count: usize,
    ) -> Result<Self, ConfigError> {
        #[allow(clippy::cast_precision_loss)]
        let bin_count = NonZeroUsize::new(bin_count).ok_or_else(|| {
            ConfigError::invalid_parameter(
                "bin_count",
                bin_count as f64,
                "must be greater than zero",
            )
        })?;
        let params = Self {
            draw_count,
            cost_perturbation,
            benefit_perturbation,
            bin_count,
        };
        params.validate()?;
        Ok(params)
    }

    /// Rejects negative or non-finite perturbation widths.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidParameter`] naming the offending width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, width) in [
            ("cost_perturbation", self.cost_perturbation),
            ("benefit_perturbation", self.benefit_perturbation),
        ] {
            if !width.is_finite() || width < 0.0 {
                return Err(ConfigError::invalid_parameter(
                    name,
                    width,
                    "must be a finite, non-negative fraction",
                ));
            }
        }
        Ok(())
    }
}

/// Everything a configuration file can hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Seed for the session random source; fresh entropy when absent.
    pub seed: Option<u64>,
    pub weights: WeightTable,
    pub simulation: SimulationParams,
    /// Alternative named calibrations. Missing fields take the built-in
    /// defaults, not the values of `[weights]`.
    pub profiles: BTreeMap<String, WeightTable>,
}

impl EngineConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    /// Returns an error if the document is malformed or any table fails validation.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.weights.validate()?;
        config.simulation.validate()?;
        for profile in config.profiles.values() {
            profile.validate()?;
        }
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::info!("loading engine configuration from {}", path.display());
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Resolves the weight table for a named profile, or `[weights]` when `None`.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownProfile`] if the profile does not exist.
    pub fn weights_for(&self, profile: Option<&str>) -> Result<&WeightTable, ConfigError> {
        match profile {
            None => Ok(&self.weights),
            Some(name) => self
                .profiles
                .get(name)
                .ok_or_else(|| ConfigError::UnknownProfile(name.to_string())),
        }
    }

    /// Applies environment overrides to `[weights]` and every profile.
    ///
    /// # Errors
    /// See [`WeightTable::apply_overrides`].
    pub fn with_overrides<K, V>(mut self, vars: &[(K, V)]) -> Result<Self, ConfigError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs = || vars.iter().map(|(k, v)| (k.as_ref(), v.as_ref()));
        self.weights = self.weights.apply_overrides(pairs())?;
        for profile in self.profiles.values_mut() {
            *profile = profile.clone().apply_overrides(pairs())?;
        }
        Ok(self)
    }
}
