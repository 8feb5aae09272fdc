//! Error types for the optiweight engine.
//!
//! Validation failures block an evaluation outright. Configuration failures
//! happen before any evaluation runs. Session failures cover the workflow
//! around the pure engine (simulating or saving before anything was evaluated).

use crate::programme::{DeliveryMethod, ProgrammeType};
use thiserror::Error;

/// Rejection of a programme configuration before evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A numeric input lies outside its domain.
    #[error("Out of range input '{field}': {value} (must be within [{min}, {max}])")]
    OutOfRangeInput {
        /// The offending field
        field: &'static str,
        /// The value supplied
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },

    /// The categorical attributes describe a programme that cannot exist.
    #[error("Inconsistent attributes: a {programme} programme cannot use {method} delivery")]
    InconsistentAttributes {
        /// The requested programme type
        programme: ProgrammeType,
        /// The requested delivery method
        method: DeliveryMethod,
    },
}

impl ValidationError {
    /// Create an out-of-range error for a field with an inclusive domain.
    ///
    /// # Example
    /// ```
    /// use optiweight::error::ValidationError;
    ///
    /// let error = ValidationError::out_of_range("bmi", 40.0, 27.0, 35.0);
    /// assert!(error.to_string().contains("bmi"));
    /// ```
    #[must_use]
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRangeInput {
            field,
            value,
            min,
            max,
        }
    }

    /// Create an inconsistent-attributes error.
    #[must_use]
    pub fn inconsistent(programme: ProgrammeType, method: DeliveryMethod) -> Self {
        Self::InconsistentAttributes { programme, method }
    }
}

/// Failure to load or apply engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML configuration: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// An environment override could not be parsed as a finite number.
    #[error("Invalid override {key}={value:?}: expected a finite number")]
    InvalidOverride {
        /// The environment variable name
        key: String,
        /// The raw value
        value: String,
    },

    /// A configuration value violates its constraint.
    #[error("Invalid parameter '{parameter}': value {value} {constraint}")]
    InvalidParameter {
        /// The name of the parameter
        parameter: &'static str,
        /// The invalid value
        value: f64,
        /// A description of the constraint that was violated
        constraint: &'static str,
    },

    #[error("Unknown weight profile '{0}'")]
    UnknownProfile(String),
}

impl ConfigError {
    /// Create an error for an invalid configuration parameter.
    ///
    /// # Example
    /// ```
    /// use optiweight::error::ConfigError;
    ///
    /// let error = ConfigError::invalid_parameter("bin_count", 0.0, "must be greater than zero");
    /// assert!(error.to_string().contains("bin_count"));
    /// ```
    #[must_use]
    pub fn invalid_parameter(
        parameter: &'static str,
        value: f64,
        constraint: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            parameter,
            value,
            constraint,
        }
    }

    /// Create an error for an unparsable environment override.
    pub fn invalid_override(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidOverride {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Failure of a session-level workflow step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Simulate or save was requested before any successful evaluation.
    #[error("No programme has been evaluated in this session yet")]
    NothingEvaluated,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_error() {
        let error = ValidationError::out_of_range("bmi", 26.5, 27.0, 35.0);
        assert_eq!(
            error.to_string(),
            "Out of range input 'bmi': 26.5 (must be within [27, 35])"
        );
    }

    #[test]
    fn test_inconsistent_attributes_error() {
        let error =
            ValidationError::inconsistent(ProgrammeType::Lifestyle, DeliveryMethod::Injection);
        assert_eq!(
            error.to_string(),
            "Inconsistent attributes: a lifestyle programme cannot use injection delivery"
        );
    }

    #[test]
    fn test_invalid_parameter_error() {
        let error = ConfigError::invalid_parameter("cost_perturbation", -0.1, "must be >= 0");
        assert!(error.to_string().contains("cost_perturbation"));
        assert!(error.to_string().contains("-0.1"));
        assert!(error.to_string().contains("must be >= 0"));
    }

    #[test]
    fn test_invalid_override_error() {
        let error = ConfigError::invalid_override("OPTIWEIGHT_COST", "cheap");
        assert_eq!(
            error.to_string(),
            "Invalid override OPTIWEIGHT_COST=\"cheap\": expected a finite number"
        );
    }

    #[test]
    fn test_unknown_profile_error() {
        let error = ConfigError::UnknownProfile("trial-b".to_string());
        assert_eq!(error.to_string(), "Unknown weight profile 'trial-b'");
    }

    #[test]
    fn test_session_error_wraps_validation() {
        let inner = ValidationError::out_of_range("bmi", 40.0, 27.0, 35.0);
        let error: SessionError = inner.clone().into();
        assert_eq!(error, SessionError::Validation(inner.clone()));
        assert_eq!(error.to_string(), inner.to_string());
    }

    #[test]
    fn test_error_partial_eq() {
        let error1 = ValidationError::out_of_range("bmi", 40.0, 27.0, 35.0);
        let error2 = ValidationError::out_of_range("bmi", 40.0, 27.0, 35.0);
        let error3 = ValidationError::out_of_range("efficacy", -1.0, 0.0, f64::INFINITY);

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }
}
