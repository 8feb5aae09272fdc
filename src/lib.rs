//! # optiweight
//!
//! A decision-analytic engine for weight-management programmes. For one
//! programme configuration it estimates how likely a patient is to take the
//! programme up, what it costs, what health benefit it buys, and how uncertain
//! the resulting cost-effectiveness ratio is.
//!
//! ```rust
//! use optiweight::{evaluate, simulate, Icer, WeightTable, SimulationParams};
//! use optiweight::programme::*;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let config = ProgrammeConfiguration {
//!     bmi: 32.0,
//!     monthly_cost: 250.0,
//!     efficacy: 8.0,
//!     side_effects: SideEffectLevel::Moderate,
//!     frequency: DosingFrequency::Weekly,
//!     method: DeliveryMethod::Injection,
//!     duration: ProgrammeDuration::TwelveMonths,
//!     programme: ProgrammeType::Combined,
//! };
//!
//! let result = evaluate(&config, &WeightTable::default()).unwrap();
//! assert!((result.uptake - 0.634).abs() < 1e-3);
//! assert!(matches!(result.icer, Icer::Ratio(_)));
//!
//! // Perturb cost and benefit by ±30% and bin 500 ICER draws.
//! let mut rng = StdRng::seed_from_u64(42);
//! let histogram = simulate(&result, &SimulationParams::default(), &mut rng);
//! assert_eq!(histogram.total(), 500);
//! ```
//!
//! ## Components
//!
//! - **Weights** ([`config`]): every coefficient and price, loadable from TOML and
//!   environment overrides
//! - **Uptake** ([`uptake`]): linear utility and a numerically stable logistic choice model
//! - **Cost-effectiveness** ([`economics`]): costs, savings, QALYs, net benefit and ICER
//! - **Uncertainty** ([`simulation`]): seeded Monte Carlo perturbation of cost and benefit
//! - **Scenarios** ([`scenario`]): append-only log of saved evaluations with CSV export

pub mod config;
pub mod distributions;
pub mod economics;
pub mod error;
pub mod histogram;
pub mod programme;
pub mod report;
pub mod scenario;
pub mod session;
pub mod simulation;
pub mod traits;
pub mod uptake;

pub use config::{EngineConfig, SimulationParams, WeightTable};
pub use economics::{EvaluationResult, Icer, evaluate};
pub use error::{ConfigError, SessionError, ValidationError};
pub use histogram::Histogram;
pub use programme::ProgrammeConfiguration;
pub use scenario::{ScenarioLog, ScenarioRecord};
pub use session::Session;
pub use simulation::simulate;
