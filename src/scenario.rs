//! Append-only log of evaluated scenarios for side-by-side comparison.

use crate::economics::EvaluationResult;
use crate::programme::ProgrammeConfiguration;
use serde::Serialize;
use std::io;

/// An evaluated configuration, numbered in the order it was saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioRecord {
    sequence: u64,
    config: ProgrammeConfiguration,
    result: EvaluationResult,
}

impl ScenarioRecord {
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub fn config(&self) -> &ProgrammeConfiguration {
        &self.config
    }

    #[must_use]
    pub fn result(&self) -> &EvaluationResult {
        &self.result
    }
}

/// Insertion-ordered, unbounded scenario log. Records are never edited or removed.
#[derive(Debug, Clone, Default)]
pub struct ScenarioLog {
    records: Vec<ScenarioRecord>,
}

/// Flat CSV row; figures are written unrounded.
#[derive(Serialize)]
struct ScenarioRow<'a> {
    sequence: u64,
    bmi: f64,
    monthly_cost: f64,
    efficacy: f64,
    side_effects: &'a str,
    frequency: String,
    method: String,
    duration_months: u32,
    programme: String,
    utility: f64,
    uptake: f64,
    total_cost: f64,
    savings: f64,
    qaly_gain: f64,
    qaly_value: f64,
    net_benefit: f64,
    expected_net_benefit: f64,
    icer: Option<f64>,
}

impl<'a> From<&'a ScenarioRecord> for ScenarioRow<'a> {
    fn from(record: &'a ScenarioRecord) -> Self {
        let (config, result) = (&record.config, &record.result);
        Self {
            sequence: record.sequence,
            bmi: config.bmi,
            monthly_cost: config.monthly_cost,
            efficacy: config.efficacy,
            side_effects: config.side_effects.label(),
            frequency: config.frequency.to_string(),
            method: config.method.to_string(),
            duration_months: config.duration.months(),
            programme: config.programme.to_string(),
            utility: result.utility,
            uptake: result.uptake,
            total_cost: result.costs.total,
            savings: result.savings,
            qaly_gain: result.qaly_gain,
            qaly_value: result.qaly_value,
            net_benefit: result.net_benefit,
            expected_net_benefit: result.expected_net_benefit,
            icer: result.icer.value(),
        }
    }
}

impl ScenarioLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a scenario and returns its sequence number (starting at 1).
    ///
    /// # Example
    /// ```rust
    /// use optiweight::config::WeightTable;
    /// use optiweight::economics::evaluate;
    /// use optiweight::programme::*;
    /// use optiweight::scenario::ScenarioLog;
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
    ///
    /// let mut log = ScenarioLog::new();
    /// assert_eq!(log.append(config.clone(), result.clone()), 1);
    /// assert_eq!(log.append(config, result), 2);
    /// assert_eq!(log.len(), 2);
    /// ```
    pub fn append(&mut self, config: ProgrammeConfiguration, result: EvaluationResult) -> u64 {
        let sequence = self.records.last().map_or(1, |last| last.sequence + 1);
        self.records.push(ScenarioRecord {
            sequence,
            config,
            result,
        });
        sequence
    }

    /// Records in the order they were appended.
    #[must_use]
    pub fn list(&self) -> &[ScenarioRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes every record as a CSV row, with a header line.
    ///
    /// # Errors
    /// Returns an error if writing to `writer` fails.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        if self.records.is_empty() {
            // serde-driven headers are only emitted with the first row
            csv_writer.write_record(CSV_HEADER)?;
        }
        for record in &self.records {
            csv_writer.serialize(ScenarioRow::from(record))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

const CSV_HEADER: [&str; 18] = [
    "sequence",
    "bmi",
    "monthly_cost",
    "efficacy",
    "side_effects",
    "frequency",
    "method",
    "duration_months",
    "programme",
    "utility",
    "uptake",
    "total_cost",
    "savings",
    "qaly_gain",
    "qaly_value",
    "net_benefit",
    "expected_net_benefit",
    "icer",
];

impl<'a> IntoIterator for &'a ScenarioLog {
    type Item = &'a ScenarioRecord;
    type IntoIter = std::slice::Iter<'a, ScenarioRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
