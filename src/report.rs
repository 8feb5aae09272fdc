//! Plain-text rendering of evaluation results.
//!
//! This is the only place figures are rounded.

use crate::economics::EvaluationResult;
use crate::histogram::Histogram;
use crate::programme::ProgrammeConfiguration;
use crate::scenario::ScenarioRecord;
use crate::simulation::DrawSummary;
use std::fmt;

/// Inputs and key results of one evaluation.
pub struct ProgrammeSummary<'a> {
    pub config: &'a ProgrammeConfiguration,
    pub result: &'a EvaluationResult,
}

impl fmt::Display for ProgrammeSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (c, r) = (self.config, self.result);
        writeln!(f, "Programme Summary")?;
        writeln!(f, "  BMI {}", c.bmi)?;
        writeln!(f, "  Cost £{}/mo", c.monthly_cost)?;
        writeln!(f, "  ΔBMI {}", c.efficacy)?;
        writeln!(f, "  Side-effects {}", c.side_effects)?;
        writeln!(
            f,
            "  {}, {}, {}, {}",
            c.frequency, c.method, c.duration, c.programme
        )?;
        writeln!(f, "Key Results")?;
        writeln!(f, "  Uptake {:.1} %", r.uptake * 100.0)?;
        writeln!(f, "  Net Benefit per patient £{:.0}", r.net_benefit)?;
        writeln!(f, "  Expected Net (with uptake) £{:.0}", r.expected_net_benefit)?;
        writeln!(f, "  ICER {} / QALY", r.icer)?;
        for advisory in &r.advisories {
            writeln!(f, "  Warning: {advisory}")?;
        }
        Ok(())
    }
}

/// Cost-benefit table with a calculation column.
pub struct CostTable<'a> {
    pub config: &'a ProgrammeConfiguration,
    pub result: &'a EvaluationResult,
}

impl fmt::Display for CostTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.result;
        let months = r.costs.months;
        writeln!(f, "{:<26} {:>10}  Calculation", "Component", "£")?;
        for (name, unit, total) in r.costs.components() {
            writeln!(f, "{name:<26} {total:>10.0}  £{unit} × {months}")?;
        }
        writeln!(f, "{:<26} {:>10.0}  Sum", "Total Cost", r.costs.total)?;
        writeln!(
            f,
            "{:<26} {:>10.0}  ΔBMI {}",
            "Savings (complication ↓)", r.savings, self.config.efficacy
        )?;
        writeln!(
            f,
            "{:<26} {:>10.0}  {:.2} × £{}",
            "QALY Value", r.qaly_value, r.qaly_gain, r.willingness_to_pay
        )?;
        writeln!(f, "{:<26} {:>10.0}  Sav.+QALY-Cost", "Net Benefit", r.net_benefit)
    }
}

/// Horizontal bar chart of an ICER histogram.
pub struct HistogramChart<'a> {
    pub histogram: &'a Histogram,
    /// Width of the fullest bar in characters.
    pub width: usize,
}

impl fmt::Display for HistogramChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peak = self.histogram.peak().max(1);
        let labels = self.histogram.labelled_counts();
        let label_width = labels.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        for (label, count) in labels {
            let bar = count * self.width / peak;
            writeln!(f, "{label:>label_width$} | {} {count}", "#".repeat(bar))?;
        }
        Ok(())
    }
}

/// Descriptive line for a simulation summary.
pub struct SummaryLine<'a>(pub &'a DrawSummary);

impl fmt::Display for SummaryLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(
            f,
            "{} draws · mean £{:.0} · median £{:.0} · range £{:.0}–£{:.0} · {:.0} % cost-effective",
            s.count,
            s.mean,
            s.median,
            s.min,
            s.max,
            s.share_cost_effective * 100.0
        )
    }
}

/// One line of the saved-scenario list, e.g. `[1] Uptake 70 % · Net £5070 · ICER £1560`.
pub struct ScenarioLine<'a>(pub &'a ScenarioRecord);

impl fmt::Display for ScenarioLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;
        let result = record.result();
        write!(
            f,
            "[{}] Uptake {:.0} % · Net £{:.0} · ICER {}",
            record.sequence(),
            result.uptake * 100.0,
            result.net_benefit,
            result.icer
        )
    }
}
