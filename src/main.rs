// ========================================================================================
//
//                            OPTIWEIGHT COMMAND-LINE FRONT END
//
// ========================================================================================
//
// Thin shell over the engine: resolves configuration (file, profile, environment),
// owns one session, and prints the text reports. All modelling happens in the library.

use clap::{Args, Parser, Subcommand};
use optiweight::config::{CONFIG_PATH_ENV, EngineConfig};
use optiweight::programme::{
    DeliveryMethod, DosingFrequency, ProgrammeConfiguration, ProgrammeDuration, ProgrammeType,
    SideEffectLevel,
};
use optiweight::report::{
    CostTable, HistogramChart, ProgrammeSummary, ScenarioLine, SummaryLine,
};
use optiweight::{Session, SimulationParams};
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;

/// Width in characters of the fullest histogram bar.
const CHART_WIDTH: usize = 40;

// ========================================================================================
//                         COMMAND-LINE INTERFACE DEFINITION
// ========================================================================================

#[derive(Parser, Debug)]
#[clap(
    name = "optiweight",
    version,
    about = "Uptake and cost-effectiveness calculator for weight-management programmes."
)]
struct Cli {
    /// TOML configuration file (weights, simulation, profiles). Falls back to $OPTIWEIGHT_CONFIG.
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Named weight profile from the configuration file.
    #[clap(long, global = true)]
    profile: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one programme configuration.
    Evaluate(EvaluateArgs),
    /// Evaluate every [[scenario]] in a TOML file and list them.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Baseline patient BMI (27–35).
    #[clap(long)]
    bmi: f64,

    /// Patient-facing cost per month.
    #[clap(long)]
    cost: f64,

    /// Expected BMI reduction in kg/m².
    #[clap(long)]
    efficacy: f64,

    /// none, mild or moderate.
    #[clap(long, default_value = "none")]
    side_effects: SideEffectLevel,

    /// weekly or other.
    #[clap(long, default_value = "other")]
    frequency: DosingFrequency,

    /// injection or lifestyle.
    #[clap(long)]
    method: DeliveryMethod,

    /// Programme length in months (6 or 12).
    #[clap(long, default_value = "6")]
    duration: ProgrammeDuration,

    /// lifestyle or combined.
    #[clap(long)]
    programme: ProgrammeType,

    /// Also run the ICER uncertainty simulation.
    #[clap(long)]
    simulate: bool,

    /// Number of simulation draws.
    #[clap(long)]
    draws: Option<usize>,

    /// Number of histogram bins.
    #[clap(long)]
    bins: Option<usize>,

    /// Seed for reproducible simulations.
    #[clap(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// TOML file with one [[scenario]] table per configuration.
    scenarios: PathBuf,

    /// Write the evaluated scenarios to this CSV file.
    #[clap(long)]
    csv: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchFile {
    #[serde(default, rename = "scenario")]
    scenarios: Vec<ProgrammeConfiguration>,
}

// ========================================================================================
//                                     ORCHESTRATION
// ========================================================================================

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Evaluate(args) => run_evaluate(config, cli.profile.as_deref(), args),
        Command::Batch(args) => run_batch(&config, cli.profile.as_deref(), &args),
    }
}

/// Configuration file (flag, then environment), then `OPTIWEIGHT_*` overrides.
fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn Error>> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
    let config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let vars: Vec<(String, String)> = std::env::vars().collect();
    Ok(config.with_overrides(&vars)?)
}

fn run_evaluate(
    mut config: EngineConfig,
    profile: Option<&str>,
    args: EvaluateArgs,
) -> Result<(), Box<dyn Error>> {
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.draws.is_some() || args.bins.is_some() {
        let current = &config.simulation;
        config.simulation = SimulationParams::new(
            args.draws.unwrap_or(current.draw_count),
            current.cost_perturbation,
            current.benefit_perturbation,
            args.bins.unwrap_or(current.bin_count.get()),
        )?;
    }

    let mut session = Session::from_config(&config, profile)?;
    let programme = ProgrammeConfiguration {
        bmi: args.bmi,
        monthly_cost: args.cost,
        efficacy: args.efficacy,
        side_effects: args.side_effects,
        frequency: args.frequency,
        method: args.method,
        duration: args.duration,
        programme: args.programme,
    };

    let result = session.evaluate(programme.clone())?.clone();
    println!(
        "{}",
        ProgrammeSummary {
            config: &programme,
            result: &result,
        }
    );
    println!(
        "{}",
        CostTable {
            config: &programme,
            result: &result,
        }
    );

    if args.simulate {
        let report = session.simulate()?;
        let params = session.params();
        println!(
            "ICER Uncertainty ({} draws, cost ±{:.0}%, benefit ±{:.0}%)",
            params.draw_count,
            params.cost_perturbation * 100.0,
            params.benefit_perturbation * 100.0
        );
        print!(
            "{}",
            HistogramChart {
                histogram: &report.histogram,
                width: CHART_WIDTH,
            }
        );
        if let Some(summary) = &report.summary {
            println!("{}", SummaryLine(summary));
        }
    }
    Ok(())
}

fn run_batch(
    config: &EngineConfig,
    profile: Option<&str>,
    args: &BatchArgs,
) -> Result<(), Box<dyn Error>> {
    let source = fs::read_to_string(&args.scenarios)?;
    let batch: BatchFile = toml::from_str(&source)?;
    log::info!(
        "evaluating {} scenarios from {}",
        batch.scenarios.len(),
        args.scenarios.display()
    );

    let mut session = Session::from_config(config, profile)?;
    for (index, programme) in batch.scenarios.into_iter().enumerate() {
        match session.evaluate(programme) {
            Ok(_) => {
                session.save_current()?;
            }
            Err(e) => eprintln!("Skipping scenario {}: {e}", index + 1),
        }
    }

    for record in session.scenarios() {
        println!("{}", ScenarioLine(record));
    }

    if let Some(path) = &args.csv {
        let file = fs::File::create(path)?;
        session.scenarios().write_csv(BufWriter::new(file))?;
        log::info!("wrote {} scenarios to {}", session.scenarios().len(), path.display());
    }
    Ok(())
}
