use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use optiweight::programme::*;
use optiweight::simulation::simulate_draws;
use optiweight::{ScenarioLog, SimulationParams, WeightTable, evaluate, simulate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;
use std::time::Duration;

fn example_programme() -> ProgrammeConfiguration {
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

fn benchmark_evaluation(c: &mut Criterion) {
    let weights = WeightTable::default();
    let config = example_programme();

    c.bench_function("evaluate", |b| {
        b.iter(|| black_box(evaluate(black_box(&config), &weights)));
    });
}

fn benchmark_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");
    group.measurement_time(Duration::from_secs(10));

    let result = match evaluate(&example_programme(), &WeightTable::default()) {
        Ok(result) => result,
        Err(e) => panic!("benchmark programme rejected: {e}"),
    };

    for draw_count in [500, 5_000, 50_000] {
        let params = SimulationParams {
            draw_count,
            ..SimulationParams::default()
        };
        group.bench_with_input(
            BenchmarkId::new("histogram", draw_count),
            &params,
            |b, params| {
                let mut rng = StdRng::seed_from_u64(42);
                b.iter(|| black_box(simulate(&result, params, &mut rng)));
            },
        );
    }

    let params = SimulationParams::default();
    group.bench_function("summary_500", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| black_box(simulate_draws(&result, &params, &mut rng).summary()));
    });

    group.finish();
}

fn benchmark_scenario_export(c: &mut Criterion) {
    let weights = WeightTable::default();
    let mut log = ScenarioLog::new();
    for i in 0..100 {
        let config = ProgrammeConfiguration {
            monthly_cost: 100.0 + f64::from(i),
            ..example_programme()
        };
        if let Ok(result) = evaluate(&config, &weights) {
            log.append(config, result);
        }
    }

    c.bench_function("scenario_csv_100", |b| {
        b.iter(|| {
            let mut buffer = Vec::new();
            black_box(log.write_csv(&mut buffer)).ok();
            black_box(buffer)
        });
    });
}

criterion_group!(
    benches,
    benchmark_evaluation,
    benchmark_simulation,
    benchmark_scenario_export
);
criterion_main!(benches);
