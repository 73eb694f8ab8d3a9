//! Performance benchmarks for ECOGRID

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ecogrid::{
    AnalysisRunner, AnalysisSettings, Config, RunSettings, Scenario, SimulationEngine,
};

fn benchmark_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");

    for scenario in Scenario::ALL {
        group.bench_with_input(
            BenchmarkId::new("scenario", scenario.name()),
            &scenario,
            |b, &scenario| {
                let mut seed = 0u64;
                b.iter(|| {
                    seed += 1;
                    let mut engine = SimulationEngine::new_with_seed(Config::default(), seed);
                    let settings = RunSettings::new(50, scenario).with_third_species(true);
                    engine.initialize(settings).unwrap();
                    black_box(engine.run().unwrap())
                });
            },
        );
    }

    group.finish();
}

fn benchmark_snapshot(c: &mut Criterion) {
    let mut engine = SimulationEngine::new_with_seed(Config::default(), 42);
    engine
        .initialize(RunSettings::new(10, Scenario::Balanced))
        .unwrap();
    engine.execute_turn().unwrap();

    c.bench_function("snapshot", |b| {
        b.iter(|| black_box(engine.snapshot().unwrap()));
    });

    c.bench_function("verify_consistency", |b| {
        b.iter(|| black_box(engine.verify_consistency().is_ok()));
    });
}

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    group.sample_size(10);

    for runs in [4usize, 16].iter() {
        let settings = AnalysisSettings::new(30, *runs).with_base_seed(1);
        let runner = AnalysisRunner::new(Config::default(), settings);

        group.bench_with_input(BenchmarkId::new("runs", runs), runs, |b, _| {
            b.iter(|| black_box(runner.analyze_scenario(Scenario::Balanced).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_full_run,
    benchmark_snapshot,
    benchmark_analysis
);
criterion_main!(benches);
