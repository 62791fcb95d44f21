//! Criterion benchmarks for the Monte Carlo engine.
//!
//! Benchmarks cover:
//! - Normal stream generation
//! - Full simulation (Euler and Richardson) over path counts
//! - Payoff evaluation on a simulated Hull-White set

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_core::market_data::curves::FlatCurve;
use pricer_models::models::rates::HullWhiteProcess;
use pricer_pricing::mc::{McSimulation, Pricer, SimulationConfig};
use pricer_pricing::payoff::{CallPut, Cash, ModelSwaption, PayoffRef};
use pricer_pricing::rng::PricerRng;

const TIMES: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

fn hull_white_simulation(n_paths: usize, richardson: bool) -> McSimulation<f64> {
    let process = HullWhiteProcess::new(0.05, 0.01, FlatCurve::new(0.03)).unwrap();
    let config = SimulationConfig::builder()
        .n_paths(n_paths)
        .seed(42)
        .richardson(richardson)
        .build()
        .unwrap();
    McSimulation::<f64>::new(Arc::new(process), &TIMES, &TIMES, config).unwrap()
}

/// Per-path stream throughput.
fn bench_rng_streams(c: &mut Criterion) {
    let mut group = c.benchmark_group("rng_streams");

    for n_samples in [1_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("fill_normal", n_samples),
            &n_samples,
            |b, &n| {
                let mut rng = PricerRng::for_path(42, 7);
                let mut buffer = vec![0.0; n];
                b.iter(|| {
                    rng.fill_normal(&mut buffer);
                    black_box(buffer.iter().sum::<f64>())
                });
            },
        );
    }

    group.finish();
}

/// Full simulation on a ten year annual grid.
fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    group.sample_size(20);

    for n_paths in [1_000, 10_000] {
        for richardson in [false, true] {
            let label = if richardson { "richardson" } else { "euler" };
            group.bench_with_input(BenchmarkId::new(label, n_paths), &n_paths, |b, &n| {
                let mut sim = hull_white_simulation(n, richardson);
                b.iter(|| {
                    sim.simulate();
                    black_box(sim.generation())
                });
            });
        }
    }

    group.finish();
}

/// Portfolio NPV on an already simulated set.
fn bench_pricing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pricing");
    group.sample_size(20);

    let mut sim = hull_white_simulation(10_000, false);
    sim.simulate();

    let swaption: PayoffRef<f64> = Arc::new(ModelSwaption::new(
        1.0,
        TIMES.to_vec(),
        vec![],
        0.03,
        CallPut::Call,
    ));
    let bonds: Vec<PayoffRef<f64>> = TIMES
        .iter()
        .map(|&t| Arc::new(Cash::new(0.0, t)) as PayoffRef<f64>)
        .collect();

    let swaption_pricer = Pricer::new(vec![swaption]);
    group.bench_function("model_swaption", |b| {
        b.iter(|| black_box(swaption_pricer.npv(&sim).unwrap()))
    });

    let bond_pricer = Pricer::new(bonds);
    group.bench_function("zero_bond_strip", |b| {
        b.iter(|| black_box(bond_pricer.npvs(&sim).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_rng_streams, bench_simulate, bench_pricing);
criterion_main!(benches);
