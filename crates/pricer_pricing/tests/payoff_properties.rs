//! Structural properties of the payoff algebra on simulated paths.

use std::sync::Arc;

use pricer_core::market_data::curves::FlatCurve;
use pricer_models::models::equity::{AssetSpec, MultiAssetBlackScholes};
use pricer_pricing::mc::{BarrierSide, McSimulation, Pricer, SimulationConfig};
use pricer_pricing::payoff::{
    Asset, AssetBarrierNoHit, Axpy, Basket, CallPut, Cash, Exponential, FixedAmount, Max,
    PayoffRef, Redated, VanillaOption,
};
use proptest::prelude::*;

// =============================================================================
// Helpers
// =============================================================================

fn equity_simulation() -> McSimulation<f64> {
    let assets = vec![
        AssetSpec::new("SPX", 100.0, 0.2),
        AssetSpec::new("SX5E", 50.0, 0.25).with_dividend_yield(0.02),
    ];
    let process = MultiAssetBlackScholes::new(assets, None, FlatCurve::new(0.02)).unwrap();
    let config = SimulationConfig::builder()
        .n_paths(256)
        .seed(77)
        .time_interpolation(true)
        .build()
        .unwrap();
    let times: Vec<f64> = (1..=8).map(|i| 0.25 * i as f64).collect();
    let mut sim: McSimulation<f64> =
        McSimulation::new(Arc::new(process), &times, &times, config).unwrap();
    sim.simulate();
    sim
}

fn sample_payoffs() -> Vec<PayoffRef<f64>> {
    let spx: PayoffRef<f64> = Arc::new(Asset::new(1.0, "SPX"));
    let sx5e: PayoffRef<f64> = Arc::new(Asset::new(1.0, "SX5E"));
    let call: PayoffRef<f64> = Arc::new(VanillaOption::new(1.0, "SPX", 100.0, CallPut::Call));
    vec![
        spx.clone(),
        call.clone(),
        Arc::new(Cash::new(0.5, 2.0)),
        Arc::new(Axpy::new(2.0, call.clone(), Some(sx5e.clone()))),
        Arc::new(Max::new(spx.clone(), sx5e.clone())),
        Arc::new(Exponential::new(Arc::new(Axpy::new(0.01, spx.clone(), None)))),
        Arc::new(Basket::new(vec![spx, sx5e], vec![0.5, 0.5], true).unwrap()),
    ]
}

fn no_hit_values(sim: &McSimulation<f64>, down: f64, up: f64) -> Vec<f64> {
    let barrier: PayoffRef<f64> =
        Arc::new(AssetBarrierNoHit::new(0.0, 2.0, down, up, BarrierSide::Both, "SPX").unwrap());
    Pricer::values(&barrier, sim).unwrap()
}

// =============================================================================
// Re-anchoring
// =============================================================================

#[test]
fn test_reanchoring_at_own_time_preserves_values() {
    let sim = equity_simulation();
    for x in sample_payoffs() {
        let same = x.at(x.observation_time());
        assert_eq!(same.observation_time(), x.observation_time());
        assert_eq!(
            Pricer::values(&x, &sim).unwrap(),
            Pricer::values(&same, &sim).unwrap(),
            "{:?}",
            x
        );
    }
}

#[test]
fn test_fixed_amount_stays_observed_today() {
    let x: PayoffRef<f64> = Arc::new(FixedAmount::new(3.0));
    assert_eq!(x.at(1.5).observation_time(), 0.0);
}

proptest! {
    #[test]
    fn test_reanchored_observation_time(t in 0.0f64..2.0) {
        for x in sample_payoffs() {
            prop_assert_eq!(x.at(t).observation_time(), t);
        }
    }

    #[test]
    fn test_redated_matches_reanchored(t in 0.25f64..2.0) {
        let sim = equity_simulation();
        for x in sample_payoffs() {
            let redated: PayoffRef<f64> = Arc::new(Redated::new(&x, t));
            prop_assert_eq!(
                Pricer::values(&redated, &sim).unwrap(),
                Pricer::values(&x.at(t), &sim).unwrap()
            );
        }
    }
}

// =============================================================================
// Barrier no-hit
// =============================================================================

#[test]
fn test_widening_barriers_never_lowers_no_hit_probability() {
    let sim = equity_simulation();
    let corridors = [(90.0, 110.0), (80.0, 120.0), (60.0, 150.0), (1.0, 1_000.0)];
    let mut previous = vec![0.0; sim.n_paths()];
    for (down, up) in corridors {
        let current = no_hit_values(&sim, down, up);
        for (p, c) in previous.iter().zip(&current) {
            assert!((0.0..=1.0).contains(c));
            assert!(c >= p, "no-hit fell from {} to {} at [{}, {}]", p, c, down, up);
        }
        previous = current;
    }
}

#[test]
fn test_breached_barrier_gives_zero() {
    let sim = equity_simulation();
    // spot 100 sits on or above a down barrier of 100
    for value in no_hit_values(&sim, 100.0, 200.0) {
        assert_eq!(value, 0.0);
    }
}
