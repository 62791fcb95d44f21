//! Turns a [`ScenarioConfig`] into a simulator and payoffs, and prices them.

use std::sync::Arc;

use pricer_core::market_data::curves::{CurveEnum, CurveInterpolation, InterpolatedCurve};
use pricer_models::models::commodity::{FuturesCurve, TwoFactorMeanReversion, TwoFactorParams};
use pricer_models::models::equity::{AssetSpec, MultiAssetBlackScholes};
use pricer_models::models::hybrid::CorrelationMatrix;
use pricer_models::models::rates::HullWhiteProcess;
use pricer_models::models::{ProcessError, StochasticProcess};
use pricer_pricing::mc::{McSimulation, Pricer, PricingResult, SimulationConfig, SimulationError};
use pricer_pricing::payoff::{union_times, Cash, ModelSwaption, PayoffRef, VanillaOption, ZeroBond};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{CurveSection, ModelSection, ProductSection, ScenarioConfig};
use crate::Result;

/// Priced product row.
#[derive(Debug, Clone, Serialize)]
pub struct ProductResult {
    pub name: String,
    #[serde(flatten)]
    pub result: PricingResult,
}

impl CurveSection {
    /// Discount curve.
    pub fn build(&self) -> Result<CurveEnum<f64>> {
        Ok(match self {
            CurveSection::Flat { rate } => CurveEnum::flat(*rate),
            CurveSection::Interpolated {
                tenors,
                rates,
                method,
            } => {
                let method: CurveInterpolation = method.parse()?;
                InterpolatedCurve::new(tenors, rates, method)?.into()
            }
        })
    }
}

impl ModelSection {
    /// Process over `curve`.
    pub fn build(&self, curve: CurveEnum<f64>) -> Result<Arc<dyn StochasticProcess<f64>>> {
        let process: Arc<dyn StochasticProcess<f64>> = match self {
            ModelSection::HullWhite {
                mean_reversion,
                volatility,
            } => Arc::new(HullWhiteProcess::new(*mean_reversion, *volatility, curve)?),
            ModelSection::BlackScholes {
                assets,
                correlation,
            } => {
                let specs: Vec<AssetSpec> = assets
                    .iter()
                    .map(|a| {
                        AssetSpec::new(a.alias.clone(), a.spot, a.volatility)
                            .with_dividend_yield(a.dividend_yield)
                    })
                    .collect();
                let correlation = correlation
                    .as_ref()
                    .map(|data| CorrelationMatrix::new(data, specs.len()))
                    .transpose()
                    .map_err(ProcessError::from)?;
                Arc::new(MultiAssetBlackScholes::new(specs, correlation, curve)?)
            }
            ModelSection::TwoFactor {
                alias,
                futures_times,
                futures_prices,
                sigma,
                eta,
                a,
                b,
                rho,
            } => {
                let futures = FuturesCurve::new(futures_times, futures_prices)?;
                let params = TwoFactorParams::constant(*sigma, *eta, *a, *b, *rho);
                Arc::new(TwoFactorMeanReversion::new(alias.clone(), futures, params, curve)?)
            }
        };
        Ok(process)
    }
}

impl ProductSection {
    /// Payoff tree.
    pub fn payoff(&self) -> PayoffRef<f64> {
        match self {
            ProductSection::Cash { obs, pay } => Arc::new(Cash::new(*obs, *pay)),
            ProductSection::ZeroBond { obs, maturity } => Arc::new(ZeroBond::new(*obs, *maturity)),
            ProductSection::Vanilla {
                obs,
                alias,
                strike,
                call_put,
            } => Arc::new(VanillaOption::new(*obs, alias.clone(), *strike, *call_put)),
            ProductSection::Swaption {
                expiry,
                times,
                strike,
                call_put,
            } => Arc::new(ModelSwaption::new(
                *expiry,
                times.clone(),
                Vec::new(),
                *strike,
                *call_put,
            )),
        }
    }
}

impl ScenarioConfig {
    /// Simulator configuration.
    pub fn simulation_config(&self) -> Result<SimulationConfig> {
        let s = &self.simulation;
        SimulationConfig::builder()
            .n_paths(s.paths)
            .seed(s.seed)
            .richardson(s.richardson)
            .time_interpolation(s.time_interpolation)
            .store_brownians(s.store_brownians)
            .build()
            .map_err(|e| SimulationError::from(e).into())
    }

    /// Observation grid: configured times, every time a product reads and
    /// every adjuster calibration time.
    pub fn obs_times(&self, payoffs: &[PayoffRef<f64>]) -> Vec<f64> {
        let a = &self.adjusters;
        let mut times = union_times(self.simulation.obs_times.clone(), &a.numeraire);
        times = union_times(times, &a.zero_bond_times);
        times = union_times(times, &a.asset_times);
        for x in payoffs {
            times = union_times(times, &x.observation_times());
        }
        times.retain(|&t| t > 0.0);
        times
    }

    /// Builds and populates the simulator for `payoffs`, then calibrates
    /// the configured adjusters.
    pub fn simulation(&self, payoffs: &[PayoffRef<f64>]) -> Result<McSimulation<f64>> {
        let process = self.model.build(self.curve.build()?)?;
        let mut obs_times = self.obs_times(payoffs);
        if obs_times.is_empty() {
            warn!("products only observe today; simulating a single year step");
            obs_times.push(1.0);
        }
        let sim_times = if self.simulation.sim_times.is_empty() {
            obs_times.clone()
        } else {
            self.simulation.sim_times.clone()
        };

        let mut sim = McSimulation::new(process, &sim_times, &obs_times, self.simulation_config()?)?;
        sim.simulate();

        let a = &self.adjusters;
        if !a.numeraire.is_empty() {
            sim.calibrate_numeraire_adjuster(&a.numeraire)?;
        }
        if !a.zero_bond_times.is_empty() {
            sim.calibrate_zero_bond_adjuster(&a.zero_bond_times, &a.zero_bond_offsets)?;
        }
        if !a.asset_times.is_empty() {
            let aliases: Vec<&str> = a.assets.iter().map(String::as_str).collect();
            sim.calibrate_asset_adjuster(&a.asset_times, &aliases)?;
        }
        Ok(sim)
    }

    /// Simulates and prices every product.
    pub fn run(&self) -> Result<Vec<ProductResult>> {
        let payoffs: Vec<PayoffRef<f64>> = self.products.iter().map(|p| p.payoff()).collect();
        let sim = self.simulation(&payoffs)?;
        if sim.truncations() > 0 {
            warn!(truncations = sim.truncations(), "states were truncated");
        }

        let results = self
            .products
            .iter()
            .zip(payoffs)
            .map(|(product, payoff)| -> Result<ProductResult> {
                let result = Pricer::new(vec![payoff]).price(&sim)?;
                info!(product = %product.label(), npv = result.npv, "priced");
                Ok(ProductResult {
                    name: product.label(),
                    result,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use approx::assert_relative_eq;
    use pricer_core::market_data::curves::YieldCurve;

    const EQUITY: &str = r#"
        [simulation]
        paths = 1000
        seed = 11

        [curve]
        kind = "interpolated"
        tenors = [1.0, 5.0]
        rates = [0.02, 0.03]

        [model]
        kind = "black_scholes"
        correlation = [1.0, 0.5, 0.5, 1.0]

        [[model.assets]]
        alias = "SPX"
        spot = 100.0
        volatility = 0.2
        dividend_yield = 0.01

        [[model.assets]]
        alias = "SX5E"
        spot = 50.0
        volatility = 0.25

        [adjusters]
        asset_times = [0.5, 1.0]
        assets = ["SPX"]

        [[products]]
        kind = "vanilla"
        obs = 1.0
        alias = "SPX"
        strike = 100.0
        call_put = "Call"

        [[products]]
        kind = "zero_bond"
        obs = 0.5
        maturity = 1.0
    "#;

    fn scenario(text: &str) -> ScenarioConfig {
        ScenarioConfig::from_toml_str(text, &Overrides::default()).unwrap()
    }

    #[test]
    fn test_curve_sections_build() {
        let flat = CurveSection::Flat { rate: 0.05 }.build().unwrap();
        assert_relative_eq!(flat.discount_factor(2.0).unwrap(), (-0.1_f64).exp());

        let bad = CurveSection::Interpolated {
            tenors: vec![1.0, 2.0],
            rates: vec![0.01, 0.02],
            method: "cubic".to_string(),
        };
        assert!(bad.build().is_err());
    }

    #[test]
    fn test_obs_times_collects_products_and_adjusters() {
        let scenario = scenario(EQUITY);
        let payoffs: Vec<PayoffRef<f64>> = scenario.products.iter().map(|p| p.payoff()).collect();
        assert_eq!(scenario.obs_times(&payoffs), vec![0.5, 1.0]);
    }

    #[test]
    fn test_equity_scenario_runs() {
        let results = scenario(EQUITY).run().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "call(SPX, 1, 100)");
        assert!(results[0].result.npv > 0.0);
        assert!(results[0].result.std_error > 0.0);
        assert_eq!(results[1].result.n_paths, 1000);
    }

    #[test]
    fn test_hull_white_scenario_reprices_curve() {
        let text = r#"
            [simulation]
            paths = 2000
            richardson = false

            [model]
            kind = "hull_white"
            mean_reversion = 0.1
            volatility = 0.01

            [adjusters]
            numeraire = [1.0, 2.0, 5.0]

            [[products]]
            kind = "cash"
            obs = 5.0
            pay = 5.0
        "#;
        let results = scenario(text).run().unwrap();
        assert_relative_eq!(results[0].result.npv, (-0.15_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_mismatched_correlation_is_rejected() {
        let text = EQUITY.replace("[1.0, 0.5, 0.5, 1.0]", "[1.0, 0.5, 0.5]");
        assert!(scenario(&text).run().is_err());
    }

    #[test]
    fn test_unknown_alias_surfaces_as_error() {
        let text = EQUITY.replace("alias = \"SPX\"\n        strike", "alias = \"NKY\"\n        strike");
        assert!(scenario(&text).run().is_err());
    }

    #[test]
    fn test_shipped_scenarios_are_valid() {
        for text in [
            include_str!("../scenarios/hull_white.toml"),
            include_str!("../scenarios/equity.toml"),
        ] {
            let config = scenario(text);
            let curve = config.curve.build().unwrap();
            assert!(config.model.build(curve).is_ok());
            assert!(config.simulation_config().is_ok());
        }
    }
}
