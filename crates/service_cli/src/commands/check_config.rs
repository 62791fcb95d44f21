//! Check-config command implementation
//!
//! Validates a scenario end to end without simulating and prints the merged
//! configuration.

use tracing::info;

use crate::config::ScenarioConfig;
use crate::{CliError, Result};

/// Run the check-config command
pub fn run(scenario: &ScenarioConfig) -> Result<()> {
    let curve = scenario.curve.build()?;
    scenario.model.build(curve)?;
    scenario.simulation_config()?;
    info!(products = scenario.products.len(), "scenario is valid");

    let merged = toml::to_string_pretty(scenario).map_err(|e| CliError::Output(e.to_string()))?;
    println!("{merged}");
    Ok(())
}
