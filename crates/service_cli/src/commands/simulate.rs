//! Simulate command implementation
//!
//! Simulates the scenario and prints one row per product.

use std::str::FromStr;

use tracing::info;

use crate::config::ScenarioConfig;
use crate::scenario::ProductResult;
use crate::{CliError, Result};

/// Result output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::InvalidFormat(other.to_string())),
        }
    }
}

/// Run the simulate command
pub fn run(scenario: &ScenarioConfig, format: OutputFormat) -> Result<()> {
    info!(
        paths = scenario.simulation.paths,
        seed = scenario.simulation.seed,
        products = scenario.products.len(),
        "starting simulation"
    );
    let results = scenario.run()?;

    match format {
        OutputFormat::Table => print!("{}", render_table(&results)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&results)
                .map_err(|e| CliError::Output(e.to_string()))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn render_table(results: &[ProductResult]) -> String {
    let width = results
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("Product".len());

    let mut out = format!(
        "{:<width$}  {:>14}  {:>12}  {:>12}\n",
        "Product", "NPV", "Std error", "95% CI"
    );
    out.push_str(&format!("{}\n", "-".repeat(width + 44)));
    for r in results {
        out.push_str(&format!(
            "{:<width$}  {:>14.8}  {:>12.8}  {:>12.8}\n",
            r.name,
            r.result.npv,
            r.result.std_error,
            r.result.confidence_95()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_pricing::mc::PricingResult;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str("TABLE").unwrap(), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert!(matches!(
            OutputFormat::from_str("csv"),
            Err(CliError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_render_table() {
        let results = vec![ProductResult {
            name: "cash(5, 5)".to_string(),
            result: PricingResult {
                npv: 0.860708,
                std_error: 0.001,
                n_paths: 1000,
            },
        }];
        let table = render_table(&results);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Product"));
        assert!(lines[2].starts_with("cash(5, 5)"));
        assert!(lines[2].contains("0.86070800"));
        assert!(lines[2].contains("0.00196000"));
    }

    #[test]
    fn test_json_rows_flatten_results() {
        let row = ProductResult {
            name: "zero_bond(1, 2)".to_string(),
            result: PricingResult {
                npv: 0.97,
                std_error: 0.0,
                n_paths: 10,
            },
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["name"], "zero_bond(1, 2)");
        assert_eq!(json["n_paths"], 10);
    }
}
