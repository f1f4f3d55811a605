//! Check command implementation
//!
//! Validates the configuration, builds the basket and prints the settings
//! that a `tranche` run would use.

use anyhow::Context;

use crate::config::RunConfig;
use crate::scenario::{describe_simulation, Scenario};

/// Run the check command
pub fn run(config: &RunConfig) -> anyhow::Result<()> {
    config.validate()?;
    let scenario = Scenario::build(config).context("building basket")?;
    let simulation = config.simulation_config()?;

    println!("{}", config.to_toml()?);
    println!(
        "Basket: {} names, tranche {:.2}%-{:.2}%, {} to {}",
        scenario.size(),
        100.0 * scenario.basket.attachment(),
        100.0 * scenario.basket.detachment(),
        scenario.today,
        scenario.horizon
    );
    println!("Simulation: {}", describe_simulation(&simulation));
    println!("Configuration OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_passes() {
        assert!(run(&RunConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_configuration_fails() {
        let mut config = RunConfig::default();
        config.horizon_months = 0;
        assert!(run(&config).is_err());
    }
}
