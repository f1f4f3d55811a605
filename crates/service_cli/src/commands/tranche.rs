//! Tranche command implementation
//!
//! Evaluates the expected tranche loss of the configured basket under every
//! loss model in turn.

use std::time::Instant;

use anyhow::Context;
use tracing::info;

use crate::config::RunConfig;
use crate::scenario::{model_lineup, Scenario};

/// Expected tranche loss per model, in evaluation order.
pub fn evaluate(config: &RunConfig) -> anyhow::Result<Vec<(String, f64)>> {
    let mut scenario = Scenario::build(config).context("building basket")?;
    let models = model_lineup(config, &scenario).context("building loss models")?;

    let mut results = Vec::with_capacity(models.len());
    for model in models {
        let name = model.name().to_string();
        scenario.basket.set_loss_model(model);
        let loss = scenario
            .basket
            .expected_tranche_loss(scenario.horizon)
            .with_context(|| format!("evaluating {name}"))?;
        info!(model = %name, loss, "tranche loss");
        results.push((name, loss));
    }
    Ok(results)
}

/// Run the tranche command
pub fn run(config: &RunConfig) -> anyhow::Result<()> {
    let started = Instant::now();
    println!(
        "Tranche {:.2}%-{:.2}% of {} names, {} months from {}",
        100.0 * config.basket.attachment,
        100.0 * config.basket.detachment,
        config.basket.hazard_rates.len(),
        config.horizon_months,
        config.reference_date
    );

    for (name, loss) in evaluate(config)? {
        println!("{name:<32} {loss:>12.6}");
    }

    println!("Run completed in {:.3} s", started.elapsed().as_secs_f64());
    Ok(())
}
