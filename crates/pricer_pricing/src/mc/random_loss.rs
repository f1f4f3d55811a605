//! Monte-Carlo loss model with factor-driven recoveries.

use std::sync::Arc;

use tracing::debug;

use pricer_models::credit::LossContext;
use pricer_models::latent::SpotLossLatentModel;
use pricer_models::loss_models::{validate_level, DefaultLossModel, LossDistribution};
use pricer_models::LossModelError;

use super::config::SimulationConfig;
use super::engine::{run_simulation, SimulationResult};
use super::sampler::LatentSampler;

/// Simulated defaults and recoveries over a spot-loss latent model.
///
/// Variables `0..n` trigger defaults as in
/// [`RandomDefaultLossModel`](super::RandomDefaultLossModel). For every
/// defaulted name `i` the recovery variable `n + i` is drawn under the same
/// factors and mapped to a recovery by
/// [`SpotLossLatentModel::recovery_given_latent`].
#[derive(Debug, Clone)]
pub struct RandomLossModel {
    model: Arc<SpotLossLatentModel>,
    config: SimulationConfig,
    sampler: LatentSampler,
    name: String,
}

impl RandomLossModel {
    /// Model over `model` simulated with `config`.
    ///
    /// # Errors
    ///
    /// `InvalidModelParameters` when the copula cannot be sampled.
    pub fn new(
        model: Arc<SpotLossLatentModel>,
        config: SimulationConfig,
    ) -> Result<Self, LossModelError> {
        let sampler = LatentSampler::new(model.latent())?;
        let name = format!("{} random loss", model.latent().copula().label());
        Ok(Self {
            model,
            config,
            sampler,
            name,
        })
    }

    /// Simulation settings.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the simulation for `ctx`.
    pub fn simulate(&self, ctx: &LossContext) -> Result<SimulationResult, LossModelError> {
        ctx.validate_tranche()?;
        let thresholds = self.model.default_thresholds(ctx)?;
        let notionals = ctx.notionals();
        let n = self.model.size();
        let latent = self.model.latent();

        let result = run_simulation(&self.config, ctx, |rng, factors| {
            self.sampler.draw_factors(rng, factors);
            let mut loss = 0.0;
            for (i, (&threshold, &notional)) in thresholds.iter().zip(notionals).enumerate() {
                if self.sampler.draw_latent(latent, i, factors, rng) <= threshold {
                    let x = self.sampler.draw_latent(latent, n + i, factors, rng);
                    loss += notional * (1.0 - self.model.recovery_given_latent(i, x));
                }
            }
            loss
        })?;
        debug!(
            model = %self.name,
            trials = result.n_trials,
            mean = result.mean,
            std_error = result.std_error,
            converged = result.converged,
            "simulation finished"
        );
        Ok(result)
    }
}

impl DefaultLossModel for RandomLossModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn expected_tranche_loss(&self, ctx: &LossContext) -> Result<f64, LossModelError> {
        Ok(self.simulate(ctx)?.mean)
    }

    fn prob_over_loss(&self, ctx: &LossContext, loss_fraction: f64) -> Result<f64, LossModelError> {
        let amount = loss_fraction * ctx.total_notional();
        let result = self.simulate(ctx)?;
        Ok(LossDistribution::from_samples(&result.portfolio_losses)?.prob_over_loss(amount))
    }

    fn percentile(&self, ctx: &LossContext, level: f64) -> Result<f64, LossModelError> {
        validate_level(level)?;
        let result = self.simulate(ctx)?;
        LossDistribution::from_samples(&result.portfolio_losses)?.percentile(level)
    }
}
