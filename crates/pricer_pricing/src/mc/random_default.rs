//! Monte-Carlo loss model with deterministic recoveries.

use std::sync::Arc;

use tracing::debug;

use pricer_models::credit::LossContext;
use pricer_models::latent::ConstantLossLatentModel;
use pricer_models::loss_models::{validate_level, DefaultLossModel, LossDistribution};
use pricer_models::LossModelError;

use super::config::SimulationConfig;
use super::engine::{run_simulation, SimulationResult};
use super::sampler::LatentSampler;

/// Simulated defaults over a shared constant-loss latent model.
///
/// Each trial draws the factors and one shock per name; name `i` defaults
/// when its latent value is at or below its threshold and then loses
/// `N_i (1 - R_i)`.
#[derive(Debug, Clone)]
pub struct RandomDefaultLossModel {
    model: Arc<ConstantLossLatentModel>,
    config: SimulationConfig,
    sampler: LatentSampler,
    name: String,
}

impl RandomDefaultLossModel {
    /// Model over `model` simulated with `config`.
    ///
    /// # Errors
    ///
    /// `InvalidModelParameters` when the copula cannot be sampled.
    pub fn new(
        model: Arc<ConstantLossLatentModel>,
        config: SimulationConfig,
    ) -> Result<Self, LossModelError> {
        let sampler = LatentSampler::new(model.latent())?;
        let name = format!("{} random default", model.latent().copula().label());
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
        let lgds = self.model.losses_given_default(ctx);
        let latent = self.model.latent();

        let result = run_simulation(&self.config, ctx, |rng, factors| {
            self.sampler.draw_factors(rng, factors);
            let mut loss = 0.0;
            for (i, (&threshold, &lgd)) in thresholds.iter().zip(&lgds).enumerate() {
                if self.sampler.draw_latent(latent, i, factors, rng) <= threshold {
                    loss += lgd;
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

impl DefaultLossModel for RandomDefaultLossModel {
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

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_models::latent::{CopulaPolicy, FactorLoadings, IntegrationConfig};
    use pricer_models::loss_models::BinomialLossModel;

    fn latent(n: usize, copula: CopulaPolicy) -> Arc<ConstantLossLatentModel> {
        let integration = IntegrationConfig::for_copula(&copula);
        Arc::new(
            ConstantLossLatentModel::new(
                FactorLoadings::homogeneous(n, 0.3_f64.sqrt()).unwrap(),
                vec![0.4; n],
                copula,
                integration,
            )
            .unwrap(),
        )
    }

    fn config(n: usize, seed: u64) -> SimulationConfig {
        SimulationConfig::builder()
            .n_simulations(n)
            .seed(seed)
            .build()
            .unwrap()
    }

    fn context(attachment: f64, detachment: f64) -> LossContext {
        LossContext::new(5.0, vec![100.0; 5], vec![0.02, 0.04, 0.06, 0.08, 0.1], attachment, detachment)
            .unwrap()
    }

    #[test]
    fn test_name() {
        let m = RandomDefaultLossModel::new(latent(5, CopulaPolicy::Gaussian), config(10, 1)).unwrap();
        assert_eq!(m.name(), "Gaussian random default");
    }

    #[test]
    fn test_deterministic_for_seed() {
        let model = latent(5, CopulaPolicy::Gaussian);
        let m = RandomDefaultLossModel::new(model, config(20_000, 99)).unwrap();
        let ctx = context(0.0, 0.1);
        assert_eq!(
            m.expected_tranche_loss(&ctx).unwrap(),
            m.expected_tranche_loss(&ctx).unwrap()
        );
    }

    #[test]
    fn test_converges_to_binomial() {
        // Identical losses given default make the binomial model exact
        let model = latent(5, CopulaPolicy::Gaussian);
        let ctx = context(0.1, 0.3);
        let exact = BinomialLossModel::new(model.clone()).expected_tranche_loss(&ctx).unwrap();
        let mc = RandomDefaultLossModel::new(model, config(100_000, 2863311530))
            .unwrap()
            .simulate(&ctx)
            .unwrap();
        assert!(
            (mc.mean - exact).abs() < 4.0 * mc.std_error,
            "{} vs {exact} (se {})",
            mc.mean,
            mc.std_error
        );
    }

    #[test]
    fn test_whole_pool_is_expected_loss() {
        let model = latent(5, CopulaPolicy::StudentT { orders: vec![4] });
        let ctx = context(0.0, 1.0);
        let expected = model.expected_portfolio_loss(&ctx);
        let mc = RandomDefaultLossModel::new(model, config(100_000, 7))
            .unwrap()
            .simulate(&ctx)
            .unwrap();
        assert!((mc.mean - expected).abs() < 4.0 * mc.std_error);
    }

    #[test]
    fn test_tail_queries() {
        let model = latent(5, CopulaPolicy::Gaussian);
        let m = RandomDefaultLossModel::new(model, config(10_000, 3)).unwrap();
        let ctx = context(0.0, 0.1);
        assert_eq!(m.prob_over_loss(&ctx, 1.0).unwrap(), 0.0);
        assert_eq!(m.percentile(&ctx, 0.0).unwrap(), 0.0);
        // Every loss is a multiple of the 60 lost per default
        let p99 = m.percentile(&ctx, 0.99).unwrap();
        assert_eq!((p99 / 60.0).fract(), 0.0);
        assert!(m.percentile(&ctx, -0.1).is_err());
    }

    #[test]
    fn test_invalid_tranche() {
        let m = RandomDefaultLossModel::new(latent(5, CopulaPolicy::Gaussian), config(10, 1)).unwrap();
        let ctx = context(0.0, 0.1).with_tranche(0.3, 0.1);
        assert!(matches!(
            m.expected_tranche_loss(&ctx),
            Err(LossModelError::InvalidTrancheBounds { .. })
        ));
    }

    #[test]
    fn test_context_size_checked() {
        let m = RandomDefaultLossModel::new(latent(4, CopulaPolicy::Gaussian), config(10, 1)).unwrap();
        assert!(matches!(
            m.expected_tranche_loss(&context(0.0, 0.1)),
            Err(LossModelError::SizeMismatch { .. })
        ));
    }
}
