//! Binomial expansion loss model.

use std::sync::Arc;

use tracing::debug;

use super::{validate_level, DefaultLossModel, LossDistribution, LossModelError};
use crate::credit::LossContext;
use crate::latent::ConstantLossLatentModel;

/// Conditional default-count distribution with a common loss per default.
///
/// Given the factors, names default independently with probabilities
/// `q_i`; the number of defaults follows the Poisson-binomial law built by
/// recursion over names, and each default costs the conditional average
/// `Σ N_i (1 - R_i) q_i / Σ q_i`. The conditional expected loss is
/// therefore exact and only the tranche's convexity is approximated.
#[derive(Debug, Clone)]
pub struct BinomialLossModel {
    model: Arc<ConstantLossLatentModel>,
    name: String,
}

impl BinomialLossModel {
    /// Model over a shared constant-loss latent model.
    pub fn new(model: Arc<ConstantLossLatentModel>) -> Self {
        let name = format!("{} binomial", model.latent().copula().label());
        Self { model, name }
    }

    /// Underlying latent model.
    pub fn latent_model(&self) -> &Arc<ConstantLossLatentModel> {
        &self.model
    }

    /// Per-node `(loss per default, P(k defaults))` in grid order.
    fn conditional_counts(&self, ctx: &LossContext) -> Result<Vec<(f64, Vec<f64>)>, LossModelError> {
        let thresholds = self.model.default_thresholds(ctx)?;
        let lgds = self.model.losses_given_default(ctx);
        let n = lgds.len();
        let mean_lgd = lgds.iter().sum::<f64>() / n as f64;
        let latent = self.model.latent();

        Ok(latent.grid().map_nodes(|z| {
            let q = latent.conditional_default_probabilities(&thresholds, z);
            let expected_defaults: f64 = q.iter().sum();
            let loss_per_default = if expected_defaults > 0.0 {
                q.iter().zip(&lgds).map(|(q, l)| q * l).sum::<f64>() / expected_defaults
            } else {
                mean_lgd
            };
            (loss_per_default, default_count_distribution(&q))
        }))
    }

    /// Unconditional distribution of the portfolio loss.
    pub fn loss_distribution(&self, ctx: &LossContext) -> Result<LossDistribution, LossModelError> {
        let nodes = self.conditional_counts(ctx)?;
        let weights = self.model.latent().grid().weights();
        let atoms = nodes
            .iter()
            .zip(weights)
            .flat_map(|((loss, counts), &w)| {
                counts
                    .iter()
                    .enumerate()
                    .map(move |(k, p)| (k as f64 * loss, w * p))
            })
            .collect();
        LossDistribution::from_atoms(atoms)
    }
}

/// `P(k defaults)` for independent defaults with probabilities `q`.
pub(crate) fn default_count_distribution(q: &[f64]) -> Vec<f64> {
    let mut dist = vec![0.0; q.len() + 1];
    dist[0] = 1.0;
    for (i, &qi) in q.iter().enumerate() {
        for k in (1..=i + 1).rev() {
            dist[k] = dist[k] * (1.0 - qi) + dist[k - 1] * qi;
        }
        dist[0] *= 1.0 - qi;
    }
    dist
}

impl DefaultLossModel for BinomialLossModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn expected_tranche_loss(&self, ctx: &LossContext) -> Result<f64, LossModelError> {
        ctx.validate_tranche()?;
        let nodes = self.conditional_counts(ctx)?;
        debug!(model = %self.name, nodes = nodes.len(), "binomial integration");
        let weights = self.model.latent().grid().weights();
        Ok(nodes
            .iter()
            .zip(weights)
            .map(|((loss, counts), w)| {
                let conditional: f64 = counts
                    .iter()
                    .enumerate()
                    .map(|(k, p)| p * ctx.tranche_loss(k as f64 * loss))
                    .sum();
                w * conditional
            })
            .sum())
    }

    fn prob_over_loss(&self, ctx: &LossContext, loss_fraction: f64) -> Result<f64, LossModelError> {
        let amount = loss_fraction * ctx.total_notional();
        Ok(self.loss_distribution(ctx)?.prob_over_loss(amount))
    }

    fn percentile(&self, ctx: &LossContext, level: f64) -> Result<f64, LossModelError> {
        validate_level(level)?;
        self.loss_distribution(ctx)?.percentile(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latent::{CopulaPolicy, FactorLoadings, IntegrationConfig};
    use approx::assert_abs_diff_eq;

    fn model(n: usize, weight: f64, copula: CopulaPolicy) -> BinomialLossModel {
        let integration = IntegrationConfig::for_copula(&copula);
        let latent = ConstantLossLatentModel::new(
            FactorLoadings::homogeneous(n, weight).unwrap(),
            vec![0.4; n],
            copula,
            integration,
        )
        .unwrap();
        BinomialLossModel::new(Arc::new(latent))
    }

    // ===== Default count recursion =====

    #[test]
    fn test_count_distribution_matches_binomial() {
        let dist = default_count_distribution(&[0.2; 4]);
        let expected = [0.4096, 0.4096, 0.1536, 0.0256, 0.0016];
        for (d, e) in dist.iter().zip(expected) {
            assert_abs_diff_eq!(*d, e, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_count_distribution_inhomogeneous() {
        let dist = default_count_distribution(&[0.1, 0.5]);
        assert_abs_diff_eq!(dist[0], 0.45, epsilon = 1e-15);
        assert_abs_diff_eq!(dist[1], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(dist[2], 0.05, epsilon = 1e-15);
    }

    // ===== Tranche loss =====

    #[test]
    fn test_independent_names_closed_form() {
        // Zero loading: exact binomial, each default costs 60 of a 300 pool
        let m = model(3, 0.0, CopulaPolicy::Gaussian);
        let ctx = LossContext::new(5.0, vec![100.0; 3], vec![0.1; 3], 0.1, 0.3).unwrap();
        // Tranche [30, 90]: one default 30, two or more 60
        let p1 = 3.0 * 0.1 * 0.81;
        let p2 = 3.0 * 0.01 * 0.9 + 0.001;
        assert_abs_diff_eq!(
            m.expected_tranche_loss(&ctx).unwrap(),
            30.0 * p1 + 60.0 * p2,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_whole_pool_is_expected_loss() {
        for copula in [CopulaPolicy::Gaussian, CopulaPolicy::StudentT { orders: vec![3, 3] }] {
            let m = model(5, 0.5, copula);
            let probs = vec![0.01, 0.05, 0.1, 0.2, 0.3];
            let ctx = LossContext::new(5.0, vec![100.0; 5], probs.clone(), 0.0, 1.0).unwrap();
            let expected: f64 = probs.iter().map(|p| 60.0 * p).sum();
            assert_abs_diff_eq!(m.expected_tranche_loss(&ctx).unwrap(), expected, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_distribution_consistent_with_tranche_loss() {
        let m = model(4, 0.4, CopulaPolicy::Gaussian);
        let ctx = LossContext::new(5.0, vec![100.0; 4], vec![0.1; 4], 0.05, 0.2).unwrap();
        let dist = m.loss_distribution(&ctx).unwrap();
        assert_abs_diff_eq!(
            dist.expected_tranche_loss(&ctx).unwrap(),
            m.expected_tranche_loss(&ctx).unwrap(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_name_reflects_copula() {
        assert_eq!(model(2, 0.3, CopulaPolicy::Gaussian).name(), "Gaussian binomial");
        assert_eq!(
            model(2, 0.3, CopulaPolicy::StudentT { orders: vec![4] }).name(),
            "Student-t binomial"
        );
    }

    #[test]
    fn test_invalid_tranche() {
        let m = model(2, 0.3, CopulaPolicy::Gaussian);
        let ctx = LossContext::new(5.0, vec![1.0; 2], vec![0.1; 2], 0.5, 0.2).unwrap();
        assert!(matches!(
            m.expected_tranche_loss(&ctx),
            Err(LossModelError::InvalidTrancheBounds { .. })
        ));
    }

    #[test]
    fn test_prob_over_loss() {
        let m = model(3, 0.0, CopulaPolicy::Gaussian);
        let ctx = LossContext::new(5.0, vec![100.0; 3], vec![0.1; 3], 0.0, 1.0).unwrap();
        // P(at least one default) = 1 - 0.9^3
        assert_abs_diff_eq!(m.prob_over_loss(&ctx, 0.1).unwrap(), 0.271, epsilon = 1e-10);
        assert_eq!(m.percentile(&ctx, 0.5).unwrap(), 0.0);
        assert_abs_diff_eq!(m.percentile(&ctx, 0.8).unwrap(), 60.0, epsilon = 1e-9);
    }
}
