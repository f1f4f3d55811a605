//! Inhomogeneous pool model: bucketed convolution of name losses.

use std::sync::Arc;

use tracing::debug;

use super::{validate_level, DefaultLossModel, LossDistribution, LossModelError};
use crate::credit::LossContext;
use crate::latent::ConstantLossLatentModel;

/// Fewest loss buckets accepted by [`InhomogeneousPoolLossModel::new`].
pub const MIN_LOSS_BUCKETS: usize = 10;

/// Conditional loss distribution on a uniform loss grid.
///
/// The axis `[0, Σ N_i (1 - R_i)]` is cut into `n_buckets` buckets of width
/// `h`. A name losing `x` is placed on the two grid points around `x / h`,
/// then names are convolved one by one conditional on the factors. Each
/// grid point also accumulates the true loss of the scenarios routed to it
/// and is valued at their mean, so no point lies above the maximum loss and
/// the whole-pool tranche returns the expected loss exactly. The grid keeps
/// one bucket of headroom per name for rounding up.
#[derive(Debug, Clone)]
pub struct InhomogeneousPoolLossModel {
    model: Arc<ConstantLossLatentModel>,
    n_buckets: usize,
    name: String,
}

/// Name loss split between grid points `lower` and `lower + 1`.
#[derive(Debug, Clone, Copy)]
struct BucketSplit {
    lower: usize,
    upper_weight: f64,
    loss: f64,
}

impl InhomogeneousPoolLossModel {
    /// Model with `n_buckets` loss buckets.
    ///
    /// # Errors
    ///
    /// `InvalidModelParameters` when `n_buckets < MIN_LOSS_BUCKETS`.
    pub fn new(model: Arc<ConstantLossLatentModel>, n_buckets: usize) -> Result<Self, LossModelError> {
        if n_buckets < MIN_LOSS_BUCKETS {
            return Err(LossModelError::InvalidModelParameters(format!(
                "at least {MIN_LOSS_BUCKETS} loss buckets are required, got {n_buckets}"
            )));
        }
        let name = format!("{} inhomogeneous", model.latent().copula().label());
        Ok(Self {
            model,
            n_buckets,
            name,
        })
    }

    /// Number of loss buckets.
    pub fn n_buckets(&self) -> usize {
        self.n_buckets
    }

    /// Unconditional distribution of the portfolio loss on the bucket grid.
    pub fn loss_distribution(&self, ctx: &LossContext) -> Result<LossDistribution, LossModelError> {
        let thresholds = self.model.default_thresholds(ctx)?;
        let lgds = self.model.losses_given_default(ctx);
        let max_loss: f64 = lgds.iter().sum();
        if max_loss <= 0.0 {
            return LossDistribution::new(vec![0.0], vec![1.0]);
        }

        let width = max_loss / self.n_buckets as f64;
        let splits: Vec<BucketSplit> = lgds
            .iter()
            .map(|&l| {
                let position = l / width;
                let lower = position.floor();
                BucketSplit {
                    lower: lower as usize,
                    upper_weight: position - lower,
                    loss: l,
                }
            })
            .collect();
        let points = self.n_buckets + lgds.len() + 1;
        debug!(model = %self.name, width, points, "inhomogeneous loss grid");

        let latent = self.model.latent();
        let moments = latent.integrate_vec(2 * points, |z| {
            let q = latent.conditional_default_probabilities(&thresholds, z);
            let (mut dist, loss_mass) = convolve(&q, &splits, points);
            dist.extend(loss_mass);
            dist
        });
        let (probabilities, loss_mass) = moments.split_at(points);

        let atoms = probabilities
            .iter()
            .zip(loss_mass)
            .filter(|(&p, _)| p > 0.0)
            .map(|(&p, &m)| ((m / p).clamp(0.0, max_loss), p))
            .collect();
        LossDistribution::from_atoms(atoms)
    }
}

/// Conditional probabilities of the `points` grid points, and the
/// probability-weighted true loss routed to each of them.
fn convolve(q: &[f64], splits: &[BucketSplit], points: usize) -> (Vec<f64>, Vec<f64>) {
    let mut dist = vec![0.0; points];
    let mut loss_mass = vec![0.0; points];
    dist[0] = 1.0;
    let mut reach = 0;
    for (&qi, split) in q.iter().zip(splits) {
        if qi <= 0.0 {
            continue;
        }
        let shift = split.lower;
        let up = split.upper_weight;
        let new_reach = (reach + shift + 1).min(points - 1);
        let mut next = vec![0.0; points];
        let mut next_loss = vec![0.0; points];
        for j in 0..=reach {
            let mass = dist[j];
            if mass == 0.0 {
                continue;
            }
            let carried = loss_mass[j];
            next[j] += mass * (1.0 - qi);
            next_loss[j] += carried * (1.0 - qi);

            let target = (j + shift).min(points - 1);
            let down = qi * (1.0 - up);
            next[target] += mass * down;
            next_loss[target] += (carried + mass * split.loss) * down;
            if up > 0.0 {
                let above = (target + 1).min(points - 1);
                next[above] += mass * qi * up;
                next_loss[above] += (carried + mass * split.loss) * qi * up;
            }
        }
        dist = next;
        loss_mass = next_loss;
        reach = new_reach;
    }
    (dist, loss_mass)
}

impl DefaultLossModel for InhomogeneousPoolLossModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn expected_tranche_loss(&self, ctx: &LossContext) -> Result<f64, LossModelError> {
        ctx.validate_tranche()?;
        self.loss_distribution(ctx)?.expected_tranche_loss(ctx)
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
