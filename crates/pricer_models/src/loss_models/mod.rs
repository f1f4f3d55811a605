//! Tranche loss models.
//!
//! Every model implements [`DefaultLossModel`] and can be attached to a
//! [`Basket`](crate::credit::Basket). Models hold their own parameters and
//! read everything horizon-dependent from the [`LossContext`].
//!
//! - [`GaussianLhpLossModel`]: large homogeneous pool, closed form
//! - [`BinomialLossModel`]: default-count distribution with average loss
//! - [`InhomogeneousPoolLossModel`]: bucketed convolution of name losses
//! - [`BaseCorrelationLossModel`]: LHP at correlations read off a surface
//!
//! Monte-Carlo models implement the same trait in `pricer_pricing`.

mod base_correlation;
mod binomial;
mod distribution;
mod error;
mod inhomogeneous;
mod lhp;

use std::fmt;

use crate::credit::LossContext;

pub use base_correlation::BaseCorrelationLossModel;
pub use binomial::BinomialLossModel;
pub use distribution::LossDistribution;
pub use error::LossModelError;
pub use inhomogeneous::{InhomogeneousPoolLossModel, MIN_LOSS_BUCKETS};
pub use lhp::GaussianLhpLossModel;

/// Strategy computing tranche losses for a basket at a horizon.
///
/// Implementations must validate the tranche of the context before any
/// other work and return losses in currency units.
pub trait DefaultLossModel: Send + Sync + fmt::Debug {
    /// Human-readable model name.
    fn name(&self) -> &str;

    /// Expected loss of the context's tranche.
    fn expected_tranche_loss(&self, ctx: &LossContext) -> Result<f64, LossModelError>;

    /// `P(L > loss_fraction * total notional)` for the portfolio loss `L`.
    fn prob_over_loss(&self, _ctx: &LossContext, _loss_fraction: f64) -> Result<f64, LossModelError> {
        Err(LossModelError::Unsupported(format!(
            "{} does not provide loss probabilities",
            self.name()
        )))
    }

    /// Smallest portfolio loss amount whose CDF reaches `level`.
    fn percentile(&self, _ctx: &LossContext, _level: f64) -> Result<f64, LossModelError> {
        Err(LossModelError::Unsupported(format!(
            "{} does not provide loss percentiles",
            self.name()
        )))
    }
}

/// Fail unless `level` is a probability.
pub fn validate_level(level: f64) -> Result<(), LossModelError> {
    if (0.0..=1.0).contains(&level) {
        Ok(())
    } else {
        Err(LossModelError::InvalidModelParameters(format!(
            "percentile level {level} not in [0, 1]"
        )))
    }
}
