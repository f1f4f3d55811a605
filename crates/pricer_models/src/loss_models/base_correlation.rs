//! Base-correlation loss model.

use std::sync::Arc;

use pricer_core::market_data::{BaseCorrelationSurface, MarketDataError};
use tracing::debug;

use super::lhp::GaussianLhpLossModel;
use super::{DefaultLossModel, LossModelError};
use crate::credit::LossContext;

/// Tranche `[A, D]` priced as the difference of two base tranches `[0, D]`
/// and `[0, A]`, each valued with the Gaussian LHP model at the correlation
/// the surface quotes for the horizon and that detachment.
///
/// When both correlations coincide the tranche is priced by a single LHP
/// evaluation, so a flat surface reproduces the LHP model exactly.
#[derive(Debug, Clone)]
pub struct BaseCorrelationLossModel {
    surface: Arc<BaseCorrelationSurface<f64>>,
    lhp: GaussianLhpLossModel,
}

impl BaseCorrelationLossModel {
    /// Model reading correlations from a shared surface.
    ///
    /// # Errors
    ///
    /// `InvalidModelParameters` for a recovery outside [0, 1].
    pub fn new(
        surface: Arc<BaseCorrelationSurface<f64>>,
        recoveries: Vec<f64>,
    ) -> Result<Self, LossModelError> {
        let lhp = GaussianLhpLossModel::new(0.0, recoveries)?;
        Ok(Self { surface, lhp })
    }

    /// Shared surface.
    pub fn surface(&self) -> &Arc<BaseCorrelationSurface<f64>> {
        &self.surface
    }

    /// Base correlation at the context horizon and `loss_level`.
    ///
    /// # Errors
    ///
    /// `OutOfGridRange` when the surface refuses to extrapolate.
    pub fn correlation(&self, ctx: &LossContext, loss_level: f64) -> Result<f64, LossModelError> {
        let tenor = ctx.horizon();
        self.surface
            .correlation(tenor, loss_level)
            .map_err(|err| match err {
                MarketDataError::OutOfBounds { .. } => LossModelError::OutOfGridRange {
                    tenor,
                    loss_level,
                },
                other => LossModelError::MarketData(other),
            })
    }
}

impl DefaultLossModel for BaseCorrelationLossModel {
    fn name(&self) -> &str {
        "Base correlation Gaussian LHP"
    }

    fn expected_tranche_loss(&self, ctx: &LossContext) -> Result<f64, LossModelError> {
        ctx.validate_tranche()?;
        let rho_d = self.correlation(ctx, ctx.detachment())?;
        let rho_a = if ctx.attachment() > 0.0 {
            self.correlation(ctx, ctx.attachment())?
        } else {
            rho_d
        };
        debug!(rho_a, rho_d, tenor = ctx.horizon(), "base correlations");

        if rho_a == rho_d {
            return self.lhp.with_correlation(rho_d)?.expected_tranche_loss(ctx);
        }
        let upper = self
            .lhp
            .with_correlation(rho_d)?
            .expected_tranche_loss(&ctx.with_tranche(0.0, ctx.detachment()))?;
        let lower = self
            .lhp
            .with_correlation(rho_a)?
            .expected_tranche_loss(&ctx.with_tranche(0.0, ctx.attachment()))?;
        Ok(upper - lower)
    }
}
