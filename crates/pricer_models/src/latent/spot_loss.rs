//! Latent model with factor-driven recoveries.

use super::constant_loss::validate_recoveries;
use super::copula::CopulaPolicy;
use super::default_model::DefaultLatentModel;
use super::integration::IntegrationConfig;
use super::loadings::FactorLoadings;
use crate::analytical::{norm_cdf, norm_inv_cdf};
use crate::credit::LossContext;
use crate::loss_models::LossModelError;

/// Latent model over `2n` variables: `Y_0..Y_n` trigger defaults and
/// `Y_n..Y_2n` drive the recoveries of the same names.
///
/// Given its recovery variable `X`, name `i` recovers
/// `R_i = Φ(sqrt(1 + A²) Φ⁻¹(R̄_i) + A X)`, which averages to `R̄_i`
/// when `X` is standard normal. `A` controls recovery dispersion.
#[derive(Debug, Clone)]
pub struct SpotLossLatentModel {
    latent: DefaultLatentModel,
    recoveries: Vec<f64>,
    model_a: f64,
    recovery_shifts: Vec<f64>,
}

impl SpotLossLatentModel {
    /// Build from `2n` loading rows and `n` mean recoveries.
    ///
    /// # Errors
    ///
    /// * `SizeMismatch` - Loadings do not have twice as many rows as recoveries
    /// * `InvalidModelParameters` - A recovery outside [0, 1], a non-finite
    ///   `model_a`, or an invalid copula or integration setting
    pub fn new(
        loadings: FactorLoadings,
        recoveries: Vec<f64>,
        model_a: f64,
        copula: CopulaPolicy,
        integration: IntegrationConfig,
    ) -> Result<Self, LossModelError> {
        if loadings.size() != 2 * recoveries.len() {
            return Err(LossModelError::SizeMismatch {
                expected: 2 * recoveries.len(),
                got: loadings.size(),
            });
        }
        validate_recoveries(&recoveries)?;
        if !model_a.is_finite() {
            return Err(LossModelError::InvalidModelParameters(format!(
                "recovery dispersion must be finite, got {model_a}"
            )));
        }
        let scale = (1.0 + model_a * model_a).sqrt();
        let recovery_shifts = recoveries.iter().map(|&r| scale * norm_inv_cdf(r)).collect();
        let latent = DefaultLatentModel::new(loadings, copula, integration)?;
        Ok(Self {
            latent,
            recoveries,
            model_a,
            recovery_shifts,
        })
    }

    /// Underlying latent model over `2n` variables.
    pub fn latent(&self) -> &DefaultLatentModel {
        &self.latent
    }

    /// Mean recoveries.
    pub fn recoveries(&self) -> &[f64] {
        &self.recoveries
    }

    /// Recovery dispersion `A`.
    pub fn model_a(&self) -> f64 {
        self.model_a
    }

    /// Number of names.
    pub fn size(&self) -> usize {
        self.recoveries.len()
    }

    /// Recovery of name `i` when its recovery variable equals `x`.
    pub fn recovery_given_latent(&self, i: usize, x: f64) -> f64 {
        let shift = self.recovery_shifts[i];
        if shift.is_infinite() {
            return self.recoveries[i];
        }
        norm_cdf(shift + self.model_a * x)
    }

    /// Fail unless `ctx` covers exactly this model's names.
    pub fn check_context(&self, ctx: &LossContext) -> Result<(), LossModelError> {
        if ctx.size() != self.size() {
            return Err(LossModelError::SizeMismatch {
                expected: self.size(),
                got: ctx.size(),
            });
        }
        Ok(())
    }

    /// Default thresholds of the `n` default variables.
    pub fn default_thresholds(&self, ctx: &LossContext) -> Result<Vec<f64>, LossModelError> {
        self.check_context(ctx)?;
        self.latent.default_thresholds(ctx.default_probabilities())
    }
}
