//! Latent model with deterministic recoveries.

use super::copula::CopulaPolicy;
use super::default_model::DefaultLatentModel;
use super::integration::IntegrationConfig;
use super::loadings::FactorLoadings;
use crate::credit::LossContext;
use crate::loss_models::LossModelError;

/// Default latent model in which name `i` loses `N_i (1 - R_i)` on default.
///
/// Shared (behind an `Arc`) by the binomial, inhomogeneous and random
/// default loss models.
#[derive(Debug, Clone)]
pub struct ConstantLossLatentModel {
    latent: DefaultLatentModel,
    recoveries: Vec<f64>,
}

impl ConstantLossLatentModel {
    /// Build from loadings (one row per name) and per-name recoveries.
    ///
    /// # Errors
    ///
    /// * `SizeMismatch` - Recoveries and loadings differ in length
    /// * `InvalidModelParameters` - A recovery outside [0, 1], or an invalid
    ///   copula or integration setting
    pub fn new(
        loadings: FactorLoadings,
        recoveries: Vec<f64>,
        copula: CopulaPolicy,
        integration: IntegrationConfig,
    ) -> Result<Self, LossModelError> {
        if recoveries.len() != loadings.size() {
            return Err(LossModelError::SizeMismatch {
                expected: loadings.size(),
                got: recoveries.len(),
            });
        }
        validate_recoveries(&recoveries)?;
        let latent = DefaultLatentModel::new(loadings, copula, integration)?;
        Ok(Self { latent, recoveries })
    }

    /// Underlying latent model.
    pub fn latent(&self) -> &DefaultLatentModel {
        &self.latent
    }

    /// Per-name recoveries.
    pub fn recoveries(&self) -> &[f64] {
        &self.recoveries
    }

    /// Number of names.
    pub fn size(&self) -> usize {
        self.recoveries.len()
    }

    /// Loss given default of each name in currency units.
    pub fn losses_given_default(&self, ctx: &LossContext) -> Vec<f64> {
        ctx.notionals()
            .iter()
            .zip(&self.recoveries)
            .map(|(n, r)| n * (1.0 - r))
            .collect()
    }

    /// `Σ N_i (1 - R_i) p_i`.
    pub fn expected_portfolio_loss(&self, ctx: &LossContext) -> f64 {
        self.losses_given_default(ctx)
            .iter()
            .zip(ctx.default_probabilities())
            .map(|(l, p)| l * p)
            .sum()
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

    /// Default thresholds for the context's probabilities.
    pub fn default_thresholds(&self, ctx: &LossContext) -> Result<Vec<f64>, LossModelError> {
        self.check_context(ctx)?;
        self.latent.default_thresholds(ctx.default_probabilities())
    }
}

/// Fail unless every recovery lies in [0, 1].
pub fn validate_recoveries(recoveries: &[f64]) -> Result<(), LossModelError> {
    if recoveries.is_empty() {
        return Err(LossModelError::InvalidModelParameters(
            "no recoveries".to_string(),
        ));
    }
    match recoveries.iter().find(|r| !(**r >= 0.0 && **r <= 1.0)) {
        Some(r) => Err(LossModelError::InvalidModelParameters(format!(
            "recovery {r} not in [0, 1]"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn model() -> ConstantLossLatentModel {
        ConstantLossLatentModel::new(
            FactorLoadings::homogeneous(2, 0.3).unwrap(),
            vec![0.4, 0.25],
            CopulaPolicy::Gaussian,
            IntegrationConfig::for_copula(&CopulaPolicy::Gaussian),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_recovery_count() {
        let err = ConstantLossLatentModel::new(
            FactorLoadings::homogeneous(2, 0.3).unwrap(),
            vec![0.4],
            CopulaPolicy::Gaussian,
            IntegrationConfig::for_copula(&CopulaPolicy::Gaussian),
        )
        .unwrap_err();
        assert_eq!(err, LossModelError::SizeMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn test_rejects_recovery_range() {
        assert!(validate_recoveries(&[0.4, 1.2]).is_err());
        assert!(validate_recoveries(&[f64::NAN]).is_err());
        assert!(validate_recoveries(&[0.0, 1.0]).is_ok());
    }

    #[test]
    fn test_expected_portfolio_loss() {
        let ctx = LossContext::new(5.0, vec![100.0, 200.0], vec![0.1, 0.2], 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(model().expected_portfolio_loss(&ctx), 6.0 + 30.0, epsilon = 1e-12);
    }

    #[test]
    fn test_context_size_checked() {
        let ctx = LossContext::new(5.0, vec![100.0; 3], vec![0.1; 3], 0.0, 1.0).unwrap();
        assert!(matches!(
            model().default_thresholds(&ctx),
            Err(LossModelError::SizeMismatch { expected: 2, got: 3 })
        ));
    }
}
