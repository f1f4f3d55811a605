//! Per-evaluation view of a basket at a horizon.

use crate::loss_models::LossModelError;

/// Snapshot of everything a loss model needs for one evaluation.
///
/// Amounts (notionals, tranche bounds, returned losses) are in currency
/// units. Attachment and detachment are fractions of the total notional.
///
/// `new` checks per-name data but not the tranche, so a context can carry
/// inverted bounds; every loss model calls [`LossContext::validate_tranche`]
/// before computing anything.
#[derive(Debug, Clone, PartialEq)]
pub struct LossContext {
    horizon: f64,
    notionals: Vec<f64>,
    default_probabilities: Vec<f64>,
    attachment: f64,
    detachment: f64,
}

impl LossContext {
    /// Build a context.
    ///
    /// # Errors
    ///
    /// * `SizeMismatch` - `default_probabilities` and `notionals` differ in length
    /// * `InvalidModelParameters` - Empty pool, negative or non-finite horizon,
    ///   notional or probability, or a zero total notional
    pub fn new(
        horizon: f64,
        notionals: Vec<f64>,
        default_probabilities: Vec<f64>,
        attachment: f64,
        detachment: f64,
    ) -> Result<Self, LossModelError> {
        if notionals.is_empty() {
            return Err(LossModelError::InvalidModelParameters(
                "basket has no names".to_string(),
            ));
        }
        if default_probabilities.len() != notionals.len() {
            return Err(LossModelError::SizeMismatch {
                expected: notionals.len(),
                got: default_probabilities.len(),
            });
        }
        if !(horizon.is_finite() && horizon >= 0.0) {
            return Err(LossModelError::InvalidModelParameters(format!(
                "horizon must be non-negative, got {horizon}"
            )));
        }
        if let Some(n) = notionals.iter().find(|n| !(n.is_finite() && **n >= 0.0)) {
            return Err(LossModelError::InvalidModelParameters(format!(
                "notional must be non-negative, got {n}"
            )));
        }
        if notionals.iter().sum::<f64>() <= 0.0 {
            return Err(LossModelError::InvalidModelParameters(
                "total notional must be positive".to_string(),
            ));
        }
        if let Some(p) = default_probabilities
            .iter()
            .find(|p| !(**p >= 0.0 && **p <= 1.0))
        {
            return Err(LossModelError::InvalidModelParameters(format!(
                "default probability {p} not in [0, 1]"
            )));
        }
        Ok(Self {
            horizon,
            notionals,
            default_probabilities,
            attachment,
            detachment,
        })
    }

    /// Fail unless `0 <= attachment < detachment <= 1`.
    pub fn validate_tranche(&self) -> Result<(), LossModelError> {
        validate_tranche_bounds(self.attachment, self.detachment)
    }

    /// Horizon in years from the reference date.
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Number of names.
    pub fn size(&self) -> usize {
        self.notionals.len()
    }

    /// Per-name notionals.
    pub fn notionals(&self) -> &[f64] {
        &self.notionals
    }

    /// Per-name cumulative default probabilities to the horizon.
    pub fn default_probabilities(&self) -> &[f64] {
        &self.default_probabilities
    }

    /// Attachment as a fraction of total notional.
    pub fn attachment(&self) -> f64 {
        self.attachment
    }

    /// Detachment as a fraction of total notional.
    pub fn detachment(&self) -> f64 {
        self.detachment
    }

    /// Sum of notionals.
    pub fn total_notional(&self) -> f64 {
        self.notionals.iter().sum()
    }

    /// Attachment in currency units.
    pub fn attachment_amount(&self) -> f64 {
        self.attachment * self.total_notional()
    }

    /// Detachment in currency units.
    pub fn detachment_amount(&self) -> f64 {
        self.detachment * self.total_notional()
    }

    /// Tranche loss for a portfolio loss amount: `min(max(L - A, 0), D - A)`.
    pub fn tranche_loss(&self, portfolio_loss: f64) -> f64 {
        let a = self.attachment_amount();
        let d = self.detachment_amount();
        (portfolio_loss.min(d) - a).max(0.0)
    }

    /// Copy of this context with different tranche bounds.
    pub fn with_tranche(&self, attachment: f64, detachment: f64) -> Self {
        Self {
            attachment,
            detachment,
            ..self.clone()
        }
    }
}

/// Fail unless `0 <= attachment < detachment <= 1`.
pub fn validate_tranche_bounds(attachment: f64, detachment: f64) -> Result<(), LossModelError> {
    if attachment >= 0.0 && attachment < detachment && detachment <= 1.0 {
        Ok(())
    } else {
        Err(LossModelError::InvalidTrancheBounds {
            attachment,
            detachment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn context(attachment: f64, detachment: f64) -> LossContext {
        LossContext::new(5.0, vec![100.0; 4], vec![0.1; 4], attachment, detachment).unwrap()
    }

    // ===== Construction =====

    #[test]
    fn test_size_mismatch() {
        let err = LossContext::new(5.0, vec![100.0; 4], vec![0.1; 3], 0.0, 0.1).unwrap_err();
        assert_eq!(err, LossModelError::SizeMismatch { expected: 4, got: 3 });
    }

    #[test]
    fn test_rejects_zero_total_notional() {
        let err = LossContext::new(5.0, vec![0.0; 2], vec![0.1; 2], 0.0, 0.1).unwrap_err();
        assert!(matches!(err, LossModelError::InvalidModelParameters(_)));
    }

    #[test]
    fn test_rejects_probability_above_one() {
        assert!(LossContext::new(5.0, vec![1.0], vec![1.2], 0.0, 0.1).is_err());
    }

    #[test]
    fn test_inverted_tranche_is_accepted_until_validated() {
        let ctx = context(0.06, 0.03);
        assert_eq!(
            ctx.validate_tranche(),
            Err(LossModelError::InvalidTrancheBounds {
                attachment: 0.06,
                detachment: 0.03
            })
        );
    }

    #[test]
    fn test_tranche_bound_edges() {
        assert!(validate_tranche_bounds(0.0, 1.0).is_ok());
        assert!(validate_tranche_bounds(0.05, 0.05).is_err());
        assert!(validate_tranche_bounds(-0.01, 0.5).is_err());
        assert!(validate_tranche_bounds(0.5, 1.01).is_err());
        assert!(validate_tranche_bounds(f64::NAN, 0.5).is_err());
    }

    // ===== Amounts =====

    #[test]
    fn test_amounts() {
        let ctx = context(0.03, 0.06);
        assert_abs_diff_eq!(ctx.total_notional(), 400.0);
        assert_abs_diff_eq!(ctx.attachment_amount(), 12.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ctx.detachment_amount(), 24.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tranche_loss_clamps() {
        let ctx = context(0.03, 0.06);
        assert_eq!(ctx.tranche_loss(0.0), 0.0);
        assert_eq!(ctx.tranche_loss(10.0), 0.0);
        assert_abs_diff_eq!(ctx.tranche_loss(20.0), 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ctx.tranche_loss(300.0), 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_with_tranche() {
        let ctx = context(0.03, 0.06).with_tranche(0.0, 1.0);
        assert_eq!(ctx.attachment(), 0.0);
        assert_eq!(ctx.detachment(), 1.0);
        assert_eq!(ctx.size(), 4);
    }
}
