//! Discrete portfolio loss distribution.

use super::{validate_level, LossModelError};
use crate::credit::LossContext;

/// Slack on total probability accepted by [`LossDistribution::new`].
const MASS_TOLERANCE: f64 = 1e-8;

/// Loss amounts (ascending, currency units) with their probabilities.
///
/// # Examples
/// ```
/// use pricer_models::loss_models::LossDistribution;
///
/// let d = LossDistribution::new(vec![0.0, 60.0, 120.0], vec![0.5, 0.3, 0.2]).unwrap();
/// assert!((d.expected_loss() - 42.0).abs() < 1e-12);
/// assert!((d.prob_over_loss(30.0) - 0.5).abs() < 1e-12);
/// assert_eq!(d.percentile(0.75).unwrap(), 60.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LossDistribution {
    losses: Vec<f64>,
    probabilities: Vec<f64>,
}

impl LossDistribution {
    /// Build from ascending losses and their probabilities.
    ///
    /// # Errors
    ///
    /// * `SizeMismatch` - Lengths differ
    /// * `InvalidModelParameters` - Empty, unsorted or non-finite losses,
    ///   negative probabilities, or a total mass away from one
    pub fn new(losses: Vec<f64>, probabilities: Vec<f64>) -> Result<Self, LossModelError> {
        if losses.len() != probabilities.len() {
            return Err(LossModelError::SizeMismatch {
                expected: losses.len(),
                got: probabilities.len(),
            });
        }
        if losses.is_empty() {
            return Err(LossModelError::InvalidModelParameters(
                "empty loss distribution".to_string(),
            ));
        }
        if losses.iter().any(|l| !l.is_finite()) || losses.windows(2).any(|w| w[1] < w[0]) {
            return Err(LossModelError::InvalidModelParameters(
                "loss points must be finite and ascending".to_string(),
            ));
        }
        if probabilities.iter().any(|p| !(*p >= -MASS_TOLERANCE)) {
            return Err(LossModelError::InvalidModelParameters(
                "negative loss probability".to_string(),
            ));
        }
        let mass: f64 = probabilities.iter().sum();
        if (mass - 1.0).abs() > MASS_TOLERANCE {
            return Err(LossModelError::InvalidModelParameters(format!(
                "loss probabilities sum to {mass}"
            )));
        }
        Ok(Self {
            losses,
            probabilities,
        })
    }

    /// Build from unordered `(loss, probability)` atoms, merging equal losses.
    pub fn from_atoms(mut atoms: Vec<(f64, f64)>) -> Result<Self, LossModelError> {
        atoms.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut losses: Vec<f64> = Vec::with_capacity(atoms.len());
        let mut probabilities: Vec<f64> = Vec::with_capacity(atoms.len());
        for (loss, p) in atoms {
            if let (Some(&last), Some(acc)) = (losses.last(), probabilities.last_mut()) {
                if last == loss {
                    *acc += p;
                    continue;
                }
            }
            losses.push(loss);
            probabilities.push(p);
        }
        Self::new(losses, probabilities)
    }

    /// Empirical distribution of equally likely samples.
    pub fn from_samples(samples: &[f64]) -> Result<Self, LossModelError> {
        let p = 1.0 / samples.len() as f64;
        Self::from_atoms(samples.iter().map(|&l| (l, p)).collect())
    }

    /// Loss points.
    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    /// Probabilities of the loss points.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Number of loss points.
    pub fn len(&self) -> usize {
        self.losses.len()
    }

    /// Always false for a built distribution.
    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }

    /// `E[L]`.
    pub fn expected_loss(&self) -> f64 {
        self.losses
            .iter()
            .zip(&self.probabilities)
            .map(|(l, p)| l * p)
            .sum()
    }

    /// Expected loss of the context's tranche.
    pub fn expected_tranche_loss(&self, ctx: &LossContext) -> Result<f64, LossModelError> {
        ctx.validate_tranche()?;
        Ok(self
            .losses
            .iter()
            .zip(&self.probabilities)
            .map(|(&l, p)| ctx.tranche_loss(l) * p)
            .sum())
    }

    /// `P(L > amount)`.
    pub fn prob_over_loss(&self, amount: f64) -> f64 {
        let over: f64 = self
            .losses
            .iter()
            .zip(&self.probabilities)
            .filter(|(&l, _)| l > amount)
            .map(|(_, p)| p)
            .sum();
        over.clamp(0.0, 1.0)
    }

    /// Smallest loss whose cumulative probability reaches `level`.
    pub fn percentile(&self, level: f64) -> Result<f64, LossModelError> {
        validate_level(level)?;
        let mut cumulative = 0.0;
        for (&l, p) in self.losses.iter().zip(&self.probabilities) {
            cumulative += p;
            if cumulative >= level - MASS_TOLERANCE {
                return Ok(l);
            }
        }
        Ok(self.losses[self.losses.len() - 1])
    }
}
