//! Factor loadings of a latent variable model.

use crate::loss_models::LossModelError;

/// Slack allowed on `Σ w² <= 1` before a row is rejected.
const VARIANCE_TOLERANCE: f64 = 1e-12;

/// Per-variable factor weights.
///
/// Row `i` holds the weights `a_i1 .. a_im` of variable `i` on the `m`
/// systemic factors. The idiosyncratic weight is `b_i = sqrt(1 - Σ a_ik²)`,
/// so every latent variable has unit variance when the marginals do.
///
/// # Examples
/// ```
/// use pricer_models::latent::FactorLoadings;
///
/// let loadings = FactorLoadings::homogeneous(10, 0.05_f64.sqrt()).unwrap();
/// assert_eq!(loadings.n_factors(), 1);
/// assert!((loadings.idiosyncratic(3) - 0.95_f64.sqrt()).abs() < 1e-15);
///
/// assert!(FactorLoadings::new(vec![vec![0.8, 0.7]]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FactorLoadings {
    weights: Vec<Vec<f64>>,
    idiosyncratic: Vec<f64>,
}

impl FactorLoadings {
    /// Build loadings from one weight row per variable.
    ///
    /// # Errors
    ///
    /// `InvalidModelParameters` for an empty or ragged matrix, zero factors,
    /// non-finite weights or a row with `Σ w² > 1`.
    pub fn new(weights: Vec<Vec<f64>>) -> Result<Self, LossModelError> {
        let n_factors = weights.first().map(Vec::len).ok_or_else(|| {
            LossModelError::InvalidModelParameters("no factor loadings".to_string())
        })?;
        if n_factors == 0 {
            return Err(LossModelError::InvalidModelParameters(
                "at least one systemic factor is required".to_string(),
            ));
        }

        let mut idiosyncratic = Vec::with_capacity(weights.len());
        for (i, row) in weights.iter().enumerate() {
            if row.len() != n_factors {
                return Err(LossModelError::InvalidModelParameters(format!(
                    "loading row {i} has {} factors, expected {n_factors}",
                    row.len()
                )));
            }
            if row.iter().any(|w| !w.is_finite()) {
                return Err(LossModelError::InvalidModelParameters(format!(
                    "loading row {i} is not finite"
                )));
            }
            let systemic: f64 = row.iter().map(|w| w * w).sum();
            if systemic > 1.0 + VARIANCE_TOLERANCE {
                return Err(LossModelError::InvalidModelParameters(format!(
                    "loading row {i} has systemic variance {systemic} above 1"
                )));
            }
            idiosyncratic.push((1.0 - systemic).max(0.0).sqrt());
        }

        Ok(Self {
            weights,
            idiosyncratic,
        })
    }

    /// `n` variables loading `weight` on a single factor.
    pub fn homogeneous(n: usize, weight: f64) -> Result<Self, LossModelError> {
        Self::new(vec![vec![weight]; n])
    }

    /// Number of latent variables.
    pub fn size(&self) -> usize {
        self.weights.len()
    }

    /// Number of systemic factors.
    pub fn n_factors(&self) -> usize {
        self.weights[0].len()
    }

    /// Factor weights of variable `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.weights[i]
    }

    /// Idiosyncratic weight of variable `i`.
    pub fn idiosyncratic(&self, i: usize) -> f64 {
        self.idiosyncratic[i]
    }

    /// Systemic part `Σ a_ik z_k` of variable `i` for factor values `z`.
    pub fn systemic(&self, i: usize, factors: &[f64]) -> f64 {
        self.weights[i]
            .iter()
            .zip(factors)
            .map(|(a, z)| a * z)
            .sum()
    }
}
