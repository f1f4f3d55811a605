//! Latent variable default model.

use pricer_core::math::solvers::{BrentSolver, SolverConfig};
use tracing::debug;

use super::copula::CopulaPolicy;
use super::integration::{FactorGrid, IntegrationConfig};
use super::loadings::FactorLoadings;
use crate::analytical::{norm_cdf, norm_inv_cdf, Marginal};
use crate::loss_models::LossModelError;

/// Idiosyncratic weight below which a variable is treated as fully systemic.
const MIN_IDIOSYNCRATIC_WEIGHT: f64 = 1e-12;

/// Latent variables `Y_i = Σ a_ik Z_k + b_i ε_i` with independent factors
/// `Z_k` and shocks `ε_i` drawn from the copula's marginals.
///
/// Name `i` defaults by the horizon when `Y_i` falls below its threshold
/// `c_i = F_Yi⁻¹(p_i)`. The factor grid is built once at construction and
/// shared by every integration.
#[derive(Debug, Clone)]
pub struct DefaultLatentModel {
    loadings: FactorLoadings,
    copula: CopulaPolicy,
    factor_marginals: Vec<Marginal>,
    idiosyncratic_marginal: Marginal,
    integration: IntegrationConfig,
    grid: FactorGrid,
}

impl DefaultLatentModel {
    /// Build the model and its factor grid.
    ///
    /// # Errors
    ///
    /// `InvalidModelParameters` for invalid copula orders or a grid that
    /// cannot be built from `integration`.
    pub fn new(
        loadings: FactorLoadings,
        copula: CopulaPolicy,
        integration: IntegrationConfig,
    ) -> Result<Self, LossModelError> {
        let (factor_marginals, idiosyncratic_marginal) = copula.marginals(loadings.n_factors())?;
        let grid = FactorGrid::new(&integration, &factor_marginals)?;
        debug!(
            copula = copula.label(),
            variables = loadings.size(),
            factors = loadings.n_factors(),
            grid_points = grid.len(),
            "latent model built"
        );
        Ok(Self {
            loadings,
            copula,
            factor_marginals,
            idiosyncratic_marginal,
            integration,
            grid,
        })
    }

    /// Model with the copula's default integration settings.
    pub fn with_default_integration(
        loadings: FactorLoadings,
        copula: CopulaPolicy,
    ) -> Result<Self, LossModelError> {
        let integration = IntegrationConfig::for_copula(&copula);
        Self::new(loadings, copula, integration)
    }

    /// Number of latent variables.
    pub fn size(&self) -> usize {
        self.loadings.size()
    }

    /// Number of systemic factors.
    pub fn n_factors(&self) -> usize {
        self.loadings.n_factors()
    }

    /// Factor loadings.
    pub fn loadings(&self) -> &FactorLoadings {
        &self.loadings
    }

    /// Copula policy.
    pub fn copula(&self) -> &CopulaPolicy {
        &self.copula
    }

    /// Marginal law of each factor.
    pub fn factor_marginals(&self) -> &[Marginal] {
        &self.factor_marginals
    }

    /// Marginal law of the idiosyncratic shocks.
    pub fn idiosyncratic_marginal(&self) -> &Marginal {
        &self.idiosyncratic_marginal
    }

    /// Integration settings.
    pub fn integration(&self) -> &IntegrationConfig {
        &self.integration
    }

    /// Factor grid.
    pub fn grid(&self) -> &FactorGrid {
        &self.grid
    }

    /// Value of variable `i` for factors `z` and shock `eps`.
    pub fn latent_value(&self, i: usize, factors: &[f64], eps: f64) -> f64 {
        self.loadings.systemic(i, factors) + self.loadings.idiosyncratic(i) * eps
    }

    /// `P(Y_i <= y | Z = factors)`.
    pub fn conditional_cdf(&self, y: f64, i: usize, factors: &[f64]) -> f64 {
        if y == f64::NEG_INFINITY {
            return 0.0;
        }
        if y == f64::INFINITY {
            return 1.0;
        }
        let m = self.loadings.systemic(i, factors);
        let b = self.loadings.idiosyncratic(i);
        if b < MIN_IDIOSYNCRATIC_WEIGHT {
            return if m <= y { 1.0 } else { 0.0 };
        }
        self.idiosyncratic_marginal.cdf((y - m) / b)
    }

    /// Probability that name `i` with threshold `threshold` defaults given
    /// the factors.
    pub fn conditional_default_probability(&self, threshold: f64, i: usize, factors: &[f64]) -> f64 {
        self.conditional_cdf(threshold, i, factors)
    }

    /// Unconditional CDF of variable `i`.
    ///
    /// Closed form for Gaussian copulas; otherwise the conditional CDF
    /// integrated on the factor grid, so thresholds are consistent with
    /// the grid every loss model integrates on.
    pub fn cumulative_y(&self, y: f64, i: usize) -> f64 {
        if self.copula.is_gaussian() {
            return norm_cdf(y);
        }
        let grid = &self.grid;
        (0..grid.len())
            .map(|j| grid.weights()[j] * self.conditional_cdf(y, i, grid.point(j)))
            .sum()
    }

    /// Inverse of [`cumulative_y`](Self::cumulative_y).
    ///
    /// # Errors
    ///
    /// `InsufficientConvergence` when the root search for a non-Gaussian
    /// copula fails to reach tolerance.
    pub fn inverse_cumulative_y(&self, p: f64, i: usize) -> Result<f64, LossModelError> {
        if p <= 0.0 {
            return Ok(f64::NEG_INFINITY);
        }
        if p >= 1.0 {
            return Ok(f64::INFINITY);
        }
        if self.copula.is_gaussian() {
            return Ok(norm_inv_cdf(p));
        }
        let solver = BrentSolver::new(SolverConfig::high_precision());
        let y = solver.bracket_and_solve(|y| self.cumulative_y(y, i) - p, -1.0, 1.0)?;
        Ok(y)
    }

    /// Default thresholds of the first `probabilities.len()` variables.
    ///
    /// # Errors
    ///
    /// `SizeMismatch` when more probabilities than variables are supplied.
    pub fn default_thresholds(&self, probabilities: &[f64]) -> Result<Vec<f64>, LossModelError> {
        if probabilities.len() > self.size() {
            return Err(LossModelError::SizeMismatch {
                expected: self.size(),
                got: probabilities.len(),
            });
        }
        let thresholds = probabilities
            .iter()
            .enumerate()
            .map(|(i, &p)| self.inverse_cumulative_y(p, i))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(?thresholds, "default thresholds");
        Ok(thresholds)
    }

    /// Conditional default probabilities of names with `thresholds`.
    pub fn conditional_default_probabilities(&self, thresholds: &[f64], factors: &[f64]) -> Vec<f64> {
        thresholds
            .iter()
            .enumerate()
            .map(|(i, &c)| self.conditional_default_probability(c, i, factors))
            .collect()
    }

    /// `E[f(Z)]` over the factor grid.
    pub fn integrate<F>(&self, f: F) -> f64
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        self.grid.integrate(f)
    }

    /// Component-wise `E[f(Z)]` over the factor grid.
    pub fn integrate_vec<F>(&self, len: usize, f: F) -> Vec<f64>
    where
        F: Fn(&[f64]) -> Vec<f64> + Sync,
    {
        self.grid.integrate_vec(len, f)
    }
}
