//! Numerical integration over the systemic factors.

use pricer_core::math::quadrature::{QuadratureGrid, QuadratureRule, MIN_QUADRATURE_NODES};
use rayon::prelude::*;

use super::copula::CopulaPolicy;
use crate::analytical::Marginal;
use crate::loss_models::LossModelError;

/// Largest tensor grid a latent model will build.
pub const MAX_FACTOR_GRID_POINTS: usize = 1 << 20;

/// Quadrature rule used per factor dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatentModelIntegrationType {
    /// Gauss-Legendre on the truncated domain.
    GaussianQuadrature,
    /// Composite trapezoid on the truncated domain.
    Trapezoid,
}

impl From<LatentModelIntegrationType> for QuadratureRule {
    fn from(method: LatentModelIntegrationType) -> Self {
        match method {
            LatentModelIntegrationType::GaussianQuadrature => QuadratureRule::GaussLegendre,
            LatentModelIntegrationType::Trapezoid => QuadratureRule::Trapezoid,
        }
    }
}

/// Factor integration settings: rule, nodes per factor and the symmetric
/// truncation `[-domain_bound, domain_bound]`.
///
/// # Examples
/// ```
/// use pricer_models::latent::{CopulaPolicy, IntegrationConfig, LatentModelIntegrationType};
///
/// let g = IntegrationConfig::for_copula(&CopulaPolicy::Gaussian);
/// assert_eq!(g.method(), LatentModelIntegrationType::GaussianQuadrature);
/// assert_eq!(g.nodes(), 64);
///
/// assert!(IntegrationConfig::new(LatentModelIntegrationType::Trapezoid, 4, 10.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationConfig {
    method: LatentModelIntegrationType,
    nodes: usize,
    domain_bound: f64,
}

impl IntegrationConfig {
    /// Validated settings.
    ///
    /// # Errors
    ///
    /// `InvalidModelParameters` when `nodes < MIN_QUADRATURE_NODES` or the
    /// bound is not a positive finite number.
    pub fn new(
        method: LatentModelIntegrationType,
        nodes: usize,
        domain_bound: f64,
    ) -> Result<Self, LossModelError> {
        if nodes < MIN_QUADRATURE_NODES {
            return Err(LossModelError::InvalidModelParameters(format!(
                "integration needs at least {MIN_QUADRATURE_NODES} nodes, got {nodes}"
            )));
        }
        if !(domain_bound.is_finite() && domain_bound > 0.0) {
            return Err(LossModelError::InvalidModelParameters(format!(
                "integration bound must be positive, got {domain_bound}"
            )));
        }
        Ok(Self {
            method,
            nodes,
            domain_bound,
        })
    }

    /// Defaults: Gauss-Legendre, 64 nodes on ±8 for Gaussian factors;
    /// trapezoid, 401 nodes on ±40 for the heavier Student-t tails.
    pub fn for_copula(copula: &CopulaPolicy) -> Self {
        match copula {
            CopulaPolicy::Gaussian => Self {
                method: LatentModelIntegrationType::GaussianQuadrature,
                nodes: 64,
                domain_bound: 8.0,
            },
            CopulaPolicy::StudentT { .. } => Self {
                method: LatentModelIntegrationType::Trapezoid,
                nodes: 401,
                domain_bound: 40.0,
            },
        }
    }

    /// Same nodes and bound with another rule.
    pub fn with_method(self, method: LatentModelIntegrationType) -> Self {
        Self { method, ..self }
    }

    /// Quadrature rule.
    pub fn method(&self) -> LatentModelIntegrationType {
        self.method
    }

    /// Nodes per factor.
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Truncation bound.
    pub fn domain_bound(&self) -> f64 {
        self.domain_bound
    }
}

/// Tensor-product grid over the systemic factors.
///
/// Weights are quadrature weights times the factor densities, normalised
/// to sum to one, so integrating a constant returns it exactly.
#[derive(Debug, Clone)]
pub struct FactorGrid {
    dim: usize,
    points: Vec<f64>,
    weights: Vec<f64>,
}

impl FactorGrid {
    /// Build the grid for factors with the given marginals.
    pub fn new(config: &IntegrationConfig, marginals: &[Marginal]) -> Result<Self, LossModelError> {
        let dim = marginals.len();
        let total = u32::try_from(dim)
            .ok()
            .and_then(|d| config.nodes.checked_pow(d))
            .filter(|&n| n <= MAX_FACTOR_GRID_POINTS)
            .ok_or_else(|| {
                LossModelError::InvalidModelParameters(format!(
                    "{} nodes over {dim} factors exceeds {MAX_FACTOR_GRID_POINTS} grid points",
                    config.nodes
                ))
            })?;

        let bound = config.domain_bound;
        let rule = QuadratureGrid::new(config.method.into(), config.nodes, -bound, bound)?;

        let mut points = Vec::with_capacity(total * dim);
        let mut weights = Vec::with_capacity(total);
        let mut index = vec![0usize; dim];
        for _ in 0..total {
            let mut w = 1.0;
            for (k, &j) in index.iter().enumerate() {
                let x = rule.nodes()[j];
                points.push(x);
                w *= rule.weights()[j] * marginals[k].pdf(x);
            }
            weights.push(w);

            // Odometer increment, last factor fastest
            for slot in index.iter_mut().rev() {
                *slot += 1;
                if *slot < config.nodes {
                    break;
                }
                *slot = 0;
            }
        }

        let mass: f64 = weights.iter().sum();
        if !(mass.is_finite() && mass > 0.0) {
            return Err(LossModelError::InvalidModelParameters(
                "factor grid carries no probability mass".to_string(),
            ));
        }
        weights.iter_mut().for_each(|w| *w /= mass);

        Ok(Self {
            dim,
            points,
            weights,
        })
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false for a built grid.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Number of factors.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Factor values at grid point `j`.
    pub fn point(&self, j: usize) -> &[f64] {
        &self.points[j * self.dim..(j + 1) * self.dim]
    }

    /// Normalised weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Evaluate `f` at every grid point in parallel, results in grid order.
    pub fn map_nodes<R, F>(&self, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(&[f64]) -> R + Sync,
    {
        (0..self.len())
            .into_par_iter()
            .map(|j| f(self.point(j)))
            .collect()
    }

    /// `E[f(Z)]`. Node values are computed in parallel and summed in grid
    /// order so the result does not depend on the worker count.
    pub fn integrate<F>(&self, f: F) -> f64
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        self.map_nodes(f)
            .iter()
            .zip(&self.weights)
            .map(|(v, w)| v * w)
            .sum()
    }

    /// Component-wise `E[f(Z)]` for a vector-valued `f` of length `len`.
    pub fn integrate_vec<F>(&self, len: usize, f: F) -> Vec<f64>
    where
        F: Fn(&[f64]) -> Vec<f64> + Sync,
    {
        let values = self.map_nodes(f);
        let mut out = vec![0.0; len];
        for (v, &w) in values.iter().zip(&self.weights) {
            for (o, x) in out.iter_mut().zip(v) {
                *o += w * x;
            }
        }
        out
    }
}
