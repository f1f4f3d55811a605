//! One-dimensional quadrature rules on finite intervals.
//!
//! A [`QuadratureGrid`] holds nodes and weights for a fixed interval so the
//! same grid can be reused across many integrands. Factor models build
//! their tensor-product integration grids from these.
//!
//! # Example
//!
//! ```
//! use pricer_core::math::quadrature::{QuadratureGrid, QuadratureRule};
//!
//! let grid = QuadratureGrid::new(QuadratureRule::GaussLegendre, 16, 0.0, 1.0).unwrap();
//! let integral = grid.integrate(|x| x * x);
//! assert!((integral - 1.0 / 3.0).abs() < 1e-14);
//! ```

use std::f64::consts::PI;

use crate::types::QuadratureError;

/// Smallest node count accepted by [`QuadratureGrid::new`].
pub const MIN_QUADRATURE_NODES: usize = 8;

const NEWTON_MAX_ITERATIONS: usize = 100;

/// Quadrature rule selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuadratureRule {
    /// Gauss-Legendre rule, exact for polynomials up to degree 2n-1.
    GaussLegendre,
    /// Composite trapezoid rule on equally spaced nodes including both ends.
    Trapezoid,
}

/// Nodes and weights of a quadrature rule on `[a, b]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureGrid {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl QuadratureGrid {
    /// Build a grid for `rule` with `n` nodes on `[a, b]`.
    ///
    /// # Returns
    ///
    /// * `Err(QuadratureError::TooFewNodes)` - `n < MIN_QUADRATURE_NODES`
    /// * `Err(QuadratureError::InvalidInterval)` - `a >= b` or a bound is not finite
    pub fn new(rule: QuadratureRule, n: usize, a: f64, b: f64) -> Result<Self, QuadratureError> {
        if n < MIN_QUADRATURE_NODES {
            return Err(QuadratureError::TooFewNodes {
                got: n,
                min: MIN_QUADRATURE_NODES,
            });
        }
        if !(a.is_finite() && b.is_finite() && a < b) {
            return Err(QuadratureError::InvalidInterval { a, b });
        }
        Ok(match rule {
            QuadratureRule::GaussLegendre => Self::gauss_legendre(n, a, b),
            QuadratureRule::Trapezoid => Self::trapezoid(n, a, b),
        })
    }

    fn gauss_legendre(n: usize, a: f64, b: f64) -> Self {
        let mut nodes = vec![0.0; n];
        let mut weights = vec![0.0; n];
        let half_width = 0.5 * (b - a);
        let centre = 0.5 * (b + a);
        let nf = n as f64;

        // Roots are symmetric, so only the positive half is solved for.
        for i in 0..n.div_ceil(2) {
            let mut z = (PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
            for _ in 0..NEWTON_MAX_ITERATIONS {
                let (p, dp) = legendre(n, z);
                let dz = p / dp;
                z -= dz;
                if dz.abs() < 1e-15 {
                    break;
                }
            }
            let (_, dp) = legendre(n, z);
            let w = 2.0 / ((1.0 - z * z) * dp * dp) * half_width;

            nodes[i] = centre - half_width * z;
            nodes[n - 1 - i] = centre + half_width * z;
            weights[i] = w;
            weights[n - 1 - i] = w;
        }

        Self { nodes, weights }
    }

    fn trapezoid(n: usize, a: f64, b: f64) -> Self {
        let h = (b - a) / (n - 1) as f64;
        let nodes = (0..n).map(|i| a + h * i as f64).collect();
        let weights = (0..n)
            .map(|i| if i == 0 || i == n - 1 { 0.5 * h } else { h })
            .collect();
        Self { nodes, weights }
    }

    /// Quadrature nodes, ascending.
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Weights matching [`nodes`](Self::nodes).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a successfully built grid.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Apply the rule to `f`.
    pub fn integrate<F>(&self, f: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(|(&x, &w)| w * f(x))
            .sum()
    }
}

/// Legendre polynomial P_n(z) and its derivative by the three-term recurrence.
fn legendre(n: usize, z: f64) -> (f64, f64) {
    let (mut p0, mut p1) = (1.0, z);
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * z * p1 - (kf - 1.0) * p0) / kf;
        p0 = p1;
        p1 = p2;
    }
    let dp = n as f64 * (z * p1 - p0) / (z * z - 1.0);
    (p1, dp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    // ===== Construction =====

    #[test]
    fn test_too_few_nodes() {
        let err = QuadratureGrid::new(QuadratureRule::GaussLegendre, 4, 0.0, 1.0).unwrap_err();
        assert_eq!(err, QuadratureError::TooFewNodes { got: 4, min: 8 });
    }

    #[test]
    fn test_invalid_interval() {
        assert!(QuadratureGrid::new(QuadratureRule::Trapezoid, 10, 1.0, 1.0).is_err());
        assert!(QuadratureGrid::new(QuadratureRule::Trapezoid, 10, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_nodes_sorted_and_inside() {
        let grid = QuadratureGrid::new(QuadratureRule::GaussLegendre, 33, -8.0, 8.0).unwrap();
        assert_eq!(grid.len(), 33);
        assert!(grid.nodes().windows(2).all(|w| w[0] < w[1]));
        assert!(grid.nodes().iter().all(|&x| x > -8.0 && x < 8.0));
        assert_abs_diff_eq!(grid.nodes()[16], 0.0, epsilon = 1e-14);
    }

    // ===== Accuracy =====

    #[test]
    fn test_gauss_legendre_weights_sum_to_width() {
        let grid = QuadratureGrid::new(QuadratureRule::GaussLegendre, 64, -3.0, 5.0).unwrap();
        assert_relative_eq!(grid.weights().iter().sum::<f64>(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gauss_legendre_normal_density() {
        let grid = QuadratureGrid::new(QuadratureRule::GaussLegendre, 64, -8.0, 8.0).unwrap();
        let mass = grid.integrate(|x| (-0.5 * x * x).exp() / (2.0 * PI).sqrt());
        assert_abs_diff_eq!(mass, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trapezoid_linear_exact() {
        let grid = QuadratureGrid::new(QuadratureRule::Trapezoid, 11, 0.0, 2.0).unwrap();
        assert_relative_eq!(grid.integrate(|x| 3.0 * x + 1.0), 8.0, epsilon = 1e-13);
    }

    #[test]
    fn test_trapezoid_normal_density() {
        let grid = QuadratureGrid::new(QuadratureRule::Trapezoid, 161, -8.0, 8.0).unwrap();
        let mass = grid.integrate(|x| (-0.5 * x * x).exp() / (2.0 * PI).sqrt());
        assert_abs_diff_eq!(mass, 1.0, epsilon = 1e-10);
    }

    proptest! {
        #[test]
        fn prop_gauss_legendre_exact_for_cubics(
            c0 in -5.0f64..5.0, c1 in -5.0f64..5.0, c2 in -5.0f64..5.0, c3 in -5.0f64..5.0,
        ) {
            let grid = QuadratureGrid::new(QuadratureRule::GaussLegendre, 8, -1.0, 2.0).unwrap();
            let f = |x: f64| c0 + c1 * x + c2 * x * x + c3 * x * x * x;
            let antiderivative = |x: f64| {
                c0 * x + c1 * x * x / 2.0 + c2 * x.powi(3) / 3.0 + c3 * x.powi(4) / 4.0
            };
            let exact = antiderivative(2.0) - antiderivative(-1.0);
            prop_assert!((grid.integrate(f) - exact).abs() < 1e-11);
        }
    }
}
