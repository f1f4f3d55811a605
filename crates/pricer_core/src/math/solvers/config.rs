//! Solver configuration types.

use num_traits::Float;

/// Configuration for root-finding algorithms.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::default();
/// assert_eq!(config.max_iterations, 100);
///
/// let tight = SolverConfig::new(1e-14, 200);
/// assert_eq!(tight.max_iterations, 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig<T: Float> {
    /// Absolute tolerance on the root location and on `|f(x)|`.
    pub tolerance: T,

    /// Maximum number of iterations before `SolverError::MaxIterationsExceeded`.
    pub max_iterations: usize,
}

impl<T: Float> Default for SolverConfig<T> {
    /// Tolerance 1e-10, 100 iterations.
    fn default() -> Self {
        Self {
            tolerance: T::from(1e-10).unwrap_or_else(T::epsilon),
            max_iterations: 100,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Create a configuration from explicit values.
    ///
    /// Non-positive tolerances are replaced by machine epsilon and a zero
    /// iteration budget by one iteration.
    pub fn new(tolerance: T, max_iterations: usize) -> Self {
        Self {
            tolerance: if tolerance > T::zero() {
                tolerance
            } else {
                T::epsilon()
            },
            max_iterations: max_iterations.max(1),
        }
    }

    /// Tight settings (1e-14, 500 iterations) for inverting distribution
    /// functions, where the target itself may be of order 1e-6.
    pub fn high_precision() -> Self {
        Self {
            tolerance: T::from(1e-14).unwrap_or_else(T::epsilon),
            max_iterations: 500,
        }
    }
}
