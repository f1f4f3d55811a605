//! Brent's method root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Number of geometric widenings attempted by [`BrentSolver::bracket_and_solve`].
pub const MAX_BRACKET_EXPANSIONS: usize = 64;

/// Brent's method root finder.
///
/// Combines bisection, secant steps and inverse quadratic interpolation.
/// Converges for any continuous function given a sign-changing bracket,
/// which makes it the tool of choice for inverting monotone distribution
/// functions that have no closed-form quantile.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
/// let f = |x: f64| x * x * x - x - 2.0;
///
/// let root = solver.find_root(f, 1.0, 2.0).unwrap();
/// assert!(f(root).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> BrentSolver<T> {
    /// Create a new Brent solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Find a root of `f` in the bracket [a, b].
    ///
    /// # Returns
    ///
    /// * `Ok(x)` - Root located to within the configured tolerance
    /// * `Err(SolverError::NoBracket)` - `f(a)` and `f(b)` have the same sign
    /// * `Err(SolverError::NumericalInstability)` - `f` returned NaN
    /// * `Err(SolverError::MaxIterationsExceeded)` - Iteration budget exhausted
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let two = T::one() + T::one();
        let half = T::one() / two;
        let tolerance = self.config.tolerance;

        let (mut a, mut b) = (a, b);
        let (mut fa, mut fb) = (f(a), f(b));
        if fa.is_nan() || fb.is_nan() {
            return Err(SolverError::NumericalInstability(
                "objective is NaN at a bracket endpoint".to_string(),
            ));
        }
        if fa == T::zero() {
            return Ok(a);
        }
        if fb == T::zero() {
            return Ok(b);
        }
        if fa.signum() == fb.signum() {
            return Err(SolverError::NoBracket {
                a: a.to_f64().unwrap_or(f64::NAN),
                b: b.to_f64().unwrap_or(f64::NAN),
            });
        }

        // c is the counterpoint of b: f(b) and f(c) always straddle zero.
        let (mut c, mut fc) = (b, fb);
        let mut step = b - a;
        let mut previous_step = step;

        for _ in 0..self.config.max_iterations {
            if fb.signum() == fc.signum() {
                c = a;
                fc = fa;
                step = b - a;
                previous_step = step;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol = two * T::epsilon() * b.abs() + half * tolerance;
            let midpoint = half * (c - b);
            if midpoint.abs() <= tol || fb.abs() < tolerance {
                return Ok(b);
            }

            if previous_step.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    (two * midpoint * s, T::one() - s)
                } else {
                    let q0 = fa / fc;
                    let r = fb / fc;
                    (
                        s * (two * midpoint * q0 * (q0 - r) - (b - a) * (r - T::one())),
                        (q0 - T::one()) * (r - T::one()) * (s - T::one()),
                    )
                };
                if p > T::zero() {
                    q = -q;
                } else {
                    p = -p;
                }
                let three = two + T::one();
                let bound_interp = three * midpoint * q - (tol * q).abs();
                let bound_prev = (previous_step * q).abs();
                if two * p < bound_interp.min(bound_prev) {
                    previous_step = step;
                    step = p / q;
                } else {
                    step = midpoint;
                    previous_step = step;
                }
            } else {
                step = midpoint;
                previous_step = step;
            }

            a = b;
            fa = fb;
            b = if step.abs() > tol {
                b + step
            } else if midpoint > T::zero() {
                b + tol
            } else {
                b - tol
            };
            fb = f(b);
            if fb.is_nan() {
                return Err(SolverError::NumericalInstability(format!(
                    "objective is NaN at x = {}",
                    b.to_f64().unwrap_or(f64::NAN)
                )));
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Widen `[lo, hi]` geometrically until `f` changes sign, then solve.
    ///
    /// Suited to monotone objectives on an unbounded domain where only a
    /// rough initial guess of the root location is known.
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::math::solvers::{BrentSolver, SolverConfig};
    ///
    /// let solver = BrentSolver::new(SolverConfig::default());
    /// let root = solver.bracket_and_solve(|x: f64| x - 250.0, -1.0, 1.0).unwrap();
    /// assert!((root - 250.0).abs() < 1e-8);
    /// ```
    pub fn bracket_and_solve<F>(&self, f: F, lo: T, hi: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let two = T::one() + T::one();
        let (mut lo, mut hi) = if lo < hi { (lo, hi) } else { (hi, lo) };
        let (mut f_lo, mut f_hi) = (f(lo), f(hi));

        for _ in 0..MAX_BRACKET_EXPANSIONS {
            if f_lo.is_nan() || f_hi.is_nan() {
                break;
            }
            if f_lo.signum() != f_hi.signum() || f_lo == T::zero() || f_hi == T::zero() {
                return self.find_root(&f, lo, hi);
            }
            let width = hi - lo;
            if f_lo.abs() < f_hi.abs() {
                lo = lo - two * width;
                f_lo = f(lo);
            } else {
                hi = hi + two * width;
                f_hi = f(hi);
            }
        }

        Err(SolverError::NoBracket {
            a: lo.to_f64().unwrap_or(f64::NAN),
            b: hi.to_f64().unwrap_or(f64::NAN),
        })
    }
}
