//! Univariate distributions used by latent factor models.
//!
//! This module provides:
//! - `norm_cdf`, `norm_pdf`, `norm_inv_cdf`: Standard normal functions built
//!   on the statrs error function
//! - [`Marginal`]: Distribution of a single factor or idiosyncratic shock,
//!   either standard normal or a Student-t rescaled to unit variance

use statrs::distribution::{Continuous, ContinuousCDF, StudentsT};
use statrs::function::erf::{erfc, erfc_inv};

use crate::loss_models::LossModelError;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Standard normal cumulative distribution function.
///
/// Φ(x) = erfc(-x / √2) / 2, accurate to machine precision in both tails.
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-16);
/// assert!((norm_cdf(-8.0) - 6.220960574271785e-16).abs() < 1e-28);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal probability density function.
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Inverse of the standard normal CDF.
///
/// Returns `-inf` for `p <= 0` and `+inf` for `p >= 1`.
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::{norm_cdf, norm_inv_cdf};
///
/// let x = norm_inv_cdf(0.025);
/// assert!((x + 1.959_963_984_540_054).abs() < 1e-12);
/// assert!((norm_cdf(norm_inv_cdf(1e-9)) - 1e-9).abs() < 1e-21);
/// ```
#[inline]
pub fn norm_inv_cdf(p: f64) -> f64 {
    if p <= 0.0 {
        f64::NEG_INFINITY
    } else if p >= 1.0 {
        f64::INFINITY
    } else {
        -SQRT_2 * erfc_inv(2.0 * p)
    }
}

/// Marginal law of a factor or idiosyncratic variable.
///
/// Student-t variables with more than two degrees of freedom are scaled by
/// `sqrt((ν - 2) / ν)` so they have unit variance like the Gaussian case.
/// For ν ∈ {1, 2} the variance is infinite and the raw t law is used.
#[derive(Debug, Clone)]
pub enum Marginal {
    /// Standard normal.
    Normal,
    /// Scaled Student-t.
    StudentT {
        /// Degrees of freedom (≥ 1)
        dof: u32,
        /// Scale applied to a standard t variable
        scale: f64,
        /// Scaled distribution
        dist: StudentsT,
    },
}

impl Marginal {
    /// Unit-variance Student-t marginal (raw t for `dof <= 2`).
    ///
    /// # Errors
    ///
    /// `LossModelError::InvalidModelParameters` when `dof == 0`.
    pub fn student_t(dof: u32) -> Result<Self, LossModelError> {
        if dof == 0 {
            return Err(LossModelError::InvalidModelParameters(
                "Student-t order must be at least 1".to_string(),
            ));
        }
        let nu = f64::from(dof);
        let scale = if dof > 2 { ((nu - 2.0) / nu).sqrt() } else { 1.0 };
        let dist = StudentsT::new(0.0, scale, nu)
            .map_err(|e| LossModelError::InvalidModelParameters(e.to_string()))?;
        Ok(Marginal::StudentT { dof, scale, dist })
    }

    /// Probability density at `x`.
    pub fn pdf(&self, x: f64) -> f64 {
        match self {
            Marginal::Normal => norm_pdf(x),
            Marginal::StudentT { dist, .. } => dist.pdf(x),
        }
    }

    /// Cumulative distribution at `x`.
    pub fn cdf(&self, x: f64) -> f64 {
        if x == f64::NEG_INFINITY {
            return 0.0;
        }
        if x == f64::INFINITY {
            return 1.0;
        }
        match self {
            Marginal::Normal => norm_cdf(x),
            Marginal::StudentT { dist, .. } => dist.cdf(x),
        }
    }

    /// Quantile function; infinite at 0 and 1.
    pub fn inverse_cdf(&self, p: f64) -> f64 {
        if p <= 0.0 {
            return f64::NEG_INFINITY;
        }
        if p >= 1.0 {
            return f64::INFINITY;
        }
        match self {
            Marginal::Normal => norm_inv_cdf(p),
            Marginal::StudentT { dist, .. } => dist.inverse_cdf(p),
        }
    }

    /// Degrees of freedom, `None` for the normal marginal.
    pub fn dof(&self) -> Option<u32> {
        match self {
            Marginal::Normal => None,
            Marginal::StudentT { dof, .. } => Some(*dof),
        }
    }

    /// Scale applied to a standard variable of this family.
    pub fn scale(&self) -> f64 {
        match self {
            Marginal::Normal => 1.0,
            Marginal::StudentT { scale, .. } => *scale,
        }
    }

    /// True for the normal marginal.
    pub fn is_normal(&self) -> bool {
        matches!(self, Marginal::Normal)
    }
}
