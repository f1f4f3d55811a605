//! Error types for loss model construction and evaluation.
//!
//! This module provides:
//! - `LossModelError`: Every failure a basket, latent model or loss model
//!   can report, from parameter validation to numerical non-convergence

use pricer_core::market_data::MarketDataError;
use pricer_core::types::{DateError, QuadratureError, SolverError};
use thiserror::Error;

/// Loss model errors.
///
/// All errors are raised at construction or on the first evaluation that
/// meets the offending input; no partial result accompanies them.
///
/// # Variants
/// - `InvalidModelParameters`: Loadings, copula orders, recoveries or
///   integration settings violate their invariants
/// - `InvalidTrancheBounds`: Attachment/detachment out of order or outside [0, 1]
/// - `OutOfGridRange`: Base-correlation lookup outside the quoted grid
/// - `InsufficientConvergence`: An iterative method hit its iteration cap
///
/// # Examples
/// ```
/// use pricer_models::LossModelError;
///
/// let err = LossModelError::InvalidTrancheBounds { attachment: 0.06, detachment: 0.03 };
/// assert!(format!("{}", err).contains("0.06"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LossModelError {
    /// Model parameters violate an invariant.
    #[error("Invalid model parameters: {0}")]
    InvalidModelParameters(String),

    /// Tranche bounds do not satisfy `0 <= attachment < detachment <= 1`.
    #[error("Invalid tranche bounds: attachment {attachment}, detachment {detachment}")]
    InvalidTrancheBounds {
        /// Attachment fraction
        attachment: f64,
        /// Detachment fraction
        detachment: f64,
    },

    /// Base-correlation query outside the surface with extrapolation disabled.
    #[error("Base correlation query outside grid: tenor {tenor}, loss level {loss_level}")]
    OutOfGridRange {
        /// Horizon in years
        tenor: f64,
        /// Loss level as a fraction of pool notional
        loss_level: f64,
    },

    /// Iterative method stopped before reaching its tolerance.
    #[error("Insufficient convergence after {iterations} iterations: {reason}")]
    InsufficientConvergence {
        /// Iterations performed
        iterations: usize,
        /// What failed to converge
        reason: String,
    },

    /// Name not registered in the pool.
    #[error("Unknown name: {0}")]
    UnknownName(String),

    /// Issuer has no default-probability curve for the requested key.
    #[error("No default probability curve for {0}")]
    MissingCurve(String),

    /// Basket evaluated before a loss model was attached.
    #[error("No loss model attached to basket")]
    MissingLossModel,

    /// Per-name input has the wrong length.
    #[error("Size mismatch: expected {expected}, got {got}")]
    SizeMismatch {
        /// Length required by the basket or model
        expected: usize,
        /// Length supplied
        got: usize,
    },

    /// Query the loss model does not provide.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Market data lookup failure.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),
}

impl From<QuadratureError> for LossModelError {
    fn from(err: QuadratureError) -> Self {
        LossModelError::InvalidModelParameters(err.to_string())
    }
}

impl From<DateError> for LossModelError {
    fn from(err: DateError) -> Self {
        LossModelError::InvalidModelParameters(err.to_string())
    }
}

impl From<SolverError> for LossModelError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::MaxIterationsExceeded { iterations } => {
                LossModelError::InsufficientConvergence {
                    iterations,
                    reason: "root search did not reach tolerance".to_string(),
                }
            }
            other => LossModelError::InsufficientConvergence {
                iterations: 0,
                reason: other.to_string(),
            },
        }
    }
}
