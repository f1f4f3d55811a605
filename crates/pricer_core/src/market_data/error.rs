//! Market data error types.
//!
//! Structured errors for default-probability curves and correlation
//! surfaces.

use crate::types::InterpolationError;
use thiserror::Error;

/// Market data operation errors.
///
/// # Variants
///
/// - `InvalidMaturity`: Negative time, or a non-increasing forward interval
/// - `InvalidHazardRate`: Negative or non-finite hazard rate
/// - `InvalidCorrelation`: Correlation quote outside [0, 1]
/// - `OutOfBounds`: Query outside the quoted domain with extrapolation disabled
/// - `Interpolation`: Wrapped interpolation error
/// - `InsufficientData`: Not enough data points for construction
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::MarketDataError;
///
/// let err = MarketDataError::InvalidMaturity { t: -1.0 };
/// assert!(format!("{}", err).contains("-1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Invalid maturity (negative time).
    #[error("Invalid maturity: t = {t}")]
    InvalidMaturity {
        /// The invalid maturity value
        t: f64,
    },

    /// Hazard rate that is negative or not finite.
    #[error("Invalid hazard rate: {rate}")]
    InvalidHazardRate {
        /// The rejected hazard rate
        rate: f64,
    },

    /// Correlation quote outside [0, 1].
    #[error("Invalid correlation: {value} not in [0, 1]")]
    InvalidCorrelation {
        /// The rejected quote
        value: f64,
    },

    /// Query point outside valid domain.
    #[error("Out of bounds: {x} not in [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Interpolation error.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// Insufficient data for construction.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_maturity_display() {
        let err = MarketDataError::InvalidMaturity { t: -1.5 };
        assert_eq!(format!("{}", err), "Invalid maturity: t = -1.5");
    }

    #[test]
    fn test_invalid_correlation_display() {
        let err = MarketDataError::InvalidCorrelation { value: 1.2 };
        assert_eq!(format!("{}", err), "Invalid correlation: 1.2 not in [0, 1]");
    }

    #[test]
    fn test_out_of_bounds_display() {
        let err = MarketDataError::OutOfBounds {
            x: 5.0,
            min: 0.0,
            max: 3.0,
        };
        assert_eq!(format!("{}", err), "Out of bounds: 5 not in [0, 3]");
    }

    #[test]
    fn test_from_interpolation_error() {
        let interp_err = InterpolationError::InsufficientData { got: 1, need: 2 };
        let mkt_err: MarketDataError = interp_err.clone().into();
        assert_eq!(mkt_err, MarketDataError::Interpolation(interp_err));
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = MarketDataError::InvalidHazardRate { rate: -0.01 };
        let _: &dyn std::error::Error = &err;
    }
}
