//! Base-correlation term structure.

use crate::market_data::error::MarketDataError;
use crate::math::interpolators::BilinearInterpolator;
use num_traits::Float;

/// Behaviour of a surface queried outside its quoted grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SurfaceExtrapolation {
    /// Clamp the query to the nearest grid edge.
    #[default]
    Flat,
    /// Continue the edge cell's bilinear form, capped to [0, 1].
    Linear,
    /// Fail with `MarketDataError::OutOfBounds`.
    Error,
}

/// Base-correlation surface indexed by tenor and detachment loss level.
///
/// Quotes are stored as `correlations[tenor_idx][loss_idx]`: one row per
/// tenor (years), one column per loss level (fraction of pool notional).
/// Both axes must be strictly increasing with at least two points and
/// every quote must lie in [0, 1].
///
/// # Example
///
/// ```
/// use pricer_core::market_data::surfaces::{BaseCorrelationSurface, SurfaceExtrapolation};
///
/// let surface = BaseCorrelationSurface::<f64>::new(
///     &[1.0, 5.0],
///     &[0.03, 0.12],
///     &[&[0.10, 0.30][..], &[0.20, 0.40][..]],
///     SurfaceExtrapolation::Flat,
/// )
/// .unwrap();
///
/// let rho = surface.correlation(3.0, 0.075).unwrap();
/// assert!((rho - 0.25).abs() < 1e-12);
///
/// // Flat extrapolation clamps to the 5Y / 12% corner.
/// assert!((surface.correlation(10.0, 0.5).unwrap() - 0.40).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BaseCorrelationSurface<T: Float> {
    grid: BilinearInterpolator<T>,
    extrapolation: SurfaceExtrapolation,
}

impl<T: Float> BaseCorrelationSurface<T> {
    /// Construct a surface from tenors, loss levels and correlation quotes.
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::InvalidMaturity)` - A negative tenor
    /// * `Err(MarketDataError::OutOfBounds)` - A loss level outside [0, 1]
    /// * `Err(MarketDataError::InvalidCorrelation)` - A quote outside [0, 1]
    /// * `Err(MarketDataError::Interpolation)` - Axes too short, not strictly
    ///   increasing, or grid shape mismatch
    pub fn new(
        tenors: &[T],
        loss_levels: &[T],
        correlations: &[&[T]],
        extrapolation: SurfaceExtrapolation,
    ) -> Result<Self, MarketDataError> {
        if let Some(&t) = tenors.iter().find(|&&t| t < T::zero()) {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(f64::NAN),
            });
        }
        if let Some(&k) = loss_levels
            .iter()
            .find(|&&k| k < T::zero() || k > T::one())
        {
            return Err(MarketDataError::OutOfBounds {
                x: k.to_f64().unwrap_or(f64::NAN),
                min: 0.0,
                max: 1.0,
            });
        }
        for row in correlations {
            if let Some(&rho) = row.iter().find(|&&rho| !(rho >= T::zero() && rho <= T::one())) {
                return Err(MarketDataError::InvalidCorrelation {
                    value: rho.to_f64().unwrap_or(f64::NAN),
                });
            }
        }

        let grid = BilinearInterpolator::new(tenors, loss_levels, correlations)?;
        Ok(Self {
            grid,
            extrapolation,
        })
    }

    /// Base correlation at (`tenor`, `loss_level`).
    ///
    /// Inside the grid the quotes are interpolated bilinearly; outside it
    /// the surface's [`SurfaceExtrapolation`] policy applies.
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::OutOfBounds)` - Outside the grid under
    ///   `SurfaceExtrapolation::Error`
    pub fn correlation(&self, tenor: T, loss_level: T) -> Result<T, MarketDataError> {
        let (t_min, t_max) = self.grid.domain_x();
        let (k_min, k_max) = self.grid.domain_y();
        let inside = tenor >= t_min && tenor <= t_max && loss_level >= k_min && loss_level <= k_max;

        if inside {
            return Ok(self.grid.interpolate(tenor, loss_level)?);
        }

        match self.extrapolation {
            SurfaceExtrapolation::Flat => Ok(self
                .grid
                .interpolate(tenor.max(t_min).min(t_max), loss_level.max(k_min).min(k_max))?),
            SurfaceExtrapolation::Linear => {
                let rho = self.grid.extrapolate(tenor, loss_level);
                Ok(rho.max(T::zero()).min(T::one()))
            }
            SurfaceExtrapolation::Error => {
                let (x, min, max) = if tenor < t_min || tenor > t_max {
                    (tenor, t_min, t_max)
                } else {
                    (loss_level, k_min, k_max)
                };
                Err(MarketDataError::OutOfBounds {
                    x: x.to_f64().unwrap_or(f64::NAN),
                    min: min.to_f64().unwrap_or(f64::NAN),
                    max: max.to_f64().unwrap_or(f64::NAN),
                })
            }
        }
    }

    /// Quoted tenors in years.
    pub fn tenors(&self) -> &[T] {
        self.grid.xs()
    }

    /// Quoted loss levels as fractions of pool notional.
    pub fn loss_levels(&self) -> &[T] {
        self.grid.ys()
    }

    /// Out-of-grid policy.
    pub fn extrapolation(&self) -> SurfaceExtrapolation {
        self.extrapolation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn skewed(policy: SurfaceExtrapolation) -> BaseCorrelationSurface<f64> {
        BaseCorrelationSurface::new(
            &[1.0, 5.0],
            &[0.03, 0.12],
            &[&[0.10, 0.30][..], &[0.20, 0.40][..]],
            policy,
        )
        .unwrap()
    }

    // ===== Construction =====

    #[test]
    fn test_rejects_correlation_above_one() {
        let err = BaseCorrelationSurface::new(
            &[1.0, 5.0],
            &[0.03, 0.12],
            &[&[0.1, 1.1][..], &[0.2, 0.4][..]],
            SurfaceExtrapolation::Flat,
        )
        .unwrap_err();
        assert_eq!(err, MarketDataError::InvalidCorrelation { value: 1.1 });
    }

    #[test]
    fn test_rejects_unsorted_tenors() {
        let err = BaseCorrelationSurface::new(
            &[5.0, 1.0],
            &[0.03, 0.12],
            &[&[0.1, 0.2][..], &[0.2, 0.4][..]],
            SurfaceExtrapolation::Flat,
        )
        .unwrap_err();
        assert!(matches!(err, MarketDataError::Interpolation(_)));
    }

    #[test]
    fn test_rejects_loss_level_above_one() {
        let err = BaseCorrelationSurface::new(
            &[1.0, 5.0],
            &[0.03, 1.5],
            &[&[0.1, 0.2][..], &[0.2, 0.4][..]],
            SurfaceExtrapolation::Flat,
        )
        .unwrap_err();
        assert!(matches!(err, MarketDataError::OutOfBounds { .. }));
    }

    #[test]
    fn test_default_policy_is_flat() {
        assert_eq!(SurfaceExtrapolation::default(), SurfaceExtrapolation::Flat);
    }

    // ===== Lookup =====

    #[test]
    fn test_corner_values() {
        let s = skewed(SurfaceExtrapolation::Error);
        assert_abs_diff_eq!(s.correlation(1.0, 0.03).unwrap(), 0.10, epsilon = 1e-15);
        assert_abs_diff_eq!(s.correlation(5.0, 0.12).unwrap(), 0.40, epsilon = 1e-15);
    }

    #[test]
    fn test_flat_extrapolation_clamps() {
        let s = skewed(SurfaceExtrapolation::Flat);
        assert_abs_diff_eq!(s.correlation(0.25, 0.0).unwrap(), 0.10, epsilon = 1e-15);
        assert_abs_diff_eq!(s.correlation(3.0, 0.5).unwrap(), 0.35, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_extrapolation_extends_and_caps() {
        let s = skewed(SurfaceExtrapolation::Linear);
        // Along the loss axis: 0.10 + (0.30 - 0.10) * (0.21 - 0.03) / 0.09 at 1Y
        assert_abs_diff_eq!(s.correlation(1.0, 0.21).unwrap(), 0.50, epsilon = 1e-12);
        assert_eq!(s.correlation(1.0, 1.0).unwrap(), 1.0);
        assert_abs_diff_eq!(s.correlation(1.0, 0.0).unwrap(), 0.10 - 0.2 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_error_policy_reports_axis() {
        let s = skewed(SurfaceExtrapolation::Error);
        let err = s.correlation(3.0, 0.20).unwrap_err();
        assert_eq!(
            err,
            MarketDataError::OutOfBounds {
                x: 0.20,
                min: 0.03,
                max: 0.12
            }
        );
        let err = s.correlation(7.0, 0.05).unwrap_err();
        assert!(matches!(err, MarketDataError::OutOfBounds { x, .. } if x == 7.0));
    }
}
