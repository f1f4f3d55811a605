//! Default-probability term structures.
//!
//! This module provides:
//! - [`CreditCurve`]: Hazard rate, survival and default probability by horizon
//! - [`FlatHazardRateCurve`]: Constant hazard rate
//! - [`HazardRateCurve`]: Piecewise-flat hazard rates between pillars
//! - [`SharedCreditCurve`]: Thread-safe shared handle used by issuer registries

use std::sync::Arc;

use crate::market_data::error::MarketDataError;
use num_traits::Float;

/// Shared, read-only default-probability curve.
pub type SharedCreditCurve = Arc<dyn CreditCurve<f64> + Send + Sync>;

/// Default-probability term structure.
///
/// Implementations are generic over `T: Float`.
///
/// # Invariants
///
/// - λ(t) ≥ 0 for all t ≥ 0
/// - P(τ > 0) = 1
/// - P(τ > t) is non-increasing in t
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{CreditCurve, FlatHazardRateCurve};
///
/// let curve = FlatHazardRateCurve::new(0.02_f64).unwrap();
/// let pd = curve.default_probability(5.0).unwrap();
/// assert!((pd - (1.0 - (-0.1_f64).exp())).abs() < 1e-14);
/// ```
pub trait CreditCurve<T: Float> {
    /// Instantaneous hazard rate λ(t) at time `t` (years).
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::InvalidMaturity)` - If t < 0
    fn hazard_rate(&self, t: T) -> Result<T, MarketDataError>;

    /// Survival probability P(τ > t) = exp(-∫₀ᵗ λ(s)ds).
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::InvalidMaturity)` - If t < 0
    fn survival_probability(&self, t: T) -> Result<T, MarketDataError>;

    /// Default probability P(τ ≤ t) = 1 - P(τ > t).
    fn default_probability(&self, t: T) -> Result<T, MarketDataError> {
        Ok(T::one() - self.survival_probability(t)?)
    }

    /// Forward survival probability P(τ > t2 | τ > t1).
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::InvalidMaturity)` - If t2 <= t1
    fn forward_survival_probability(&self, t1: T, t2: T) -> Result<T, MarketDataError> {
        if t2 <= t1 {
            return Err(MarketDataError::InvalidMaturity {
                t: (t2 - t1).to_f64().unwrap_or(0.0),
            });
        }
        let s1 = self.survival_probability(t1)?;
        let s2 = self.survival_probability(t2)?;
        Ok(s2 / s1)
    }
}

fn check_time<T: Float>(t: T) -> Result<(), MarketDataError> {
    if t < T::zero() || t.is_nan() {
        return Err(MarketDataError::InvalidMaturity {
            t: t.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(())
}

fn check_rate<T: Float>(rate: T) -> Result<(), MarketDataError> {
    if rate < T::zero() || !rate.is_finite() {
        return Err(MarketDataError::InvalidHazardRate {
            rate: rate.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(())
}

/// Constant hazard rate curve: P(τ ≤ t) = 1 - exp(-λt).
///
/// Defined for every non-negative horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatHazardRateCurve<T: Float> {
    hazard_rate: T,
}

impl<T: Float> FlatHazardRateCurve<T> {
    /// Construct a flat hazard rate curve.
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::InvalidHazardRate)` - Negative or non-finite rate
    pub fn new(hazard_rate: T) -> Result<Self, MarketDataError> {
        check_rate(hazard_rate)?;
        Ok(Self { hazard_rate })
    }

    /// Return the constant hazard rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.hazard_rate
    }
}

impl<T: Float> CreditCurve<T> for FlatHazardRateCurve<T> {
    fn hazard_rate(&self, t: T) -> Result<T, MarketDataError> {
        check_time(t)?;
        Ok(self.hazard_rate)
    }

    fn survival_probability(&self, t: T) -> Result<T, MarketDataError> {
        check_time(t)?;
        Ok((-self.hazard_rate * t).exp())
    }

    fn default_probability(&self, t: T) -> Result<T, MarketDataError> {
        check_time(t)?;
        // exp_m1 keeps precision for small λt
        Ok(-(-self.hazard_rate * t).exp_m1())
    }
}

/// Piecewise-flat hazard rate curve.
///
/// Pillar `i` carries the hazard rate applying on `(t_{i-1}, t_i]`, with
/// `t_{-1} = 0`. Beyond the last pillar the last rate is extended when
/// extrapolation is enabled; otherwise such queries fail.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{CreditCurve, HazardRateCurve};
///
/// let curve = HazardRateCurve::new(&[1.0_f64, 3.0], &[0.01, 0.03], false).unwrap();
///
/// // ∫₀² λ = 0.01 * 1 + 0.03 * 1
/// let surv = curve.survival_probability(2.0).unwrap();
/// assert!((surv - (-0.04_f64).exp()).abs() < 1e-14);
/// assert!(curve.survival_probability(4.0).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct HazardRateCurve<T: Float> {
    tenors: Vec<T>,
    hazard_rates: Vec<T>,
    allow_extrapolation: bool,
}

impl<T: Float> HazardRateCurve<T> {
    /// Construct a curve from pillar tenors (years) and hazard rates.
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::InsufficientData)` - No pillars, or length mismatch
    /// * `Err(MarketDataError::InvalidMaturity)` - Non-positive or unsorted tenor
    /// * `Err(MarketDataError::InvalidHazardRate)` - Negative or non-finite rate
    pub fn new(
        tenors: &[T],
        hazard_rates: &[T],
        allow_extrapolation: bool,
    ) -> Result<Self, MarketDataError> {
        if tenors.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }
        if tenors.len() != hazard_rates.len() {
            return Err(MarketDataError::InsufficientData {
                got: hazard_rates.len(),
                need: tenors.len(),
            });
        }

        let mut previous = T::zero();
        for &t in tenors {
            if t <= previous || !t.is_finite() {
                return Err(MarketDataError::InvalidMaturity {
                    t: t.to_f64().unwrap_or(f64::NAN),
                });
            }
            previous = t;
        }
        for &h in hazard_rates {
            check_rate(h)?;
        }

        Ok(Self {
            tenors: tenors.to_vec(),
            hazard_rates: hazard_rates.to_vec(),
            allow_extrapolation,
        })
    }

    /// Last pillar tenor.
    #[inline]
    pub fn max_tenor(&self) -> T {
        self.tenors[self.tenors.len() - 1]
    }

    /// Return the number of pillar points.
    #[inline]
    pub fn len(&self) -> usize {
        self.tenors.len()
    }

    /// Check if the curve has no pillar points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tenors.is_empty()
    }

    /// Return whether extrapolation is allowed.
    #[inline]
    pub fn allow_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }

    fn check_domain(&self, t: T) -> Result<(), MarketDataError> {
        check_time(t)?;
        if t > self.max_tenor() && !self.allow_extrapolation {
            return Err(MarketDataError::OutOfBounds {
                x: t.to_f64().unwrap_or(f64::NAN),
                min: 0.0,
                max: self.max_tenor().to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(())
    }

    /// ∫₀ᵗ λ(s)ds, summed segment by segment.
    fn integrated_hazard(&self, t: T) -> T {
        let mut integral = T::zero();
        let mut start = T::zero();
        for (&end, &h) in self.tenors.iter().zip(&self.hazard_rates) {
            if t <= start {
                return integral;
            }
            integral = integral + h * (t.min(end) - start);
            start = end;
        }
        if t > start {
            integral = integral + self.hazard_rates[self.hazard_rates.len() - 1] * (t - start);
        }
        integral
    }
}

impl<T: Float> CreditCurve<T> for HazardRateCurve<T> {
    fn hazard_rate(&self, t: T) -> Result<T, MarketDataError> {
        self.check_domain(t)?;
        let idx = self
            .tenors
            .partition_point(|&pillar| pillar < t)
            .min(self.hazard_rates.len() - 1);
        Ok(self.hazard_rates[idx])
    }

    fn survival_probability(&self, t: T) -> Result<T, MarketDataError> {
        self.check_domain(t)?;
        Ok((-self.integrated_hazard(t)).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // ========================================
    // FlatHazardRateCurve Tests
    // ========================================

    #[test]
    fn test_flat_curve_rejects_negative_rate() {
        let err = FlatHazardRateCurve::new(-0.01_f64).unwrap_err();
        assert_eq!(err, MarketDataError::InvalidHazardRate { rate: -0.01 });
    }

    #[test]
    fn test_flat_curve_survival_at_zero() {
        let curve = FlatHazardRateCurve::new(0.05_f64).unwrap();
        assert_eq!(curve.survival_probability(0.0).unwrap(), 1.0);
        assert_eq!(curve.default_probability(0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_flat_curve_default_probability() {
        let curve = FlatHazardRateCurve::new(0.001_f64).unwrap();
        let pd = curve.default_probability(5.0).unwrap();
        assert_abs_diff_eq!(pd, 1.0 - (-0.005_f64).exp(), epsilon = 1e-16);
    }

    #[test]
    fn test_flat_curve_zero_rate() {
        let curve = FlatHazardRateCurve::new(0.0_f64).unwrap();
        assert_eq!(curve.default_probability(30.0).unwrap(), 0.0);
    }

    #[test]
    fn test_flat_curve_negative_time() {
        let curve = FlatHazardRateCurve::new(0.02_f64).unwrap();
        assert!(curve.hazard_rate(-1.0).is_err());
        assert!(curve.default_probability(-0.1).is_err());
    }

    #[test]
    fn test_flat_curve_forward_survival() {
        let curve = FlatHazardRateCurve::new(0.02_f64).unwrap();
        let fwd = curve.forward_survival_probability(1.0, 3.0).unwrap();
        assert_abs_diff_eq!(fwd, (-0.04_f64).exp(), epsilon = 1e-14);
        assert!(curve.forward_survival_probability(3.0, 3.0).is_err());
    }

    #[test]
    fn test_flat_curve_f32() {
        let curve = FlatHazardRateCurve::new(0.01_f32).unwrap();
        let surv = curve.survival_probability(5.0_f32).unwrap();
        assert!((surv - (-0.05_f32).exp()).abs() < 1e-6);
    }

    // ========================================
    // HazardRateCurve Tests
    // ========================================

    #[test]
    fn test_hazard_curve_validation() {
        assert!(HazardRateCurve::<f64>::new(&[], &[], true).is_err());
        assert!(HazardRateCurve::new(&[1.0_f64, 2.0], &[0.01], true).is_err());
        assert!(HazardRateCurve::new(&[2.0_f64, 1.0], &[0.01, 0.02], true).is_err());
        assert!(HazardRateCurve::new(&[0.0_f64, 1.0], &[0.01, 0.02], true).is_err());
        assert!(HazardRateCurve::new(&[1.0_f64, 2.0], &[0.01, -0.02], true).is_err());
    }

    #[test]
    fn test_hazard_curve_piecewise_rates() {
        let curve = HazardRateCurve::new(&[1.0_f64, 3.0, 5.0], &[0.01, 0.02, 0.03], true).unwrap();
        assert_eq!(curve.hazard_rate(0.5).unwrap(), 0.01);
        assert_eq!(curve.hazard_rate(1.0).unwrap(), 0.01);
        assert_eq!(curve.hazard_rate(1.5).unwrap(), 0.02);
        assert_eq!(curve.hazard_rate(5.0).unwrap(), 0.03);
        assert_eq!(curve.hazard_rate(9.0).unwrap(), 0.03);
    }

    #[test]
    fn test_hazard_curve_integrated_survival() {
        let curve = HazardRateCurve::new(&[1.0_f64, 3.0], &[0.01, 0.02], true).unwrap();
        let surv = curve.survival_probability(4.0).unwrap();
        // 0.01 * 1 + 0.02 * 2 + 0.02 * 1 (extrapolated)
        assert_abs_diff_eq!(surv, (-0.07_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_hazard_curve_matches_flat_curve() {
        let flat = FlatHazardRateCurve::new(0.04_f64).unwrap();
        let curve = HazardRateCurve::new(&[1.0_f64, 2.0, 7.0], &[0.04, 0.04, 0.04], true).unwrap();
        for t in [0.0, 0.3, 1.0, 4.5, 7.0, 12.0] {
            assert_abs_diff_eq!(
                curve.default_probability(t).unwrap(),
                flat.default_probability(t).unwrap(),
                epsilon = 1e-14
            );
        }
    }

    #[test]
    fn test_hazard_curve_no_extrapolation() {
        let curve = HazardRateCurve::new(&[1.0_f64, 2.0], &[0.01, 0.02], false).unwrap();
        assert!(curve.survival_probability(2.0).is_ok());
        let err = curve.survival_probability(2.5).unwrap_err();
        assert!(matches!(err, MarketDataError::OutOfBounds { .. }));
    }

    #[test]
    fn test_hazard_curve_survival_monotone() {
        let curve = HazardRateCurve::new(&[1.0_f64, 3.0, 5.0], &[0.03, 0.0, 0.05], true).unwrap();
        let mut previous = 1.0;
        for i in 0..40 {
            let s = curve.survival_probability(i as f64 * 0.25).unwrap();
            assert!(s <= previous);
            previous = s;
        }
    }

    #[test]
    fn test_shared_curve_object_safe() {
        let curve: SharedCreditCurve = Arc::new(FlatHazardRateCurve::new(0.01).unwrap());
        assert!(curve.default_probability(1.0).unwrap() > 0.0);
    }
}
