//! Market data for credit basket models.
//!
//! # Components
//!
//! - [`curves`]: Default-probability term structures (flat and piecewise hazard rates)
//! - [`surfaces`]: Base-correlation surface by tenor and detachment level
//! - [`error`]: Market data error types (MarketDataError)
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::curves::{CreditCurve, FlatHazardRateCurve};
//! use pricer_core::market_data::surfaces::{BaseCorrelationSurface, SurfaceExtrapolation};
//!
//! let curve = FlatHazardRateCurve::new(0.01_f64).unwrap();
//! let pd = curve.default_probability(5.0).unwrap();
//! assert!((pd - 0.048771).abs() < 1e-6);
//!
//! let surface = BaseCorrelationSurface::new(
//!     &[1.0_f64, 5.0],
//!     &[0.03, 0.12],
//!     &[&[0.05, 0.05][..], &[0.05, 0.05][..]],
//!     SurfaceExtrapolation::default(),
//! )
//! .unwrap();
//! assert!((surface.correlation(2.0, 0.06).unwrap() - 0.05).abs() < 1e-15);
//! ```

pub mod curves;
pub mod error;
pub mod surfaces;

pub use curves::{CreditCurve, FlatHazardRateCurve, HazardRateCurve, SharedCreditCurve};
pub use error::MarketDataError;
pub use surfaces::{BaseCorrelationSurface, SurfaceExtrapolation};
