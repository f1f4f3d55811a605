//! # pricer_core: Numerical and Market Data Foundation
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the credit basket workspace, providing:
//! - Time types: `Date` with month arithmetic, `DayCountConvention` (`types::time`)
//! - Currency codes used to key default-probability curves (`types::currency`)
//! - Error types: `DateError`, `InterpolationError`, `SolverError`, `QuadratureError` (`types::error`)
//! - Quadrature grids, bilinear interpolation and Brent root finding (`math`)
//! - Default-probability curves and base-correlation surfaces (`market_data`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - chrono: Date arithmetic
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::market_data::curves::{CreditCurve, FlatHazardRateCurve};
//! use pricer_core::types::{Date, DayCountConvention};
//!
//! let today = Date::from_ymd(2014, 3, 19).unwrap();
//! let horizon = today.add_months(60).unwrap();
//! let t = DayCountConvention::Actual365Fixed.year_fraction_dates(today, horizon);
//!
//! let curve = FlatHazardRateCurve::new(0.03_f64).unwrap();
//! let pd = curve.default_probability(t).unwrap();
//! assert!(pd > 0.13 && pd < 0.14);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for Date, Currency, DayCountConvention and surface policies

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
