//! Core time, currency and error types.
//!
//! This module provides:
//! - `time`: `Date` and `DayCountConvention` for turning calendar dates into model horizons
//! - `currency`: ISO 4217 currency codes
//! - `error`: Structured error types for dates, currencies, interpolation, solvers and quadrature
//!
//! # Re-exports
//!
//! - [`Date`], [`DayCountConvention`] from `time`
//! - [`Currency`] from `currency`
//! - [`DateError`], [`CurrencyError`], [`InterpolationError`], [`SolverError`], [`QuadratureError`] from `error`

pub mod currency;
pub mod error;
pub mod time;

pub use currency::Currency;
pub use error::{CurrencyError, DateError, InterpolationError, QuadratureError, SolverError};
pub use time::{Date, DayCountConvention};
