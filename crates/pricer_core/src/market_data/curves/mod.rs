//! Default-probability curves.
//!
//! This module provides:
//! - [`CreditCurve`]: Generic trait for hazard rate and survival probability calculations
//! - [`HazardRateCurve`]: Piecewise-flat hazard rate curve
//! - [`FlatHazardRateCurve`]: Constant hazard rate curve
//! - [`SharedCreditCurve`]: `Arc` handle shared between issuers and pools

mod credit;

pub use credit::{CreditCurve, FlatHazardRateCurve, HazardRateCurve, SharedCreditCurve};
