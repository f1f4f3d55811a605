//! Correlation surfaces.
//!
//! This module provides:
//! - [`BaseCorrelationSurface`]: Tenor by loss-level grid of base correlations
//! - [`SurfaceExtrapolation`]: Out-of-grid policy (flat, linear or error)

mod base_correlation;

pub use base_correlation::{BaseCorrelationSurface, SurfaceExtrapolation};
