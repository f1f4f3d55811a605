//! Numerical building blocks.
//!
//! - [`interpolators`]: Grid interpolation (bilinear surfaces)
//! - [`quadrature`]: Gauss-Legendre and trapezoid rules on finite intervals
//! - [`solvers`]: Brent root finding

pub mod interpolators;
pub mod quadrature;
pub mod solvers;
