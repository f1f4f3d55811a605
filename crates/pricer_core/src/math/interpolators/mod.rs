//! Interpolation on grids of market quotes.
//!
//! - [`BilinearInterpolator`]: 2D grid interpolation with optional linear
//!   continuation of the edge cells, used by correlation surfaces
//!
//! All interpolators are generic over `T: num_traits::Float`.

mod bilinear;

pub use bilinear::BilinearInterpolator;
