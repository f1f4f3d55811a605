//! Closed-form probability distributions.
//!
//! - Standard normal density, CDF and quantile on top of `statrs`
//! - [`Marginal`]: per-variable law of a latent factor model
//!
//! Both tails are computed through erfc so conditional default
//! probabilities stay accurate deep in the factor tails.

pub mod distributions;

pub use distributions::{norm_cdf, norm_inv_cdf, norm_pdf, Marginal};
