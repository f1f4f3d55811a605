//! Credit basket data model.
//!
//! - [`Issuer`] and [`DefaultProbKey`]: curves keyed by currency, seniority
//!   and restructuring clause
//! - [`Pool`]: registry of names, shared read-only between baskets
//! - [`Basket`]: tranche on a subset of pool names with a pluggable loss model
//! - [`LossContext`]: horizon snapshot handed to loss models

mod basket;
mod context;
mod issuer;
mod pool;

pub use basket::Basket;
pub use context::{validate_tranche_bounds, LossContext};
pub use issuer::{DefaultProbKey, Issuer, Restructuring, Seniority};
pub use pool::Pool;
