//! # Pricer Pricing (Layer 3: Simulation)
//!
//! Monte-Carlo loss models for credit baskets:
//! - [`rng`]: seeded random streams and per-batch substream seeds
//! - [`mc`]: simulation configuration, the batched trial engine and the
//!   random-default and random-loss models
//!
//! The models implement `pricer_models::loss_models::DefaultLossModel` and
//! are interchangeable with the semi-analytic models of `pricer_models`.
//! Batches run in parallel with rayon; results are reduced in batch order
//! and do not depend on the size of the thread pool.

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod mc;
pub mod rng;

pub use mc::{RandomDefaultLossModel, RandomLossModel, SimulationConfig, SimulationResult};
