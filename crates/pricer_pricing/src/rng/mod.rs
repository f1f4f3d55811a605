//! # Random Number Generation
//!
//! Seeded pseudo-random streams for the Monte-Carlo loss models.
//!
//! - **Reproducibility**: every stream is built from a `u64` seed
//! - **Substreams**: [`derive_stream_seed`] spreads one master seed over
//!   independent per-batch generators, so a simulation gives the same
//!   answer whatever the number of worker threads
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::rng::{derive_stream_seed, PricerRng};
//!
//! let mut rng = PricerRng::from_seed(derive_stream_seed(2863311530, 0));
//!
//! let u = rng.gen_uniform();
//! assert!((0.0..1.0).contains(&u));
//!
//! let mut buffer = vec![0.0; 16];
//! rng.fill_normal(&mut buffer);
//! ```

mod prng;

pub use prng::{derive_stream_seed, PricerRng};
