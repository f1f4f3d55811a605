//! Monte-Carlo loss models.
//!
//! ```text
//! RandomDefaultLossModel / RandomLossModel
//! ├── SimulationConfig  (trials, batches, tolerance, seed)
//! ├── LatentSampler     (factor and shock draws per copula)
//! └── run_simulation()  (seeded batches, ordered reduction)
//! ```
//!
//! Both models implement [`DefaultLossModel`](pricer_models::loss_models::DefaultLossModel)
//! and can be attached to a basket like the semi-analytic models. Every
//! evaluation re-seeds from the configured seed, so repeated queries on the
//! same context return identical results.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use pricer_models::credit::LossContext;
//! use pricer_models::latent::{ConstantLossLatentModel, CopulaPolicy, FactorLoadings, IntegrationConfig};
//! use pricer_models::loss_models::DefaultLossModel;
//! use pricer_pricing::mc::{RandomDefaultLossModel, SimulationConfig};
//!
//! let latent = ConstantLossLatentModel::new(
//!     FactorLoadings::homogeneous(3, 0.5).unwrap(),
//!     vec![0.4; 3],
//!     CopulaPolicy::Gaussian,
//!     IntegrationConfig::for_copula(&CopulaPolicy::Gaussian),
//! )
//! .unwrap();
//! let config = SimulationConfig::builder().n_simulations(5_000).seed(42).build().unwrap();
//! let model = RandomDefaultLossModel::new(Arc::new(latent), config).unwrap();
//!
//! let ctx = LossContext::new(5.0, vec![100.0; 3], vec![0.05, 0.1, 0.15], 0.0, 0.3).unwrap();
//! let loss = model.expected_tranche_loss(&ctx).unwrap();
//! assert_eq!(loss, model.expected_tranche_loss(&ctx).unwrap());
//! ```

mod config;
pub mod engine;
mod error;
mod random_default;
mod random_loss;
mod sampler;

pub use config::{
    SimulationConfig, SimulationConfigBuilder, DEFAULT_BATCH_SIZE, DEFAULT_MIN_SIMULATIONS,
    DEFAULT_SEED, MAX_SIMULATIONS,
};
pub use engine::{run_simulation, SimulationResult};
pub use error::ConfigError;
pub use random_default::RandomDefaultLossModel;
pub use random_loss::RandomLossModel;
pub use sampler::LatentSampler;
