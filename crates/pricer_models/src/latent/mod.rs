//! Latent factor models of joint default.
//!
//! Each name carries a latent variable `Y_i = Σ a_ik Z_k + b_i ε_i`; it
//! defaults by the horizon when `Y_i` is below a threshold matched to its
//! marginal default probability. Conditional on the factors `Z` defaults
//! are independent, which is what every semi-analytic loss model exploits.
//!
//! - [`FactorLoadings`]: weights `a_ik` with `Σ a² <= 1`
//! - [`CopulaPolicy`]: Gaussian or Student-t marginals
//! - [`IntegrationConfig`], [`FactorGrid`]: factor quadrature
//! - [`DefaultLatentModel`]: thresholds, conditional probabilities, integration
//! - [`ConstantLossLatentModel`], [`SpotLossLatentModel`]: fixed or random recoveries

mod constant_loss;
mod copula;
mod default_model;
mod integration;
mod loadings;
mod spot_loss;

pub use constant_loss::{validate_recoveries, ConstantLossLatentModel};
pub use copula::CopulaPolicy;
pub use default_model::DefaultLatentModel;
pub use integration::{
    FactorGrid, IntegrationConfig, LatentModelIntegrationType, MAX_FACTOR_GRID_POINTS,
};
pub use loadings::FactorLoadings;
pub use spot_loss::SpotLossLatentModel;
