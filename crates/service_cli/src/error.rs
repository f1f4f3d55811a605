//! CLI error types.

use pricer_core::market_data::MarketDataError;
use pricer_core::types::{CurrencyError, DateError};
use pricer_models::LossModelError;
use pricer_pricing::mc::ConfigError as SimulationConfigError;
use thiserror::Error;

/// Errors reported to the user with an `error:` prefix.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file could not be read.
    #[error("cannot read configuration {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`RunConfig`](crate::config::RunConfig).
    #[error("cannot parse configuration: {0}")]
    Parse(String),

    /// Configuration values failed validation.
    #[error("invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Invalid date in the configuration.
    #[error(transparent)]
    Date(#[from] DateError),

    /// Invalid currency code in the configuration.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Market data construction failed.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// Invalid simulation settings.
    #[error(transparent)]
    Simulation(#[from] SimulationConfigError),

    /// Loss model construction or evaluation failed.
    #[error(transparent)]
    Model(#[from] LossModelError),
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
