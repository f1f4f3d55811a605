//! Monte-Carlo simulation configuration.

use super::error::ConfigError;

/// Maximum number of simulation trials.
pub const MAX_SIMULATIONS: usize = 100_000_000;

/// Trials drawn from one random substream.
pub const DEFAULT_BATCH_SIZE: usize = 1_000;

/// Trials always run before a tolerance can stop the simulation.
pub const DEFAULT_MIN_SIMULATIONS: usize = 10_000;

/// Master seed used when none is given.
pub const DEFAULT_SEED: u64 = 2_863_311_530;

/// Immutable simulation settings.
///
/// Trials are grouped in batches of `batch_size`, each batch drawing from
/// its own substream of `seed`. When a `tolerance` is set the engine stops
/// after the first complete round in which at least `min_simulations`
/// trials have run and the standard error of the tranche-loss estimate is
/// at most `tolerance`.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::SimulationConfig;
///
/// let config = SimulationConfig::builder()
///     .n_simulations(100_000)
///     .tolerance(1e-6)
///     .seed(2863311530)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_simulations(), 100_000);
/// assert_eq!(config.batch_size(), 1_000);
/// assert_eq!(config.n_batches(), 100);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    n_simulations: usize,
    batch_size: usize,
    tolerance: Option<f64>,
    min_simulations: usize,
    seed: u64,
}

impl SimulationConfig {
    /// New configuration builder.
    #[inline]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Maximum number of trials.
    #[inline]
    pub fn n_simulations(&self) -> usize {
        self.n_simulations
    }

    /// Trials per batch.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Absolute standard-error target, if early stopping is enabled.
    #[inline]
    pub fn tolerance(&self) -> Option<f64> {
        self.tolerance
    }

    /// Trials run before the tolerance is checked.
    #[inline]
    pub fn min_simulations(&self) -> usize {
        self.min_simulations
    }

    /// Master seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of batches covering `n_simulations`.
    pub fn n_batches(&self) -> usize {
        self.n_simulations.div_ceil(self.batch_size)
    }

    /// Trials in batch `index`; the last batch may be short.
    pub fn batch_len(&self, index: usize) -> usize {
        let start = index * self.batch_size;
        self.batch_size.min(self.n_simulations.saturating_sub(start))
    }

    /// Copy with a different master seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// * `InvalidSimulationCount` - `n_simulations` is 0 or above [`MAX_SIMULATIONS`]
    /// * `InvalidBatchSize` - `batch_size` is 0
    /// * `InvalidParameter` - A tolerance that is not a positive finite number
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_simulations == 0 || self.n_simulations > MAX_SIMULATIONS {
            return Err(ConfigError::InvalidSimulationCount(self.n_simulations));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if let Some(tol) = self.tolerance {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name: "tolerance",
                    value: format!("{tol} is not a positive number"),
                });
            }
        }
        Ok(())
    }
}

/// Builder for [`SimulationConfig`].
#[derive(Clone, Debug, Default)]
pub struct SimulationConfigBuilder {
    n_simulations: Option<usize>,
    batch_size: Option<usize>,
    tolerance: Option<f64>,
    min_simulations: Option<usize>,
    seed: Option<u64>,
}

impl SimulationConfigBuilder {
    /// Maximum number of trials, in [1, 10⁸].
    #[inline]
    pub fn n_simulations(mut self, n_simulations: usize) -> Self {
        self.n_simulations = Some(n_simulations);
        self
    }

    /// Trials per batch (default 1 000).
    #[inline]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Standard-error target enabling early stopping.
    #[inline]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Trials run before the tolerance is checked (default 10 000).
    #[inline]
    pub fn min_simulations(mut self, min_simulations: usize) -> Self {
        self.min_simulations = Some(min_simulations);
        self
    }

    /// Master seed (default 2863311530).
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build and validate.
    ///
    /// # Errors
    ///
    /// `ConfigError` when `n_simulations` is missing or any field is invalid.
    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let n_simulations = self.n_simulations.ok_or(ConfigError::InvalidParameter {
            name: "n_simulations",
            value: "must be specified".to_string(),
        })?;

        let config = SimulationConfig {
            n_simulations,
            batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            tolerance: self.tolerance,
            min_simulations: self.min_simulations.unwrap_or(DEFAULT_MIN_SIMULATIONS),
            seed: self.seed.unwrap_or(DEFAULT_SEED),
        };

        config.validate()?;
        Ok(config)
    }
}
