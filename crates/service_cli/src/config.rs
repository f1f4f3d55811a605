//! Run configuration.
//!
//! Loaded from a TOML file with every field optional; missing fields fall
//! back to the ten-name reference scenario. `NEUTRYX_SEED` and
//! `NEUTRYX_SIMULATIONS` override the simulation section.

use std::path::Path;

use pricer_core::market_data::SurfaceExtrapolation;
use pricer_core::types::{Currency, Date, DayCountConvention};
use pricer_models::credit::validate_tranche_bounds;
use pricer_models::loss_models::MIN_LOSS_BUCKETS;
use pricer_pricing::mc::{SimulationConfig, DEFAULT_SEED};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Environment variable overriding the master seed.
pub const SEED_ENV: &str = "NEUTRYX_SEED";

/// Environment variable overriding the number of trials.
pub const SIMULATIONS_ENV: &str = "NEUTRYX_SIMULATIONS";

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Valuation date (YYYY-MM-DD)
    pub reference_date: String,
    /// Horizon in months after the valuation date
    pub horizon_months: i32,
    /// Pool and tranche
    pub basket: BasketSection,
    /// Semi-analytic model settings
    pub models: ModelSection,
    /// Monte-Carlo settings
    pub simulation: SimulationSection,
    /// Base-correlation quotes
    pub base_correlation: BaseCorrelationSection,
}

/// Pool and tranche description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BasketSection {
    /// ISO currency of the default probability key
    pub currency: String,
    /// Flat hazard rate per name
    pub hazard_rates: Vec<f64>,
    /// Notional of every name
    pub notional: f64,
    /// Recovery of every name
    pub recovery: f64,
    /// Pairwise latent correlation; the factor loading is its square root
    pub correlation: f64,
    /// Tranche attachment as a fraction of pool notional
    pub attachment: f64,
    /// Tranche detachment as a fraction of pool notional
    pub detachment: f64,
    /// Day count from valuation date to horizon
    pub day_count: DayCountConvention,
}

/// Settings shared by the latent factor models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSection {
    /// Student-t orders, one shared or factor orders then the idiosyncratic one
    pub student_t_orders: Vec<u32>,
    /// Buckets of the inhomogeneous pool model
    pub loss_buckets: usize,
    /// Recovery dispersion of the random-loss models
    pub recovery_dispersion: f64,
}

/// Monte-Carlo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    /// Maximum number of trials
    pub n_simulations: usize,
    /// Standard-error target for early stopping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    /// Master seed
    pub seed: u64,
}

/// Base-correlation surface quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaseCorrelationSection {
    /// Tenors in months from the reference date
    pub tenor_months: Vec<i32>,
    /// Detachment loss levels
    pub loss_levels: Vec<f64>,
    /// One row of correlations per tenor
    pub correlations: Vec<Vec<f64>>,
    /// Behaviour outside the quoted grid
    pub extrapolation: SurfaceExtrapolation,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            reference_date: "2014-03-19".to_string(),
            horizon_months: 60,
            basket: BasketSection::default(),
            models: ModelSection::default(),
            simulation: SimulationSection::default(),
            base_correlation: BaseCorrelationSection::default(),
        }
    }
}

impl Default for BasketSection {
    fn default() -> Self {
        let mut hazard_rates = vec![0.001];
        hazard_rates.extend((1..10).map(|i| 0.01 * i as f64));
        Self {
            currency: "EUR".to_string(),
            hazard_rates,
            notional: 100.0,
            recovery: 0.4,
            correlation: 0.05,
            attachment: 0.03,
            detachment: 0.06,
            day_count: DayCountConvention::default(),
        }
    }
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            student_t_orders: vec![3, 3],
            loss_buckets: 100,
            recovery_dispersion: 2.2,
        }
    }
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            n_simulations: 100_000,
            tolerance: Some(1e-6),
            seed: DEFAULT_SEED,
        }
    }
}

impl Default for BaseCorrelationSection {
    fn default() -> Self {
        Self {
            tenor_months: vec![12, 60],
            loss_levels: vec![0.03, 0.12],
            correlations: vec![vec![0.05, 0.05], vec![0.05, 0.05]],
            extrapolation: SurfaceExtrapolation::Flat,
        }
    }
}

impl RunConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::Parse(e.to_string()))
    }

    /// Load a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load `path` when given, the built-in scenario otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply `NEUTRYX_SEED` and `NEUTRYX_SIMULATIONS` from the process environment.
    pub fn with_env_override(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup(SEED_ENV) {
            self.simulation.seed = seed
                .trim()
                .parse()
                .map_err(|_| CliError::Validation(vec![format!("{SEED_ENV}='{seed}' is not a seed")]))?;
        }
        if let Some(n) = lookup(SIMULATIONS_ENV) {
            self.simulation.n_simulations = n.trim().parse().map_err(|_| {
                CliError::Validation(vec![format!("{SIMULATIONS_ENV}='{n}' is not a trial count")])
            })?;
        }
        Ok(self)
    }

    /// Check every section, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if let Err(e) = Date::parse(&self.reference_date) {
            errors.push(e.to_string());
        }
        if self.horizon_months <= 0 {
            errors.push(format!("horizon_months must be positive, got {}", self.horizon_months));
        }

        let basket = &self.basket;
        if let Err(e) = basket.currency.parse::<Currency>() {
            errors.push(e.to_string());
        }
        if basket.hazard_rates.is_empty() {
            errors.push("basket has no names".to_string());
        }
        if let Some(rate) = basket.hazard_rates.iter().find(|r| !(r.is_finite() && **r >= 0.0)) {
            errors.push(format!("hazard rate {rate} is not a non-negative number"));
        }
        if !(basket.notional.is_finite() && basket.notional > 0.0) {
            errors.push(format!("notional must be positive, got {}", basket.notional));
        }
        if !(0.0..=1.0).contains(&basket.recovery) {
            errors.push(format!("recovery {} not in [0, 1]", basket.recovery));
        }
        if !(0.0..=1.0).contains(&basket.correlation) {
            errors.push(format!("correlation {} not in [0, 1]", basket.correlation));
        }
        if let Err(e) = validate_tranche_bounds(basket.attachment, basket.detachment) {
            errors.push(e.to_string());
        }

        let models = &self.models;
        if models.student_t_orders.is_empty() || models.student_t_orders.contains(&0) {
            errors.push("Student-t orders must be positive".to_string());
        }
        if models.loss_buckets < MIN_LOSS_BUCKETS {
            errors.push(format!(
                "loss_buckets must be at least {MIN_LOSS_BUCKETS}, got {}",
                models.loss_buckets
            ));
        }
        if !models.recovery_dispersion.is_finite() {
            errors.push("recovery_dispersion must be finite".to_string());
        }

        if let Err(e) = self.simulation_config() {
            errors.push(e.to_string());
        }

        let bc = &self.base_correlation;
        if bc.tenor_months.iter().any(|&m| m <= 0) {
            errors.push("base correlation tenors must be positive".to_string());
        }
        if bc.correlations.len() != bc.tenor_months.len()
            || bc.correlations.iter().any(|row| row.len() != bc.loss_levels.len())
        {
            errors.push(format!(
                "base correlations must form a {} x {} grid",
                bc.tenor_months.len(),
                bc.loss_levels.len()
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CliError::Validation(errors))
        }
    }

    /// Simulation settings for the Monte-Carlo models.
    pub fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut builder = SimulationConfig::builder()
            .n_simulations(self.simulation.n_simulations)
            .seed(self.simulation.seed);
        if let Some(tolerance) = self.simulation.tolerance {
            builder = builder.tolerance(tolerance);
        }
        Ok(builder.build()?)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Parse(e.to_string()))
    }
}
