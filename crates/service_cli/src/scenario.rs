//! Market objects and loss models built from a [`RunConfig`].

use std::sync::Arc;

use pricer_core::market_data::{BaseCorrelationSurface, FlatHazardRateCurve, SharedCreditCurve};
use pricer_core::types::{Currency, Date};
use pricer_models::credit::{Basket, DefaultProbKey, Issuer, Pool, Seniority};
use pricer_models::latent::{
    ConstantLossLatentModel, CopulaPolicy, FactorLoadings, IntegrationConfig,
    LatentModelIntegrationType, SpotLossLatentModel,
};
use pricer_models::loss_models::{
    BaseCorrelationLossModel, BinomialLossModel, DefaultLossModel, GaussianLhpLossModel,
    InhomogeneousPoolLossModel,
};
use pricer_pricing::mc::{RandomDefaultLossModel, RandomLossModel, SimulationConfig};
use tracing::debug;

use crate::config::RunConfig;
use crate::error::Result;

/// Basket and evaluation date described by a configuration.
#[derive(Debug)]
pub struct Scenario {
    /// Basket with no loss model attached
    pub basket: Basket,
    /// Valuation date
    pub today: Date,
    /// Date at which tranche losses are measured
    pub horizon: Date,
}

impl Scenario {
    /// Build curves, issuers, pool and basket.
    pub fn build(config: &RunConfig) -> Result<Self> {
        let today = Date::parse(&config.reference_date)?;
        let horizon = today.add_months(config.horizon_months)?;
        let currency: Currency = config.basket.currency.parse()?;
        let key = DefaultProbKey::north_america_corp(currency, Seniority::SeniorSecured, 1.0);

        let mut pool = Pool::new();
        let mut names = Vec::with_capacity(config.basket.hazard_rates.len());
        for (i, &rate) in config.basket.hazard_rates.iter().enumerate() {
            let curve: SharedCreditCurve = Arc::new(FlatHazardRateCurve::new(rate)?);
            let name = format!("Acme{i}");
            pool.add(&name, Issuer::new(vec![(key.clone(), curve)]), key.clone());
            names.push(name);
        }
        debug!(names = names.len(), %today, %horizon, "pool built");

        let notionals = vec![config.basket.notional; names.len()];
        let basket = Basket::new(
            today,
            names,
            notionals,
            Arc::new(pool),
            config.basket.attachment,
            config.basket.detachment,
        )?
        .with_day_count(config.basket.day_count);

        Ok(Self {
            basket,
            today,
            horizon,
        })
    }

    /// Number of names.
    pub fn size(&self) -> usize {
        self.basket.size()
    }
}

/// Every model evaluated by the `tranche` command, in evaluation order.
pub fn model_lineup(
    config: &RunConfig,
    scenario: &Scenario,
) -> Result<Vec<Box<dyn DefaultLossModel>>> {
    let n = scenario.size();
    let recoveries = vec![config.basket.recovery; n];
    let weight = config.basket.correlation.sqrt();
    let student_t = CopulaPolicy::StudentT {
        orders: config.models.student_t_orders.clone(),
    };
    let simulation = config.simulation_config()?;

    let gaussian_constant = constant_loss(n, weight, &recoveries, CopulaPolicy::Gaussian)?;
    let student_constant = constant_loss(n, weight, &recoveries, student_t.clone())?;
    let gaussian_spot = spot_loss(config, n, weight, &recoveries, CopulaPolicy::Gaussian)?;
    let student_spot = spot_loss(config, n, weight, &recoveries, student_t)?;

    let bc = &config.base_correlation;
    let tenors = bc
        .tenor_months
        .iter()
        .map(|&months| scenario.basket.tenor(months))
        .collect::<std::result::Result<Vec<f64>, _>>()?;
    let rows: Vec<&[f64]> = bc.correlations.iter().map(Vec::as_slice).collect();
    let surface = BaseCorrelationSurface::new(&tenors, &bc.loss_levels, &rows, bc.extrapolation)?;

    let models: Vec<Box<dyn DefaultLossModel>> = vec![
        Box::new(GaussianLhpLossModel::new(config.basket.correlation, recoveries.clone())?),
        Box::new(BinomialLossModel::new(gaussian_constant.clone())),
        Box::new(BinomialLossModel::new(student_constant.clone())),
        Box::new(InhomogeneousPoolLossModel::new(
            gaussian_constant.clone(),
            config.models.loss_buckets,
        )?),
        Box::new(RandomDefaultLossModel::new(gaussian_constant, simulation.clone())?),
        Box::new(RandomDefaultLossModel::new(student_constant, simulation.clone())?),
        Box::new(RandomLossModel::new(gaussian_spot, simulation.clone())?),
        Box::new(RandomLossModel::new(student_spot, simulation)?),
        Box::new(BaseCorrelationLossModel::new(Arc::new(surface), recoveries)?),
    ];
    Ok(models)
}

fn constant_loss(
    n: usize,
    weight: f64,
    recoveries: &[f64],
    copula: CopulaPolicy,
) -> Result<Arc<ConstantLossLatentModel>> {
    let integration = IntegrationConfig::for_copula(&copula);
    Ok(Arc::new(ConstantLossLatentModel::new(
        FactorLoadings::homogeneous(n, weight)?,
        recoveries.to_vec(),
        copula,
        integration,
    )?))
}

// One default and one recovery variable per name; Gauss-Legendre for both copulas.
fn spot_loss(
    config: &RunConfig,
    n: usize,
    weight: f64,
    recoveries: &[f64],
    copula: CopulaPolicy,
) -> Result<Arc<SpotLossLatentModel>> {
    let integration = IntegrationConfig::for_copula(&copula)
        .with_method(LatentModelIntegrationType::GaussianQuadrature);
    Ok(Arc::new(SpotLossLatentModel::new(
        FactorLoadings::homogeneous(2 * n, weight)?,
        recoveries.to_vec(),
        config.models.recovery_dispersion,
        copula,
        integration,
    )?))
}

/// Simulation settings echoed by the `check` command.
pub fn describe_simulation(config: &SimulationConfig) -> String {
    match config.tolerance() {
        Some(tol) => format!(
            "{} trials in batches of {}, seed {}, tolerance {tol:e}",
            config.n_simulations(),
            config.batch_size(),
            config.seed()
        ),
        None => format!(
            "{} trials in batches of {}, seed {}",
            config.n_simulations(),
            config.batch_size(),
            config.seed()
        ),
    }
}
