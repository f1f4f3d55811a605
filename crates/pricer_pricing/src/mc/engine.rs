//! Batched, reproducible trial engine.

use rayon::prelude::*;
use tracing::debug;

use pricer_models::credit::LossContext;
use pricer_models::LossModelError;

use super::config::SimulationConfig;
use crate::rng::{derive_stream_seed, PricerRng};

/// Batches executed in parallel between two convergence checks.
pub const ROUND_BATCHES: usize = 8;

/// Outcome of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Sample mean of the tranche loss.
    pub mean: f64,
    /// Standard error of `mean`.
    pub std_error: f64,
    /// Trials actually run.
    pub n_trials: usize,
    /// False when a tolerance was set and `std_error` still exceeds it.
    pub converged: bool,
    /// Portfolio loss of every trial in trial order.
    pub portfolio_losses: Vec<f64>,
}

/// Run trials of `trial` and collect tranche-loss statistics.
///
/// `trial` draws one portfolio loss from the stream it is given; its second
/// argument is a scratch buffer reused across the trials of a batch. Batch
/// `b` draws from `derive_stream_seed(config.seed(), b)` and batches run in
/// rounds of [`ROUND_BATCHES`]; results are reduced in batch order, so the
/// outcome depends only on the configuration.
///
/// # Errors
///
/// `InvalidTrancheBounds` when the context's tranche is invalid.
///
/// # Examples
///
/// ```rust
/// use pricer_models::credit::LossContext;
/// use pricer_pricing::mc::{engine::run_simulation, SimulationConfig};
///
/// let ctx = LossContext::new(1.0, vec![100.0], vec![0.5], 0.0, 1.0).unwrap();
/// let config = SimulationConfig::builder().n_simulations(4_000).build().unwrap();
///
/// let result = run_simulation(&config, &ctx, |rng, _| {
///     if rng.gen_uniform() < 0.5 { 100.0 } else { 0.0 }
/// })
/// .unwrap();
/// assert_eq!(result.n_trials, 4_000);
/// assert!((result.mean - 50.0).abs() < 4.0 * result.std_error);
/// ```
pub fn run_simulation<F>(
    config: &SimulationConfig,
    ctx: &LossContext,
    trial: F,
) -> Result<SimulationResult, LossModelError>
where
    F: Fn(&mut PricerRng, &mut Vec<f64>) -> f64 + Sync,
{
    ctx.validate_tranche()?;

    let n_batches = config.n_batches();
    let mut portfolio_losses = Vec::with_capacity(config.n_simulations());
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut next = 0;

    while next < n_batches {
        let end = (next + ROUND_BATCHES).min(n_batches);
        let round: Vec<Vec<f64>> = (next..end)
            .into_par_iter()
            .map(|b| {
                let mut rng = PricerRng::from_seed(derive_stream_seed(config.seed(), b as u64));
                let mut scratch = Vec::new();
                (0..config.batch_len(b))
                    .map(|_| trial(&mut rng, &mut scratch))
                    .collect()
            })
            .collect();
        next = end;

        for loss in round.into_iter().flatten() {
            let tranche = ctx.tranche_loss(loss);
            sum += tranche;
            sum_sq += tranche * tranche;
            portfolio_losses.push(loss);
        }

        if let Some(tolerance) = config.tolerance() {
            let n = portfolio_losses.len();
            let std_error = standard_error(sum, sum_sq, n);
            if next < n_batches && n >= config.min_simulations() && std_error <= tolerance {
                debug!(trials = n, std_error, tolerance, "simulation converged early");
                break;
            }
        }
    }

    let n_trials = portfolio_losses.len();
    let std_error = standard_error(sum, sum_sq, n_trials);
    let converged = config.tolerance().map_or(true, |tolerance| std_error <= tolerance);
    if !converged {
        debug!(
            trials = n_trials,
            std_error,
            tolerance = config.tolerance(),
            "tolerance not reached, returning full-run estimate"
        );
    }
    Ok(SimulationResult {
        mean: sum / n_trials as f64,
        std_error,
        n_trials,
        converged,
        portfolio_losses,
    })
}

fn standard_error(sum: f64, sum_sq: f64, n: usize) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let n = n as f64;
    let mean = sum / n;
    let variance = ((sum_sq - n * mean * mean) / (n - 1.0)).max(0.0);
    (variance / n).sqrt()
}
