//! Draws of latent factors and idiosyncratic shocks.

use pricer_models::analytical::distributions::Marginal;
use pricer_models::latent::DefaultLatentModel;
use pricer_models::LossModelError;
use rand_distr::StudentT;

use crate::rng::PricerRng;

/// Sampler of one marginal law.
#[derive(Debug, Clone)]
enum Draw {
    Normal,
    StudentT { dist: StudentT<f64>, scale: f64 },
}

impl Draw {
    fn from_marginal(marginal: &Marginal) -> Result<Self, LossModelError> {
        match marginal.dof() {
            None => Ok(Draw::Normal),
            Some(dof) => {
                let dist = StudentT::new(f64::from(dof))
                    .map_err(|e| LossModelError::InvalidModelParameters(e.to_string()))?;
                Ok(Draw::StudentT {
                    dist,
                    scale: marginal.scale(),
                })
            }
        }
    }

    #[inline]
    fn draw(&self, rng: &mut PricerRng) -> f64 {
        match self {
            Draw::Normal => rng.gen_normal(),
            Draw::StudentT { dist, scale } => scale * rng.sample(dist),
        }
    }
}

/// Samples the variables of a [`DefaultLatentModel`] under its copula.
///
/// Factors are drawn once per trial with [`draw_factors`](Self::draw_factors);
/// each call to [`draw_latent`](Self::draw_latent) then draws a fresh
/// idiosyncratic shock for one variable.
#[derive(Debug, Clone)]
pub struct LatentSampler {
    factors: Vec<Draw>,
    shock: Draw,
}

impl LatentSampler {
    /// Sampler matching the marginals of `latent`.
    pub fn new(latent: &DefaultLatentModel) -> Result<Self, LossModelError> {
        let factors = latent
            .factor_marginals()
            .iter()
            .map(Draw::from_marginal)
            .collect::<Result<Vec<_>, _>>()?;
        let shock = Draw::from_marginal(latent.idiosyncratic_marginal())?;
        Ok(Self { factors, shock })
    }

    /// Number of factors drawn per trial.
    pub fn n_factors(&self) -> usize {
        self.factors.len()
    }

    /// Overwrite `factors` with one draw of the systemic factors.
    pub fn draw_factors(&self, rng: &mut PricerRng, factors: &mut Vec<f64>) {
        factors.clear();
        factors.extend(self.factors.iter().map(|d| d.draw(rng)));
    }

    /// Value of variable `i` given `factors` and a fresh shock.
    #[inline]
    pub fn draw_latent(
        &self,
        latent: &DefaultLatentModel,
        i: usize,
        factors: &[f64],
        rng: &mut PricerRng,
    ) -> f64 {
        latent.latent_value(i, factors, self.shock.draw(rng))
    }
}
