//! Large homogeneous pool (Vasicek) loss model.

use pricer_core::math::quadrature::{QuadratureGrid, QuadratureRule};
use tracing::debug;

use super::{validate_level, DefaultLossModel, LossModelError};
use crate::analytical::{norm_cdf, norm_inv_cdf, norm_pdf};
use crate::credit::LossContext;
use crate::latent::validate_recoveries;

/// Gauss-Legendre nodes per half of the factor integral.
const LHP_NODES: usize = 96;

/// Factor truncation; the neglected mass is below 1e-23.
const FACTOR_BOUND: f64 = 10.0;

/// Correlations within this distance of 0 or 1 use the degenerate limits.
const CORRELATION_EPS: f64 = 1e-12;

/// Gaussian one-factor model on an infinitely granular homogeneous pool.
///
/// The pool is summarised by its loss-weighted average default probability
/// `p` and its average loss given default `lgd`, so the expected portfolio
/// loss matches the finite pool exactly. Given the factor `M`, the loss
/// fraction is `L(M) = lgd Φ((Φ⁻¹(p) - sqrt(ρ) M) / sqrt(1 - ρ))`.
///
/// # Examples
/// ```
/// use pricer_models::credit::LossContext;
/// use pricer_models::loss_models::{DefaultLossModel, GaussianLhpLossModel};
///
/// let model = GaussianLhpLossModel::new(0.3, vec![0.4; 2]).unwrap();
/// let ctx = LossContext::new(5.0, vec![50.0, 50.0], vec![0.1, 0.1], 0.0, 1.0).unwrap();
///
/// // Whole-pool tranche: the expected loss 100 * 0.6 * 0.1
/// let el = model.expected_tranche_loss(&ctx).unwrap();
/// assert!((el - 6.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct GaussianLhpLossModel {
    correlation: f64,
    recoveries: Vec<f64>,
    unit_rule: QuadratureGrid,
}

impl GaussianLhpLossModel {
    /// Model with asset correlation `correlation` (the squared factor loading).
    ///
    /// # Errors
    ///
    /// `InvalidModelParameters` for a correlation outside [0, 1] or a
    /// recovery outside [0, 1].
    pub fn new(correlation: f64, recoveries: Vec<f64>) -> Result<Self, LossModelError> {
        if !(0.0..=1.0).contains(&correlation) {
            return Err(LossModelError::InvalidModelParameters(format!(
                "correlation {correlation} not in [0, 1]"
            )));
        }
        validate_recoveries(&recoveries)?;
        let unit_rule = QuadratureGrid::new(QuadratureRule::GaussLegendre, LHP_NODES, -1.0, 1.0)?;
        Ok(Self {
            correlation,
            recoveries,
            unit_rule,
        })
    }

    /// Same recoveries at another correlation.
    pub fn with_correlation(&self, correlation: f64) -> Result<Self, LossModelError> {
        if !(0.0..=1.0).contains(&correlation) {
            return Err(LossModelError::InvalidModelParameters(format!(
                "correlation {correlation} not in [0, 1]"
            )));
        }
        Ok(Self {
            correlation,
            ..self.clone()
        })
    }

    /// Asset correlation.
    pub fn correlation(&self) -> f64 {
        self.correlation
    }

    /// Per-name recoveries.
    pub fn recoveries(&self) -> &[f64] {
        &self.recoveries
    }

    fn pool(&self, ctx: &LossContext) -> Result<LhpPool<'_>, LossModelError> {
        if ctx.size() != self.recoveries.len() {
            return Err(LossModelError::SizeMismatch {
                expected: self.recoveries.len(),
                got: ctx.size(),
            });
        }
        let total = ctx.total_notional();
        let losses: Vec<f64> = ctx
            .notionals()
            .iter()
            .zip(&self.recoveries)
            .map(|(n, r)| n * (1.0 - r))
            .collect();
        let total_lgd: f64 = losses.iter().sum();

        // Weight by loss given default; fall back to notionals when nothing can be lost
        let weights = if total_lgd > 0.0 { &losses[..] } else { ctx.notionals() };
        let weight_sum: f64 = weights.iter().sum();
        let probability = weights
            .iter()
            .zip(ctx.default_probabilities())
            .map(|(w, p)| w * p)
            .sum::<f64>()
            / weight_sum;

        Ok(LhpPool {
            probability: probability.clamp(0.0, 1.0),
            lgd: total_lgd / total,
            correlation: self.correlation,
            unit_rule: &self.unit_rule,
        })
    }
}

impl DefaultLossModel for GaussianLhpLossModel {
    fn name(&self) -> &str {
        "Gaussian LHP"
    }

    fn expected_tranche_loss(&self, ctx: &LossContext) -> Result<f64, LossModelError> {
        ctx.validate_tranche()?;
        let pool = self.pool(ctx)?;
        debug!(
            probability = pool.probability,
            lgd = pool.lgd,
            correlation = pool.correlation,
            "LHP pool"
        );
        let tranche = pool.call_on_loss(ctx.attachment()) - pool.call_on_loss(ctx.detachment());
        Ok(ctx.total_notional() * tranche.max(0.0))
    }

    fn prob_over_loss(&self, ctx: &LossContext, loss_fraction: f64) -> Result<f64, LossModelError> {
        Ok(self.pool(ctx)?.prob_over(loss_fraction))
    }

    fn percentile(&self, ctx: &LossContext, level: f64) -> Result<f64, LossModelError> {
        validate_level(level)?;
        Ok(ctx.total_notional() * self.pool(ctx)?.quantile(level))
    }
}

/// Homogeneous pool summary; all losses are fractions of total notional.
struct LhpPool<'a> {
    probability: f64,
    lgd: f64,
    correlation: f64,
    unit_rule: &'a QuadratureGrid,
}

impl LhpPool<'_> {
    /// Factor level below which the loss fraction exceeds `x`.
    fn crossing(&self, x: f64) -> f64 {
        let c = norm_inv_cdf(self.probability);
        (c - (1.0 - self.correlation).sqrt() * norm_inv_cdf(x / self.lgd)) / self.correlation.sqrt()
    }

    fn conditional_loss(&self, m: f64) -> f64 {
        let c = norm_inv_cdf(self.probability);
        self.lgd
            * norm_cdf((c - self.correlation.sqrt() * m) / (1.0 - self.correlation).sqrt())
    }

    /// `∫_a^b f` on the mapped unit Gauss-Legendre rule.
    fn integrate<F: Fn(f64) -> f64>(&self, a: f64, b: f64, f: F) -> f64 {
        let half = 0.5 * (b - a);
        let mid = 0.5 * (b + a);
        half * self.unit_rule.integrate(|x| f(mid + half * x))
    }

    /// `E[(L - k)⁺]`.
    fn call_on_loss(&self, k: f64) -> f64 {
        let (p, lgd, rho) = (self.probability, self.lgd, self.correlation);
        if p <= 0.0 || lgd <= 0.0 {
            return 0.0;
        }
        if k <= 0.0 {
            return lgd * p - k;
        }
        if k >= lgd {
            return 0.0;
        }
        if p >= 1.0 {
            return lgd - k;
        }
        if rho < CORRELATION_EPS {
            return (lgd * p - k).max(0.0);
        }
        if rho > 1.0 - CORRELATION_EPS {
            return p * (lgd - k);
        }

        // L(m) > k exactly for m < m*, so E[(L - k)⁺] = ∫_{-∞}^{m*} L φ - k Φ(m*)
        let m_star = self.crossing(k);
        let upper = m_star.min(FACTOR_BOUND);
        if upper <= -FACTOR_BOUND {
            return 0.0;
        }
        let integrand = |m: f64| self.conditional_loss(m) * norm_pdf(m);

        // Split at the steepest point of L when it falls inside
        let knee = norm_inv_cdf(p) / rho.sqrt();
        let integral = if knee > -FACTOR_BOUND && knee < upper {
            self.integrate(-FACTOR_BOUND, knee, integrand) + self.integrate(knee, upper, integrand)
        } else {
            self.integrate(-FACTOR_BOUND, upper, integrand)
        };
        (integral - k * norm_cdf(m_star)).max(0.0)
    }

    /// `P(L > x)`.
    fn prob_over(&self, x: f64) -> f64 {
        let (p, lgd, rho) = (self.probability, self.lgd, self.correlation);
        if x < 0.0 {
            return 1.0;
        }
        if p <= 0.0 || lgd <= 0.0 || x >= lgd {
            return 0.0;
        }
        if p >= 1.0 {
            return 1.0;
        }
        if rho < CORRELATION_EPS {
            return if lgd * p > x { 1.0 } else { 0.0 };
        }
        if rho > 1.0 - CORRELATION_EPS {
            return p;
        }
        norm_cdf(self.crossing(x))
    }

    /// Loss fraction at confidence `level`.
    fn quantile(&self, level: f64) -> f64 {
        let (p, lgd, rho) = (self.probability, self.lgd, self.correlation);
        if p <= 0.0 || lgd <= 0.0 {
            return 0.0;
        }
        if p >= 1.0 {
            return lgd;
        }
        if rho < CORRELATION_EPS {
            return lgd * p;
        }
        if rho > 1.0 - CORRELATION_EPS {
            return if level <= 1.0 - p { 0.0 } else { lgd };
        }
        // L is decreasing in the factor
        self.conditional_loss(norm_inv_cdf(1.0 - level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    fn context(p: f64, attachment: f64, detachment: f64) -> LossContext {
        LossContext::new(5.0, vec![100.0; 10], vec![p; 10], attachment, detachment).unwrap()
    }

    fn model(rho: f64) -> GaussianLhpLossModel {
        GaussianLhpLossModel::new(rho, vec![0.4; 10]).unwrap()
    }

    /// Tranche loss by brute-force integration of the conditional tranche payoff.
    fn brute_force(rho: f64, p: f64, a: f64, d: f64) -> f64 {
        let grid = QuadratureGrid::new(QuadratureRule::Trapezoid, 200_001, -10.0, 10.0).unwrap();
        let c = norm_inv_cdf(p);
        grid.integrate(|m| {
            let l = 0.6 * norm_cdf((c - rho.sqrt() * m) / (1.0 - rho).sqrt());
            ((l.min(d) - a).max(0.0)) * norm_pdf(m)
        }) * 1000.0
    }

    // ===== Construction =====

    #[test]
    fn test_rejects_correlation_out_of_range() {
        assert!(GaussianLhpLossModel::new(1.2, vec![0.4]).is_err());
        assert!(GaussianLhpLossModel::new(-0.1, vec![0.4]).is_err());
        assert!(model(0.3).with_correlation(f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_inverted_tranche_first() {
        let ctx = LossContext::new(5.0, vec![1.0; 3], vec![0.1; 3], 0.06, 0.03).unwrap();
        // Recovery count is also wrong, but the tranche is checked first
        assert!(matches!(
            model(0.3).expected_tranche_loss(&ctx),
            Err(LossModelError::InvalidTrancheBounds { .. })
        ));
    }

    // ===== Tranche loss =====

    #[test]
    fn test_matches_brute_force() {
        for (rho, p, a, d) in [
            (0.05, 0.19, 0.03, 0.06),
            (0.3, 0.05, 0.0, 0.03),
            (0.6, 0.02, 0.07, 0.10),
        ] {
            let ctx = context(p, a, d);
            let value = model(rho).expected_tranche_loss(&ctx).unwrap();
            assert_relative_eq!(value, brute_force(rho, p, a, d), max_relative = 1e-7);
        }
    }

    #[test]
    fn test_whole_pool_is_expected_loss() {
        let ctx = context(0.15, 0.0, 1.0);
        let value = model(0.4).expected_tranche_loss(&ctx).unwrap();
        assert_abs_diff_eq!(value, 1000.0 * 0.6 * 0.15, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_correlation_is_deterministic_loss() {
        // L = 0.6 * 0.1 = 6% of 1000 = 60, tranche [30, 50] fully hit
        let ctx = context(0.1, 0.03, 0.05);
        assert_abs_diff_eq!(
            model(0.0).expected_tranche_loss(&ctx).unwrap(),
            20.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_full_correlation_is_all_or_nothing() {
        let ctx = context(0.1, 0.03, 0.06);
        assert_abs_diff_eq!(
            model(1.0).expected_tranche_loss(&ctx).unwrap(),
            0.1 * 30.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_senior_tranche_above_max_loss() {
        let ctx = context(0.2, 0.7, 1.0);
        assert_eq!(model(0.3).expected_tranche_loss(&ctx).unwrap(), 0.0);
    }

    #[test]
    fn test_tranches_add_up() {
        let m = model(0.25);
        let lower = m.expected_tranche_loss(&context(0.1, 0.0, 0.05)).unwrap();
        let upper = m.expected_tranche_loss(&context(0.1, 0.05, 1.0)).unwrap();
        let whole = m.expected_tranche_loss(&context(0.1, 0.0, 1.0)).unwrap();
        assert_abs_diff_eq!(lower + upper, whole, epsilon = 1e-10);
    }

    // ===== Distribution queries =====

    #[test]
    fn test_prob_over_loss_and_percentile_are_inverse() {
        let m = model(0.2);
        let ctx = context(0.08, 0.0, 1.0);
        let q = m.percentile(&ctx, 0.99).unwrap();
        let tail = m.prob_over_loss(&ctx, q / 1000.0).unwrap();
        assert_abs_diff_eq!(tail, 0.01, epsilon = 1e-10);
    }

    #[test]
    fn test_prob_over_loss_edges() {
        let m = model(0.2);
        let ctx = context(0.08, 0.0, 1.0);
        assert_eq!(m.prob_over_loss(&ctx, -0.1).unwrap(), 1.0);
        assert_eq!(m.prob_over_loss(&ctx, 0.6).unwrap(), 0.0);
        assert_abs_diff_eq!(m.prob_over_loss(&ctx, 0.0).unwrap(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_percentile_level_checked() {
        let ctx = context(0.08, 0.0, 1.0);
        assert!(matches!(
            model(0.2).percentile(&ctx, 1.1),
            Err(LossModelError::InvalidModelParameters(_))
        ));
        assert_eq!(model(0.2).percentile(&ctx, 0.0).unwrap(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_monotone_in_default_probability(
            rho in 0.01f64..0.95,
            p in 0.001f64..0.5,
            dp in 0.001f64..0.3,
            a in 0.0f64..0.2,
            width in 0.01f64..0.3,
        ) {
            let m = model(rho);
            let low = m.expected_tranche_loss(&context(p, a, a + width)).unwrap();
            let high = m.expected_tranche_loss(&context(p + dp, a, a + width)).unwrap();
            prop_assert!(high >= low - 1e-9, "low {} high {}", low, high);
        }

        #[test]
        fn prop_tranche_loss_bounded_by_width(
            rho in 0.0f64..1.0,
            p in 0.0f64..1.0,
            a in 0.0f64..0.5,
            width in 0.01f64..0.5,
        ) {
            let value = model(rho).expected_tranche_loss(&context(p, a, a + width)).unwrap();
            prop_assert!(value >= 0.0);
            prop_assert!(value <= 1000.0 * width + 1e-9);
        }
    }
}
