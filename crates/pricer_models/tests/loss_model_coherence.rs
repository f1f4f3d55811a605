//! Cross-model checks on the ten-name reference basket.
//!
//! Ten names with flat hazard rates 0.1%, 1%, ..., 9%, notional 100,
//! recovery 40%, a single factor loading of sqrt(5%) and a 3%-6% tranche
//! evaluated five years after 19 March 2014.

use std::sync::Arc;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use pricer_core::market_data::curves::{FlatHazardRateCurve, SharedCreditCurve};
use pricer_core::market_data::surfaces::{BaseCorrelationSurface, SurfaceExtrapolation};
use pricer_core::types::{Currency, Date};
use pricer_models::credit::{Basket, DefaultProbKey, Issuer, LossContext, Pool, Seniority};
use pricer_models::latent::{ConstantLossLatentModel, CopulaPolicy, FactorLoadings, IntegrationConfig};
use pricer_models::loss_models::{
    BaseCorrelationLossModel, BinomialLossModel, DefaultLossModel, GaussianLhpLossModel,
    InhomogeneousPoolLossModel,
};
use pricer_models::LossModelError;

const CORRELATION: f64 = 0.05;
const RECOVERY: f64 = 0.4;

fn hazard_rates() -> Vec<f64> {
    let mut rates = vec![0.001];
    rates.extend((1..10).map(|i| 0.01 * i as f64));
    rates
}

fn today() -> Date {
    Date::from_ymd(2014, 3, 19).unwrap()
}

fn horizon() -> Date {
    today().add_months(60).unwrap()
}

fn basket(attachment: f64, detachment: f64) -> Basket {
    let key = DefaultProbKey::north_america_corp(Currency::EUR, Seniority::SeniorSecured, 0.0);
    let mut pool = Pool::new();
    let mut names = Vec::new();
    for (i, rate) in hazard_rates().into_iter().enumerate() {
        let curve: SharedCreditCurve = Arc::new(FlatHazardRateCurve::new(rate).unwrap());
        let name = format!("Acme{i}");
        pool.add(&name, Issuer::new(vec![(key.clone(), curve)]), key.clone());
        names.push(name);
    }
    Basket::new(today(), names, vec![100.0; 10], Arc::new(pool), attachment, detachment).unwrap()
}

fn constant_loss(copula: CopulaPolicy) -> Arc<ConstantLossLatentModel> {
    let integration = IntegrationConfig::for_copula(&copula);
    Arc::new(
        ConstantLossLatentModel::new(
            FactorLoadings::homogeneous(10, CORRELATION.sqrt()).unwrap(),
            vec![RECOVERY; 10],
            copula,
            integration,
        )
        .unwrap(),
    )
}

fn student_t() -> CopulaPolicy {
    CopulaPolicy::StudentT { orders: vec![3, 3] }
}

fn flat_surface(policy: SurfaceExtrapolation) -> Arc<BaseCorrelationSurface<f64>> {
    let row = [CORRELATION, CORRELATION];
    Arc::new(
        BaseCorrelationSurface::new(&[1.0, 5.0], &[0.03, 0.12], &[&row[..], &row[..]], policy)
            .unwrap(),
    )
}

fn all_models() -> Vec<Box<dyn DefaultLossModel>> {
    vec![
        Box::new(GaussianLhpLossModel::new(CORRELATION, vec![RECOVERY; 10]).unwrap()),
        Box::new(BinomialLossModel::new(constant_loss(CopulaPolicy::Gaussian))),
        Box::new(BinomialLossModel::new(constant_loss(student_t()))),
        Box::new(InhomogeneousPoolLossModel::new(constant_loss(CopulaPolicy::Gaussian), 100).unwrap()),
        Box::new(
            BaseCorrelationLossModel::new(
                flat_surface(SurfaceExtrapolation::Flat),
                vec![RECOVERY; 10],
            )
            .unwrap(),
        ),
    ]
}

fn evaluate(basket: &mut Basket, model: Box<dyn DefaultLossModel>) -> f64 {
    basket.set_loss_model(model);
    basket.expected_tranche_loss(horizon()).unwrap()
}

// ===== Cross-model coherence =====

#[test]
fn test_reference_scenario_models_agree() {
    let mut b = basket(0.03, 0.06);
    let binomial = evaluate(&mut b, Box::new(BinomialLossModel::new(constant_loss(CopulaPolicy::Gaussian))));

    for model in all_models() {
        let name = model.name().to_string();
        let value = evaluate(&mut b, model);
        assert!(value > 0.0 && value <= 30.0, "{name}: {value}");
        assert!(
            (value / binomial - 1.0).abs() < 0.15,
            "{name} = {value} outside 15% of Gaussian binomial {binomial}"
        );
    }
}

#[test]
fn test_reference_scenario_levels() {
    let mut b = basket(0.03, 0.06);
    let lhp = evaluate(&mut b, Box::new(GaussianLhpLossModel::new(CORRELATION, vec![RECOVERY; 10]).unwrap()));
    let binomial = evaluate(&mut b, Box::new(BinomialLossModel::new(constant_loss(CopulaPolicy::Gaussian))));
    let student = evaluate(&mut b, Box::new(BinomialLossModel::new(constant_loss(student_t()))));

    // Any single default wipes out the 30-unit tranche, so the finite pool
    // sits below the infinitely granular one
    assert_abs_diff_eq!(lhp, 29.63, epsilon = 0.05);
    assert_abs_diff_eq!(binomial, 26.11, epsilon = 0.05);
    assert_abs_diff_eq!(student, 25.92, epsilon = 0.1);
    assert!(lhp > binomial);
}

#[test]
fn test_binomial_and_inhomogeneous_agree_on_uniform_pool() {
    let mut b = basket(0.03, 0.06);
    let binomial = evaluate(&mut b, Box::new(BinomialLossModel::new(constant_loss(CopulaPolicy::Gaussian))));
    let inhomogeneous = evaluate(
        &mut b,
        Box::new(InhomogeneousPoolLossModel::new(constant_loss(CopulaPolicy::Gaussian), 100).unwrap()),
    );
    assert_relative_eq!(binomial, inhomogeneous, max_relative = 1e-10);
}

#[test]
fn test_flat_base_correlation_reproduces_lhp() {
    for (a, d) in [(0.03, 0.06), (0.0, 0.03), (0.06, 0.12)] {
        let mut b = basket(a, d);
        let lhp = evaluate(&mut b, Box::new(GaussianLhpLossModel::new(CORRELATION, vec![RECOVERY; 10]).unwrap()));
        let bc = evaluate(
            &mut b,
            Box::new(
                BaseCorrelationLossModel::new(flat_surface(SurfaceExtrapolation::Flat), vec![RECOVERY; 10])
                    .unwrap(),
            ),
        );
        assert_eq!(lhp, bc, "tranche [{a}, {d}]");
    }
}

// ===== Degenerate and invalid tranches =====

#[test]
fn test_whole_pool_tranche_is_expected_loss() {
    let mut b = basket(0.0, 1.0);
    let ctx = b.loss_context(horizon()).unwrap();
    let expected: f64 = ctx
        .default_probabilities()
        .iter()
        .map(|p| 100.0 * (1.0 - RECOVERY) * p)
        .sum();

    for model in all_models() {
        let name = model.name().to_string();
        let value = evaluate(&mut b, model);
        assert!((value - expected).abs() < 1e-7, "{name}: {value} vs {expected}");
    }
}

#[test]
fn test_inverted_tranche_rejected_by_every_model() {
    let ctx = basket(0.03, 0.06)
        .loss_context(horizon())
        .unwrap()
        .with_tranche(0.06, 0.03);
    for model in all_models() {
        assert!(
            matches!(
                model.expected_tranche_loss(&ctx),
                Err(LossModelError::InvalidTrancheBounds { .. })
            ),
            "{}",
            model.name()
        );
    }
}

#[test]
fn test_tranche_outside_unit_interval_rejected() {
    let ctx = LossContext::new(5.0, vec![100.0; 10], vec![0.1; 10], 0.5, 1.2).unwrap();
    for model in all_models() {
        assert!(model.expected_tranche_loss(&ctx).is_err(), "{}", model.name());
    }
}

// ===== Base-correlation grid policy =====

#[test]
fn test_base_correlation_error_policy() {
    let mut b = basket(0.03, 0.2);
    b.set_loss_model(Box::new(
        BaseCorrelationLossModel::new(flat_surface(SurfaceExtrapolation::Error), vec![RECOVERY; 10]).unwrap(),
    ));
    assert!(matches!(
        b.expected_tranche_loss(horizon()),
        Err(LossModelError::OutOfGridRange { .. })
    ));
}

// ===== Loss distribution queries =====

#[test]
fn test_tail_queries_consistent_across_semi_analytic_models() {
    let mut b = basket(0.03, 0.06);
    for model in [
        Box::new(BinomialLossModel::new(constant_loss(CopulaPolicy::Gaussian))) as Box<dyn DefaultLossModel>,
        Box::new(InhomogeneousPoolLossModel::new(constant_loss(CopulaPolicy::Gaussian), 100).unwrap()),
    ] {
        b.set_loss_model(model);
        let q = b.percentile(horizon(), 0.99).unwrap();
        let tail = b.prob_over_loss(horizon(), q / 1000.0).unwrap();
        assert!(tail <= 0.01 + 1e-7);
        assert!(q > 0.0 && q <= 600.0);
    }
}
