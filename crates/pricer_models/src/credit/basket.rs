//! Tranche-bearing basket of names.

use std::fmt;
use std::sync::Arc;

use pricer_core::market_data::curves::CreditCurve;
use pricer_core::types::{Date, DayCountConvention};
use tracing::{debug, info};

use super::context::{validate_tranche_bounds, LossContext};
use super::pool::Pool;
use crate::loss_models::{DefaultLossModel, LossModelError};

/// Ordered exposures to pool names with a tranche `[attachment, detachment]`.
///
/// The basket owns at most one loss model. Replacing it takes `&mut self`,
/// so a model can never be swapped while an evaluation borrowing the basket
/// is running.
pub struct Basket {
    reference_date: Date,
    names: Vec<String>,
    notionals: Vec<f64>,
    pool: Arc<Pool>,
    attachment: f64,
    detachment: f64,
    day_count: DayCountConvention,
    loss_model: Option<Box<dyn DefaultLossModel>>,
}

impl Basket {
    /// Create a basket on `pool`.
    ///
    /// # Errors
    ///
    /// * `InvalidTrancheBounds` - Unless `0 <= attachment < detachment <= 1`
    /// * `SizeMismatch` - `names` and `notionals` differ in length
    /// * `UnknownName` - A name is not in the pool
    /// * `MissingCurve` - The issuer has no curve for the name's key
    /// * `InvalidModelParameters` - No names, a negative notional or a zero total
    pub fn new(
        reference_date: Date,
        names: Vec<String>,
        notionals: Vec<f64>,
        pool: Arc<Pool>,
        attachment: f64,
        detachment: f64,
    ) -> Result<Self, LossModelError> {
        validate_tranche_bounds(attachment, detachment)?;
        if names.is_empty() {
            return Err(LossModelError::InvalidModelParameters(
                "basket has no names".to_string(),
            ));
        }
        if names.len() != notionals.len() {
            return Err(LossModelError::SizeMismatch {
                expected: names.len(),
                got: notionals.len(),
            });
        }
        for name in &names {
            let issuer = pool
                .get(name)
                .ok_or_else(|| LossModelError::UnknownName(name.clone()))?;
            let key = pool
                .default_key(name)
                .ok_or_else(|| LossModelError::UnknownName(name.clone()))?;
            if issuer.default_probability_curve(key).is_none() {
                return Err(LossModelError::MissingCurve(format!("{name} ({key})")));
            }
        }
        if let Some(n) = notionals.iter().find(|n| !(n.is_finite() && **n >= 0.0)) {
            return Err(LossModelError::InvalidModelParameters(format!(
                "notional must be non-negative, got {n}"
            )));
        }
        if notionals.iter().sum::<f64>() <= 0.0 {
            return Err(LossModelError::InvalidModelParameters(
                "total notional must be positive".to_string(),
            ));
        }

        Ok(Self {
            reference_date,
            names,
            notionals,
            pool,
            attachment,
            detachment,
            day_count: DayCountConvention::default(),
            loss_model: None,
        })
    }

    /// Use `day_count` to turn dates into horizons (default ACT/365F).
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Attach `model`, dropping the previous one.
    pub fn set_loss_model(&mut self, model: Box<dyn DefaultLossModel>) {
        info!(
            model = model.name(),
            previous = self.loss_model.as_ref().map(|m| m.name()).unwrap_or("none"),
            "loss model attached"
        );
        self.loss_model = Some(model);
    }

    /// Currently attached loss model.
    pub fn loss_model(&self) -> Option<&dyn DefaultLossModel> {
        self.loss_model.as_deref()
    }

    /// Year fraction of a tenor of `months` from the reference date.
    ///
    /// Measured with the basket's day count, so a tenor of `n` months lands
    /// exactly on the horizon of `loss_context(reference_date + n months)`.
    pub fn tenor(&self, months: i32) -> Result<f64, LossModelError> {
        let end = self.reference_date.add_months(months)?;
        Ok(self.day_count.year_fraction_dates(self.reference_date, end))
    }

    /// Evaluation context at `date`.
    ///
    /// # Errors
    ///
    /// `InvalidModelParameters` when `date` precedes the reference date, or
    /// any curve lookup failure.
    pub fn loss_context(&self, date: Date) -> Result<LossContext, LossModelError> {
        if date < self.reference_date {
            return Err(LossModelError::InvalidModelParameters(format!(
                "horizon {date} precedes reference date {}",
                self.reference_date
            )));
        }
        let horizon = self.day_count.year_fraction_dates(self.reference_date, date);

        let mut probabilities = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let curve = self
                .pool
                .default_key(name)
                .and_then(|key| self.pool.get(name)?.default_probability_curve(key))
                .ok_or_else(|| LossModelError::MissingCurve(name.clone()))?;
            probabilities.push(curve.default_probability(horizon)?);
        }

        debug!(%date, horizon, names = self.names.len(), "basket loss context");
        LossContext::new(
            horizon,
            self.notionals.clone(),
            probabilities,
            self.attachment,
            self.detachment,
        )
    }

    /// Expected tranche loss to `date` in currency units.
    ///
    /// # Errors
    ///
    /// `MissingLossModel` when no model is attached, otherwise whatever the
    /// model reports.
    pub fn expected_tranche_loss(&self, date: Date) -> Result<f64, LossModelError> {
        let model = self.active_model()?;
        let ctx = self.loss_context(date)?;
        model.expected_tranche_loss(&ctx)
    }

    /// Probability that the portfolio loss to `date` exceeds
    /// `loss_fraction` of the total notional.
    pub fn prob_over_loss(&self, date: Date, loss_fraction: f64) -> Result<f64, LossModelError> {
        let model = self.active_model()?;
        let ctx = self.loss_context(date)?;
        model.prob_over_loss(&ctx, loss_fraction)
    }

    /// Portfolio loss amount at confidence `level` to `date`.
    pub fn percentile(&self, date: Date, level: f64) -> Result<f64, LossModelError> {
        let model = self.active_model()?;
        let ctx = self.loss_context(date)?;
        model.percentile(&ctx, level)
    }

    fn active_model(&self) -> Result<&dyn DefaultLossModel, LossModelError> {
        self.loss_model
            .as_deref()
            .ok_or(LossModelError::MissingLossModel)
    }

    /// Reference (valuation) date.
    pub fn reference_date(&self) -> Date {
        self.reference_date
    }

    /// Names in basket order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Notionals in basket order.
    pub fn notionals(&self) -> &[f64] {
        &self.notionals
    }

    /// Number of names.
    pub fn size(&self) -> usize {
        self.names.len()
    }

    /// Attachment fraction.
    pub fn attachment(&self) -> f64 {
        self.attachment
    }

    /// Detachment fraction.
    pub fn detachment(&self) -> f64 {
        self.detachment
    }

    /// Day count used for horizons.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Shared name registry.
    pub fn pool(&self) -> &Arc<Pool> {
        &self.pool
    }
}

impl fmt::Debug for Basket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Basket")
            .field("reference_date", &self.reference_date)
            .field("names", &self.names)
            .field("notionals", &self.notionals)
            .field("attachment", &self.attachment)
            .field("detachment", &self.detachment)
            .field("day_count", &self.day_count)
            .field("loss_model", &self.loss_model.as_ref().map(|m| m.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credit::{DefaultProbKey, Issuer, Seniority};
    use pricer_core::market_data::curves::{FlatHazardRateCurve, SharedCreditCurve};
    use pricer_core::types::Currency;

    #[derive(Debug)]
    struct Fixed(f64);

    impl DefaultLossModel for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn expected_tranche_loss(&self, ctx: &LossContext) -> Result<f64, LossModelError> {
            ctx.validate_tranche()?;
            Ok(self.0)
        }
    }

    fn key() -> DefaultProbKey {
        DefaultProbKey::north_america_corp(Currency::USD, Seniority::SeniorSecured, 0.0)
    }

    fn pool(rates: &[f64]) -> Arc<Pool> {
        let mut pool = Pool::new();
        for (i, &rate) in rates.iter().enumerate() {
            let curve: SharedCreditCurve = Arc::new(FlatHazardRateCurve::new(rate).unwrap());
            pool.add(&format!("N{i}"), Issuer::new(vec![(key(), curve)]), key());
        }
        Arc::new(pool)
    }

    fn today() -> Date {
        Date::from_ymd(2014, 3, 19).unwrap()
    }

    fn basket() -> Basket {
        Basket::new(
            today(),
            vec!["N0".into(), "N1".into()],
            vec![100.0, 50.0],
            pool(&[0.01, 0.02]),
            0.03,
            0.06,
        )
        .unwrap()
    }

    // ===== Construction =====

    #[test]
    fn test_rejects_inverted_tranche() {
        let err = Basket::new(today(), vec!["N0".into()], vec![1.0], pool(&[0.01]), 0.06, 0.03)
            .unwrap_err();
        assert!(matches!(err, LossModelError::InvalidTrancheBounds { .. }));
    }

    #[test]
    fn test_rejects_unknown_name() {
        let err = Basket::new(today(), vec!["X".into()], vec![1.0], pool(&[0.01]), 0.0, 0.1)
            .unwrap_err();
        assert_eq!(err, LossModelError::UnknownName("X".into()));
    }

    #[test]
    fn test_rejects_missing_curve() {
        let mut pool = Pool::new();
        let curve: SharedCreditCurve = Arc::new(FlatHazardRateCurve::new(0.01).unwrap());
        let eur = DefaultProbKey::north_america_corp(Currency::EUR, Seniority::SeniorSecured, 0.0);
        pool.add("N0", Issuer::new(vec![(eur, curve)]), key());
        let err = Basket::new(today(), vec!["N0".into()], vec![1.0], Arc::new(pool), 0.0, 0.1)
            .unwrap_err();
        assert!(matches!(err, LossModelError::MissingCurve(_)));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = Basket::new(today(), vec!["N0".into()], vec![1.0, 2.0], pool(&[0.01]), 0.0, 0.1)
            .unwrap_err();
        assert_eq!(err, LossModelError::SizeMismatch { expected: 1, got: 2 });
    }

    // ===== Evaluation =====

    #[test]
    fn test_missing_loss_model() {
        let b = basket();
        assert_eq!(
            b.expected_tranche_loss(today().add_months(60).unwrap()),
            Err(LossModelError::MissingLossModel)
        );
    }

    #[test]
    fn test_loss_context_probabilities() {
        let b = basket();
        let ctx = b.loss_context(today().add_years(1).unwrap()).unwrap();
        assert!((ctx.horizon() - 1.0).abs() < 1e-12);
        let expected = 1.0 - (-0.02 * ctx.horizon()).exp();
        assert!((ctx.default_probabilities()[1] - expected).abs() < 1e-15);
        assert_eq!(ctx.total_notional(), 150.0);
    }

    #[test]
    fn test_date_before_reference_fails() {
        let b = basket();
        let past = Date::from_ymd(2013, 1, 1).unwrap();
        assert!(matches!(
            b.loss_context(past),
            Err(LossModelError::InvalidModelParameters(_))
        ));
    }

    #[test]
    fn test_swap_loss_model() {
        let mut b = basket();
        let date = today().add_months(60).unwrap();
        b.set_loss_model(Box::new(Fixed(1.5)));
        assert_eq!(b.expected_tranche_loss(date), Ok(1.5));
        b.set_loss_model(Box::new(Fixed(2.5)));
        assert_eq!(b.expected_tranche_loss(date), Ok(2.5));
        assert_eq!(b.loss_model().map(|m| m.name()), Some("fixed"));
    }

    #[test]
    fn test_default_queries_unsupported() {
        let mut b = basket();
        b.set_loss_model(Box::new(Fixed(1.0)));
        let date = today().add_months(12).unwrap();
        assert!(matches!(
            b.prob_over_loss(date, 0.1),
            Err(LossModelError::Unsupported(_))
        ));
        assert!(matches!(b.percentile(date, 0.9), Err(LossModelError::Unsupported(_))));
    }

    #[test]
    fn test_day_count_override() {
        let b = basket().with_day_count(DayCountConvention::Actual360);
        let ctx = b.loss_context(Date::from_ymd(2014, 9, 15).unwrap()).unwrap();
        assert!((ctx.horizon() - 180.0 / 360.0).abs() < 1e-12);
    }

    #[test]
    fn test_tenor_matches_horizon() {
        let b = basket();
        let horizon = b.loss_context(today().add_months(60).unwrap()).unwrap().horizon();
        assert_eq!(b.tenor(60).unwrap(), horizon);
        assert!(b.tenor(60).unwrap() > 5.0);
        assert_eq!(b.tenor(0).unwrap(), 0.0);
    }
}
