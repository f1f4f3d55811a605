//! Issuers and the keys that select their default-probability curves.

use std::fmt;

use pricer_core::market_data::curves::SharedCreditCurve;
use pricer_core::types::Currency;

/// Debt seniority of the reference obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Seniority {
    /// Senior secured debt.
    #[default]
    SeniorSecured,
    /// Senior unsecured debt.
    SeniorUnsecured,
    /// Subordinated debt.
    Subordinated,
}

/// Restructuring clause of the credit event definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Restructuring {
    /// No restructuring.
    #[default]
    NoRestructuring,
    /// Modified restructuring.
    Modified,
    /// Modified-modified restructuring.
    ModifiedModified,
    /// Full (old) restructuring.
    Full,
}

/// Credit key identifying one default-probability curve of an issuer.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultProbKey {
    /// Currency of the reference obligations
    pub currency: Currency,
    /// Seniority of the reference obligations
    pub seniority: Seniority,
    /// Restructuring clause
    pub restructuring: Restructuring,
    /// Minimum amount for a failure to pay to count as a credit event
    pub amount_threshold: f64,
}

impl DefaultProbKey {
    /// Key with an explicit restructuring clause.
    pub fn new(
        currency: Currency,
        seniority: Seniority,
        restructuring: Restructuring,
        amount_threshold: f64,
    ) -> Self {
        Self {
            currency,
            seniority,
            restructuring,
            amount_threshold,
        }
    }

    /// North American corporate convention: no restructuring.
    pub fn north_america_corp(currency: Currency, seniority: Seniority, amount_threshold: f64) -> Self {
        Self::new(
            currency,
            seniority,
            Restructuring::NoRestructuring,
            amount_threshold,
        )
    }
}

impl fmt::Display for DefaultProbKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{:?}/{:?}/{}",
            self.currency, self.seniority, self.restructuring, self.amount_threshold
        )
    }
}

/// Reference entity holding one curve per credit key.
#[derive(Clone)]
pub struct Issuer {
    curves: Vec<(DefaultProbKey, SharedCreditCurve)>,
}

impl Issuer {
    /// Create an issuer from its keyed curves. A repeated key keeps the first curve.
    pub fn new(curves: Vec<(DefaultProbKey, SharedCreditCurve)>) -> Self {
        Self { curves }
    }

    /// Curve registered under `key`.
    pub fn default_probability_curve(&self, key: &DefaultProbKey) -> Option<&SharedCreditCurve> {
        self.curves
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, curve)| curve)
    }

    /// Registered keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &DefaultProbKey> {
        self.curves.iter().map(|(k, _)| k)
    }
}

impl fmt::Debug for Issuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Issuer")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_core::market_data::curves::{CreditCurve, FlatHazardRateCurve};
    use std::sync::Arc;

    fn curve(rate: f64) -> SharedCreditCurve {
        Arc::new(FlatHazardRateCurve::new(rate).unwrap())
    }

    #[test]
    fn test_lookup_by_key() {
        let usd = DefaultProbKey::north_america_corp(Currency::USD, Seniority::SeniorSecured, 0.0);
        let eur = DefaultProbKey::north_america_corp(Currency::EUR, Seniority::SeniorSecured, 0.0);
        let issuer = Issuer::new(vec![(usd.clone(), curve(0.01)), (eur.clone(), curve(0.02))]);

        let pd = issuer
            .default_probability_curve(&eur)
            .unwrap()
            .default_probability(1.0)
            .unwrap();
        assert!((pd - (1.0 - (-0.02_f64).exp())).abs() < 1e-15);
    }

    #[test]
    fn test_missing_key() {
        let usd = DefaultProbKey::north_america_corp(Currency::USD, Seniority::SeniorSecured, 0.0);
        let sub = DefaultProbKey::north_america_corp(Currency::USD, Seniority::Subordinated, 0.0);
        let issuer = Issuer::new(vec![(usd, curve(0.01))]);
        assert!(issuer.default_probability_curve(&sub).is_none());
    }

    #[test]
    fn test_key_display() {
        let key = DefaultProbKey::north_america_corp(Currency::GBP, Seniority::SeniorUnsecured, 0.0);
        assert_eq!(key.to_string(), "GBP/SeniorUnsecured/NoRestructuring/0");
    }
}
