//! # Pricer Models (L2: Business Logic)
//!
//! Credit baskets and the loss models that price their tranches.
//!
//! This crate provides:
//! - Issuers, the name registry (`Pool`) and tranche-bearing `Basket`s
//! - Latent factor models under Gaussian and Student-t copulas
//! - Semi-analytic loss models: large homogeneous pool, binomial,
//!   inhomogeneous bucketed convolution and base correlation
//! - Standard normal and Student-t marginals
//!
//! Monte-Carlo loss models live one layer up in `pricer_pricing` and plug
//! into a basket through the same [`loss_models::DefaultLossModel`] trait.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use pricer_core::market_data::curves::{FlatHazardRateCurve, SharedCreditCurve};
//! use pricer_core::types::{Currency, Date};
//! use pricer_models::credit::{Basket, DefaultProbKey, Issuer, Pool, Seniority};
//! use pricer_models::loss_models::GaussianLhpLossModel;
//!
//! let key = DefaultProbKey::north_america_corp(Currency::USD, Seniority::SeniorSecured, 0.0);
//! let mut pool = Pool::new();
//! let mut names = Vec::new();
//! for (i, rate) in [0.01, 0.02, 0.03].iter().enumerate() {
//!     let curve: SharedCreditCurve = Arc::new(FlatHazardRateCurve::new(*rate).unwrap());
//!     let name = format!("Acme{i}");
//!     pool.add(&name, Issuer::new(vec![(key.clone(), curve)]), key.clone());
//!     names.push(name);
//! }
//!
//! let today = Date::from_ymd(2014, 3, 19).unwrap();
//! let mut basket =
//!     Basket::new(today, names, vec![100.0; 3], Arc::new(pool), 0.0, 0.1).unwrap();
//! basket.set_loss_model(Box::new(GaussianLhpLossModel::new(0.3, vec![0.4; 3]).unwrap()));
//!
//! let loss = basket.expected_tranche_loss(today.add_months(60).unwrap()).unwrap();
//! assert!(loss > 0.0 && loss < 30.0);
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod analytical;
pub mod credit;
pub mod latent;
pub mod loss_models;

pub use loss_models::LossModelError;
