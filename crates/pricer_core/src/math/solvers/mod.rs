//! Root-finding solvers.
//!
//! - [`BrentSolver`]: Bracketing root finder without derivative requirement,
//!   with an optional geometric bracket search for unbounded domains
//! - [`SolverConfig`]: Tolerance and iteration budget shared by solvers
//!
//! ```
//! use pricer_core::math::solvers::{BrentSolver, SolverConfig};
//!
//! let solver = BrentSolver::new(SolverConfig::default());
//! let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
//! assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
//! ```

mod brent;
mod config;

pub use brent::{BrentSolver, MAX_BRACKET_EXPANSIONS};
pub use config::SolverConfig;
