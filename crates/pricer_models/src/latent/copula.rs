//! Copula policies: the marginal laws of factors and idiosyncratic terms.

use crate::analytical::Marginal;
use crate::loss_models::LossModelError;

/// Joint law coupling the latent variables.
///
/// # Examples
/// ```
/// use pricer_models::latent::CopulaPolicy;
///
/// let t = CopulaPolicy::StudentT { orders: vec![3, 3] };
/// let (factors, idiosyncratic) = t.marginals(1).unwrap();
/// assert_eq!(factors[0].dof(), Some(3));
/// assert_eq!(idiosyncratic.dof(), Some(3));
///
/// // One factor needs two orders (or a single broadcast one)
/// assert!(CopulaPolicy::StudentT { orders: vec![3, 4, 5] }.marginals(1).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CopulaPolicy {
    /// Independent standard normal factors and shocks.
    #[default]
    Gaussian,
    /// Independent unit-variance Student-t factors and shocks.
    ///
    /// `orders` holds one degrees-of-freedom value per factor followed by
    /// the idiosyncratic one. A single value applies to all of them.
    StudentT {
        /// Degrees of freedom, each at least 1
        orders: Vec<u32>,
    },
}

impl CopulaPolicy {
    /// Marginals of the `n_factors` factors and of the idiosyncratic term.
    ///
    /// # Errors
    ///
    /// `InvalidModelParameters` for a zero order or an order count that is
    /// neither 1 nor `n_factors + 1`.
    pub fn marginals(&self, n_factors: usize) -> Result<(Vec<Marginal>, Marginal), LossModelError> {
        match self {
            CopulaPolicy::Gaussian => Ok((vec![Marginal::Normal; n_factors], Marginal::Normal)),
            CopulaPolicy::StudentT { orders } => {
                let orders: Vec<u32> = match orders.len() {
                    1 => vec![orders[0]; n_factors + 1],
                    len if len == n_factors + 1 => orders.clone(),
                    len => {
                        return Err(LossModelError::InvalidModelParameters(format!(
                            "Student-t copula needs 1 or {} orders, got {len}",
                            n_factors + 1
                        )))
                    }
                };
                let mut marginals = orders
                    .iter()
                    .map(|&dof| Marginal::student_t(dof))
                    .collect::<Result<Vec<_>, _>>()?;
                let idiosyncratic = marginals.pop().ok_or_else(|| {
                    LossModelError::InvalidModelParameters("no Student-t orders".to_string())
                })?;
                Ok((marginals, idiosyncratic))
            }
        }
    }

    /// Short label used in model names.
    pub fn label(&self) -> &'static str {
        match self {
            CopulaPolicy::Gaussian => "Gaussian",
            CopulaPolicy::StudentT { .. } => "Student-t",
        }
    }

    /// True for the Gaussian policy.
    pub fn is_gaussian(&self) -> bool {
        matches!(self, CopulaPolicy::Gaussian)
    }
}
