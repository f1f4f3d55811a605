//! Simulation configuration errors.

use pricer_models::LossModelError;
use thiserror::Error;

use super::config::MAX_SIMULATIONS;

/// Invalid [`SimulationConfig`](super::SimulationConfig) parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Trial count outside [1, `MAX_SIMULATIONS`].
    #[error("invalid simulation count {0}: must be in range [1, {max}]", max = MAX_SIMULATIONS)]
    InvalidSimulationCount(usize),

    /// Zero trials per batch.
    #[error("invalid batch size {0}: must be positive")]
    InvalidBatchSize(usize),

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Description of the invalid value
        value: String,
    },
}

impl From<ConfigError> for LossModelError {
    fn from(err: ConfigError) -> Self {
        LossModelError::InvalidModelParameters(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidSimulationCount(0);
        assert!(err.to_string().contains("invalid simulation count 0"));

        let err = ConfigError::InvalidParameter {
            name: "tolerance",
            value: "must be positive".to_string(),
        };
        assert_eq!(err.to_string(), "invalid parameter 'tolerance': must be positive");
    }

    #[test]
    fn test_converts_to_loss_model_error() {
        let err: LossModelError = ConfigError::InvalidBatchSize(0).into();
        assert!(matches!(err, LossModelError::InvalidModelParameters(msg) if msg.contains("batch size")));
    }
}
