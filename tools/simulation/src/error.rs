//! Simulation error taxonomy

use thiserror::Error;
use types::errors::ConfigError;

use crate::export::SinkError;
use crate::security::PolicyError;

/// Top-level simulation error
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Security policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    ConfigFile(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_error() {
        let err: SimulationError = ConfigError::ProbabilityOutOfRange(1.5).into();
        assert!(matches!(err, SimulationError::Config(_)));
        assert!(err.to_string().contains("1.5"));
    }
}
