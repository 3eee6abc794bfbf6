//! Error types for the rating simulator
//!
//! Configuration and parsing error taxonomy using thiserror

use thiserror::Error;

/// Configuration errors. All of these are raised before any sampling begins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("All {table} weights are zero; at least one category must be drawable")]
    ZeroWeights { table: &'static str },

    #[error("Invalid {table} weight at position {index}: {value}")]
    InvalidWeight {
        table: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Vulnerability bound {name} = {value} outside [0.0, 6.9]")]
    BoundOutOfRange { name: &'static str, value: f64 },

    #[error("Minimum vulnerability score {min} exceeds maximum {max}")]
    InvertedBounds { min: f64, max: f64 },

    #[error("No-vulnerability probability {0} outside [0.0, 1.0]")]
    ProbabilityOutOfRange(f64),

    #[error("Sampling table for {key} is empty")]
    EmptyTable { key: String },
}

/// Errors raised when parsing domain values from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),

    #[error("Unknown safety level: {0}")]
    UnknownSafetyLevel(String),

    #[error("Unknown interaction risk: {0}")]
    UnknownInteractionRisk(String),

    #[error("Conformance level must be 1-4, got {0}")]
    InvalidConformanceLevel(u8),
}
