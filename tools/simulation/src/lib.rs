//! ECU Population Simulator
//!
//! Monte Carlo driver for the vehicle risk rating. Synthesizes ECU
//! populations, scores them with `rating-core` and hands every run to the
//! configured report sinks.
//!
//! # Modules
//! - `config`: Session parameters and validation
//! - `sampler`: Weighted attribute sampling
//! - `vulnerability`: Vulnerability finding generation
//! - `security`: Security-feature probability policies
//! - `driver`: Seeded session loop and run sinks
//! - `metrics`: Session summary
//! - `export`: CSV report and raw population log
//! - `error`: Top-level error type

pub mod config;
pub mod sampler;
pub mod vulnerability;
pub mod security;
pub mod driver;
pub mod metrics;
pub mod export;
pub mod error;

/// Crate version constant
pub const VERSION: &str = "1.0.0";
