//! Simulation configuration
//!
//! Population size, vulnerability bounds and category weights for a
//! session. A `SimulationConfig` must pass `validate` before it can drive
//! any sampling.

use rand::distributions::{WeightedError, WeightedIndex};
use rand::Rng;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use types::errors::ConfigError;
use types::vulnerability::MAX_SCORE;

use crate::error::SimulationError;

/// Upper bound for vulnerability scores as a float.
fn max_score_f64() -> f64 {
    MAX_SCORE.to_f64().unwrap_or(6.9)
}

/// Round to one decimal place.
pub(crate) fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Configuration for a simulation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of ECUs sampled per run
    pub ecu_count: usize,
    /// Probability that an ECU has no findings at all
    pub no_vuln_probability: f64,
    /// Lower bound for sampled scores
    pub min_vuln: f64,
    /// Upper bound for sampled scores
    pub max_vuln: f64,
    /// Relative likelihood of ADAS, Powertrain, HMI, Body, Chassis
    pub component_weights: [f64; 5],
    /// Relative likelihood of QM, A, B, C, D
    pub safety_weights: [f64; 5],
    /// Draw a fresh no-vulnerability probability for every run
    #[serde(default)]
    pub reroll_probability_per_run: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ecu_count: 20,
            no_vuln_probability: 0.5,
            min_vuln: 0.0,
            max_vuln: 6.9,
            component_weights: [1.0; 5],
            safety_weights: [1.0; 5],
            reroll_probability_per_run: false,
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Randomized session parameters ("auto" mode).
    ///
    /// ECU count in 0..=100, bounds and weights rounded to one decimal, and
    /// a fresh no-vulnerability probability for every run. A weight vector
    /// that rounds to all zeros is redrawn.
    pub fn randomized<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let ecu_count = rng.gen_range(0..=100);
        let max_vuln = round_tenths(rng.gen_range(0.0..=max_score_f64()));
        let min_vuln = round_tenths(rng.gen_range(0.0..=max_vuln));
        let no_vuln_probability = round_tenths(rng.gen_range(0.0..=1.0));

        Self {
            ecu_count,
            no_vuln_probability,
            min_vuln,
            max_vuln,
            component_weights: random_weights(rng),
            safety_weights: random_weights(rng),
            reroll_probability_per_run: true,
        }
    }

    /// Check every constraint and return a config that can drive runs.
    ///
    /// Checks, in order:
    /// 1. Both weight vectors are finite, non-negative, not all zero and
    ///    have a finite sum
    /// 2. Both bounds lie in [0, 6.9]
    /// 3. `min_vuln <= max_vuln`
    /// 4. The no-vulnerability probability lies in [0, 1]
    ///
    /// The weighted distributions are built here, once per session.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let component_dist = weighted_index("component", &self.component_weights)?;
        let safety_dist = weighted_index("safety", &self.safety_weights)?;
        check_bound("min_vuln", self.min_vuln)?;
        check_bound("max_vuln", self.max_vuln)?;
        if self.min_vuln > self.max_vuln {
            return Err(ConfigError::InvertedBounds {
                min: self.min_vuln,
                max: self.max_vuln,
            });
        }
        check_probability(self.no_vuln_probability)?;
        Ok(ValidatedConfig {
            config: self.clone(),
            component_dist,
            safety_dist,
        })
    }
}

/// A configuration that passed `SimulationConfig::validate`, together with
/// the category distributions prepared from its weights.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    config: SimulationConfig,
    component_dist: WeightedIndex<f64>,
    safety_dist: WeightedIndex<f64>,
}

impl ValidatedConfig {
    pub fn inner(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn into_inner(self) -> SimulationConfig {
        self.config
    }

    /// Distribution over `ComponentType::ALL`
    pub fn component_distribution(&self) -> &WeightedIndex<f64> {
        &self.component_dist
    }

    /// Distribution over `SafetyLevel::ALL`
    pub fn safety_distribution(&self) -> &WeightedIndex<f64> {
        &self.safety_dist
    }
}

// Distributions are derived from the config, so equal configs are equal.
impl PartialEq for ValidatedConfig {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
    }
}

impl std::ops::Deref for ValidatedConfig {
    type Target = SimulationConfig;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

/// Validate a weight vector and build its sampling distribution.
pub(crate) fn weighted_index(table: &'static str, weights: &[f64]) -> Result<WeightedIndex<f64>, ConfigError> {
    check_weights(table, weights)?;
    WeightedIndex::new(weights).map_err(|err| match err {
        WeightedError::NoItem | WeightedError::AllWeightsZero => ConfigError::ZeroWeights { table },
        _ => {
            let index = weights
                .iter()
                .position(|w| !w.is_finite() || *w < 0.0)
                .unwrap_or(0);
            ConfigError::InvalidWeight {
                table,
                index,
                value: weights.get(index).copied().unwrap_or(f64::NAN),
            }
        }
    })
}

pub(crate) fn check_weights(table: &'static str, weights: &[f64]) -> Result<(), ConfigError> {
    let mut total = 0.0;
    for (index, value) in weights.iter().copied().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidWeight { table, index, value });
        }
        // The sampler needs a finite total
        total += value;
        if !total.is_finite() {
            return Err(ConfigError::InvalidWeight { table, index, value });
        }
    }
    if weights.iter().all(|w| *w == 0.0) {
        return Err(ConfigError::ZeroWeights { table });
    }
    Ok(())
}

pub(crate) fn check_bound(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 || value > max_score_f64() {
        return Err(ConfigError::BoundOutOfRange { name, value });
    }
    Ok(())
}

pub(crate) fn check_probability(p: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::ProbabilityOutOfRange(p));
    }
    Ok(())
}

fn random_weights<R: Rng + ?Sized>(rng: &mut R) -> [f64; 5] {
    loop {
        let weights = [(); 5].map(|_| round_tenths(rng.gen_range(0.0..=1.0)));
        if weights.iter().any(|w| *w > 0.0) {
            return weights;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Distribution;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_component_weights_rejected() {
        let config = SimulationConfig {
            component_weights: [0.0; 5],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroWeights { table: "component" })
        );
    }

    #[test]
    fn test_negative_safety_weight_rejected() {
        let config = SimulationConfig {
            safety_weights: [1.0, -0.5, 1.0, 1.0, 1.0],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight { table: "safety", index: 1, .. })
        ));
    }

    #[test]
    fn test_nan_weight_rejected() {
        let config = SimulationConfig {
            safety_weights: [1.0, f64::NAN, 1.0, 1.0, 1.0],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overflowing_weight_sum_rejected() {
        let config = SimulationConfig {
            component_weights: [1e308; 5],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidWeight {
                table: "component",
                index: 1,
                value: 1e308,
            })
        );
    }

    #[test]
    fn test_validated_config_prepares_distributions() {
        let config = SimulationConfig {
            component_weights: [0.0, 0.0, 2.0, 0.0, 0.0],
            ..Default::default()
        };
        let validated = config.validate().unwrap();
        assert_eq!(validated.inner(), &config);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(validated.component_distribution().sample(&mut rng), 2);
            assert!(validated.safety_distribution().sample(&mut rng) < 5);
        }
    }

    #[test]
    fn test_partial_zero_weights_allowed() {
        let config = SimulationConfig {
            component_weights: [0.0, 0.0, 1.0, 0.0, 0.0],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let config = SimulationConfig {
            min_vuln: 5.0,
            max_vuln: 2.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedBounds { min: 5.0, max: 2.0 })
        );
    }

    #[test]
    fn test_bound_above_scale_rejected() {
        let config = SimulationConfig {
            max_vuln: 7.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoundOutOfRange { name: "max_vuln", .. })
        ));
    }

    #[test]
    fn test_negative_bound_rejected() {
        let config = SimulationConfig {
            min_vuln: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoundOutOfRange { name: "min_vuln", .. })
        ));
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let config = SimulationConfig {
            no_vuln_probability: 1.2,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ProbabilityOutOfRange(1.2)));
    }

    #[test]
    fn test_equal_bounds_allowed() {
        let config = SimulationConfig {
            min_vuln: 3.3,
            max_vuln: 3.3,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_randomized_configs_validate() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let config = SimulationConfig::randomized(&mut rng);
            assert!(config.validate().is_ok(), "{:?}", config);
            assert!(config.ecu_count <= 100);
            assert!(config.reroll_probability_per_run);
        }
    }

    #[test]
    fn test_json_roundtrip_with_default_reroll() {
        let json = r#"{
            "ecu_count": 10,
            "no_vuln_probability": 0.3,
            "min_vuln": 1.0,
            "max_vuln": 6.0,
            "component_weights": [1, 0.5, 0.2, 0.2, 0.1],
            "safety_weights": [0.1, 0.2, 0.3, 0.2, 0.2]
        }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert!(!config.reroll_probability_per_run);
        assert_eq!(config.ecu_count, 10);
        assert!(config.validate().is_ok());
    }
}
