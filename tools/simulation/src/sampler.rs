//! Attribute sampler
//!
//! Draws the categorical attributes of one synthetic ECU from weighted
//! distributions. Component type and safety level are drawn independently in
//! proportion to the configured weights; CAL and interaction risk are then
//! drawn uniformly from lookup tables keyed by those two values.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use types::component::{ComponentType, InteractionRisk};
use types::errors::ConfigError;
use types::profile::EcuAttributes;
use types::safety::{ConformanceLevel, SafetyLevel};

use crate::config::{weighted_index, ValidatedConfig};

/// Immutable lookup tables used while sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingTables {
    /// Legal CAL values per safety level, indexed by `SafetyLevel::index`
    cal_levels: [Vec<ConformanceLevel>; 5],
    /// Risk list per component type, indexed by `ComponentType::index`.
    /// Duplicates skew the uniform draw toward the repeated tier.
    interaction_risks: [[InteractionRisk; 4]; 5],
}

impl SamplingTables {
    /// Build tables, rejecting an empty CAL list.
    pub fn new(
        cal_levels: [Vec<ConformanceLevel>; 5],
        interaction_risks: [[InteractionRisk; 4]; 5],
    ) -> Result<Self, ConfigError> {
        for asil in SafetyLevel::ALL {
            if cal_levels[asil.index()].is_empty() {
                return Err(ConfigError::EmptyTable {
                    key: format!("ASIL {}", asil),
                });
            }
        }
        Ok(Self {
            cal_levels,
            interaction_risks,
        })
    }

    pub fn cal_levels(&self, asil: SafetyLevel) -> &[ConformanceLevel] {
        &self.cal_levels[asil.index()]
    }

    pub fn interaction_risks(&self, component: ComponentType) -> &[InteractionRisk; 4] {
        &self.interaction_risks[component.index()]
    }
}

impl Default for SamplingTables {
    fn default() -> Self {
        use InteractionRisk::{High, Low, Moderate, None};

        Self {
            cal_levels: SafetyLevel::ALL.map(|asil| asil.default_cal_levels().to_vec()),
            interaction_risks: [
                // ADAS
                [High, High, Moderate, Low],
                // Powertrain
                [High, Moderate, Low, None],
                // HMI
                [Moderate, Low, None, None],
                // Body
                [Low, Low, None, None],
                // Chassis
                [Moderate, Low, None, None],
            ],
        }
    }
}

/// Weighted sampler for ECU attributes.
#[derive(Debug, Clone)]
pub struct AttributeSampler {
    component_dist: WeightedIndex<f64>,
    safety_dist: WeightedIndex<f64>,
    tables: SamplingTables,
}

impl AttributeSampler {
    /// Create a sampler from raw weight vectors.
    ///
    /// Weights are relative likelihoods; zero excludes a category, but at
    /// least one weight per vector must be positive.
    pub fn new(
        component_weights: &[f64; 5],
        safety_weights: &[f64; 5],
        tables: SamplingTables,
    ) -> Result<Self, ConfigError> {
        let component_dist = weighted_index("component", component_weights)?;
        let safety_dist = weighted_index("safety", safety_weights)?;

        Ok(Self {
            component_dist,
            safety_dist,
            tables,
        })
    }

    /// Create a sampler from the distributions a validated config prepared.
    pub fn from_config(config: &ValidatedConfig) -> Self {
        Self {
            component_dist: config.component_distribution().clone(),
            safety_dist: config.safety_distribution().clone(),
            tables: SamplingTables::default(),
        }
    }

    pub fn tables(&self) -> &SamplingTables {
        &self.tables
    }

    /// Draw one ECU's attributes.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> EcuAttributes {
        let component_type = ComponentType::ALL[self.component_dist.sample(rng)];
        let safety_level = SafetyLevel::ALL[self.safety_dist.sample(rng)];

        // Non-empty by construction
        let cal_levels = self.tables.cal_levels(safety_level);
        let conformance_level = cal_levels[rng.gen_range(0..cal_levels.len())];

        let risks = self.tables.interaction_risks(component_type);
        let interaction_risk = risks[rng.gen_range(0..risks.len())];

        EcuAttributes {
            component_type,
            safety_level,
            conformance_level,
            data_or_privacy: rng.gen_bool(0.5),
            isolated_entity: rng.gen_bool(0.5),
            interaction_risk,
        }
    }
}
