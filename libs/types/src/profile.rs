//! ECU profiles
//!
//! `EcuAttributes` is what the sampler draws; `EcuProfile` is the scored,
//! immutable record of one simulated ECU.

use crate::component::{ComponentType, InteractionRisk};
use crate::safety::{ConformanceLevel, SafetyLevel};
use crate::vulnerability::VulnerabilityTriple;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sampled, unscored attributes of one ECU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EcuAttributes {
    pub component_type: ComponentType,
    pub safety_level: SafetyLevel,
    pub conformance_level: ConformanceLevel,
    /// Processes personal or privacy-relevant data
    pub data_or_privacy: bool,
    /// Has no network path to other ECUs
    pub isolated_entity: bool,
    pub interaction_risk: InteractionRisk,
}

/// One scored ECU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcuProfile {
    attributes: EcuAttributes,
    vulnerabilities: VulnerabilityTriple,
    rating: Decimal,
}

impl EcuProfile {
    /// Assemble a profile from its attributes, findings and computed rating.
    pub fn new(
        attributes: EcuAttributes,
        vulnerabilities: VulnerabilityTriple,
        rating: Decimal,
    ) -> Self {
        Self {
            attributes,
            vulnerabilities,
            rating,
        }
    }

    pub fn attributes(&self) -> &EcuAttributes {
        &self.attributes
    }

    pub fn vulnerabilities(&self) -> &VulnerabilityTriple {
        &self.vulnerabilities
    }

    /// Component rating on the 0.0-5.0 scale
    pub fn rating(&self) -> Decimal {
        self.rating
    }
}
