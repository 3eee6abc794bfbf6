//! Component taxonomy
//!
//! The closed set of ECU component types and the interaction-risk tiers
//! that describe how strongly a component can influence vehicle behavior.

use crate::errors::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Functional domain of an ECU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentType {
    /// Advanced driver assistance
    #[serde(rename = "ADAS")]
    Adas,
    Powertrain,
    /// Human-machine interface
    #[serde(rename = "HMI")]
    Hmi,
    Body,
    Chassis,
}

impl ComponentType {
    /// All component types, in weight-vector order.
    pub const ALL: [ComponentType; 5] = [
        ComponentType::Adas,
        ComponentType::Powertrain,
        ComponentType::Hmi,
        ComponentType::Body,
        ComponentType::Chassis,
    ];

    /// Position of this type in weight vectors and lookup tables.
    pub fn index(&self) -> usize {
        match self {
            ComponentType::Adas => 0,
            ComponentType::Powertrain => 1,
            ComponentType::Hmi => 2,
            ComponentType::Body => 3,
            ComponentType::Chassis => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Adas => "ADAS",
            ComponentType::Powertrain => "Powertrain",
            ComponentType::Hmi => "HMI",
            ComponentType::Body => "Body",
            ComponentType::Chassis => "Chassis",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownComponentType(s.to_string()))
    }
}

/// How far a compromise of the component reaches into vehicle control
///
/// - High: affects autonomous decisions, braking or steering
/// - Moderate: sensors feeding collision detection, powertrain settings
/// - Low: structural changes with indirect safety impact
/// - None: no safety-relevant interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionRisk {
    High,
    Moderate,
    Low,
    None,
}

impl InteractionRisk {
    pub const ALL: [InteractionRisk; 4] = [
        InteractionRisk::High,
        InteractionRisk::Moderate,
        InteractionRisk::Low,
        InteractionRisk::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionRisk::High => "High",
            InteractionRisk::Moderate => "Moderate",
            InteractionRisk::Low => "Low",
            InteractionRisk::None => "None",
        }
    }
}

impl fmt::Display for InteractionRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionRisk {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InteractionRisk::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownInteractionRisk(s.to_string()))
    }
}
