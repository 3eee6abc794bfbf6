//! Severity classifier
//!
//! Ordered rule list mapping a scored component onto one of four severity
//! classes. The first matching rule wins:
//!
//! 1. D: ASIL C/D, or ASIL A/B with CAL 3/4 and High interaction risk
//! 2. C: ASIL A/B with CAL 2 handling private data, or Moderate/Low risk
//! 3. B: ASIL A/B with CAL 2, no private data, not isolated, or Low/None risk
//! 4. A: everything else
//!
//! Rule 3 repeats `Low`, which rule 2 already claims; evaluation order makes
//! that branch unreachable and must be kept as is.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use types::component::InteractionRisk;
use types::profile::{EcuAttributes, EcuProfile};
use types::safety::SafetyLevel;
use types::severity::SeverityClass;

use crate::rating::PERFECT_RATING;

/// Classify attributes with the fixed rule list.
pub fn classify(attrs: &EcuAttributes) -> SeverityClass {
    let asil_ab = matches!(attrs.safety_level, SafetyLevel::A | SafetyLevel::B);
    let asil_cd = matches!(attrs.safety_level, SafetyLevel::C | SafetyLevel::D);
    let cal = attrs.conformance_level.value();
    let risk = attrs.interaction_risk;

    if asil_cd || (asil_ab && (cal == 3 || cal == 4) && risk == InteractionRisk::High) {
        return SeverityClass::D;
    }

    if (asil_ab && cal == 2 && attrs.data_or_privacy)
        || matches!(risk, InteractionRisk::Moderate | InteractionRisk::Low)
    {
        return SeverityClass::C;
    }

    if (asil_ab && cal == 2 && !attrs.data_or_privacy && !attrs.isolated_entity)
        || matches!(risk, InteractionRisk::Low | InteractionRisk::None)
    {
        return SeverityClass::B;
    }

    SeverityClass::A
}

/// Inclusive range of ratings accepted for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingBounds {
    pub min: Decimal,
    pub max: Decimal,
}

impl RatingBounds {
    pub fn contains(&self, rating: Decimal) -> bool {
        rating >= self.min && rating <= self.max
    }
}

impl Default for RatingBounds {
    fn default() -> Self {
        Self {
            min: Decimal::ZERO,
            max: PERFECT_RATING,
        }
    }
}

/// Classifier guarding the rule list with a rating range check.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    bounds: RatingBounds,
}

impl Classifier {
    pub fn new(bounds: RatingBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> RatingBounds {
        self.bounds
    }

    /// Classify a scored profile.
    ///
    /// Returns `None` when the rating falls outside the accepted range; such
    /// a component is left out of every bucket.
    pub fn classify_profile(&self, profile: &EcuProfile) -> Option<SeverityClass> {
        let rating = profile.rating();
        if !self.bounds.contains(rating) {
            warn!(
                %rating,
                min = %self.bounds.min,
                max = %self.bounds.max,
                "Component rating out of range, skipping classification"
            );
            return None;
        }
        Some(classify(profile.attributes()))
    }
}
