//! Rating engine
//!
//! Ties rating, classification and aggregation together for one run.

use tracing::debug;
use types::profile::{EcuAttributes, EcuProfile};
use types::severity::{SeverityClass, SeverityWeights};
use types::vulnerability::VulnerabilityTriple;

use crate::aggregate::{CategoryBuckets, RunResult};
use crate::classifier::{Classifier, RatingBounds};
use crate::rating;

/// Rating engine configuration
#[derive(Debug, Clone, Default)]
pub struct RatingEngineConfig {
    /// Ratings accepted by the classifier
    pub bounds: RatingBounds,
    /// Base weight per severity class
    pub weights: SeverityWeights,
}

/// Scores, classifies and aggregates ECU profiles
#[derive(Debug, Clone, Default)]
pub struct RatingEngine {
    classifier: Classifier,
    weights: SeverityWeights,
}

impl RatingEngine {
    /// Create a rating engine with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RatingEngineConfig) -> Self {
        Self {
            classifier: Classifier::new(config.bounds),
            weights: config.weights,
        }
    }

    pub fn weights(&self) -> &SeverityWeights {
        &self.weights
    }

    /// Score one ECU, producing its immutable profile.
    pub fn score(&self, attributes: EcuAttributes, vulnerabilities: VulnerabilityTriple) -> EcuProfile {
        let rating = rating::component_rating(&vulnerabilities);
        EcuProfile::new(attributes, vulnerabilities, rating)
    }

    /// Classify a profile into the run's buckets.
    ///
    /// Returns the assigned class, or `None` if the profile was skipped.
    pub fn record(&self, buckets: &mut CategoryBuckets, profile: &EcuProfile) -> Option<SeverityClass> {
        let class = self.classifier.classify_profile(profile)?;
        debug!(
            class = %class,
            rating = %profile.rating(),
            asil = %profile.attributes().safety_level,
            risk = %profile.attributes().interaction_risk,
            "Component classified"
        );
        buckets.push(class, profile.rating());
        Some(class)
    }

    /// Close a run's buckets into its result.
    pub fn finalize(&self, buckets: CategoryBuckets) -> RunResult {
        buckets.finalize(&self.weights)
    }

    /// Classify and aggregate a complete population in one call.
    pub fn evaluate(&self, profiles: &[EcuProfile]) -> RunResult {
        let mut buckets = CategoryBuckets::new();
        for profile in profiles {
            self.record(&mut buckets, profile);
        }
        self.finalize(buckets)
    }
}
