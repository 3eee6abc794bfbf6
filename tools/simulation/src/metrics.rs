//! Session metrics
//!
//! Tracks runs, ECU counts and the spread of vehicle ratings across a
//! simulation session.

use rating_core::aggregate::VehicleRating;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::driver::RunReport;

/// Aggregated session metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_runs: u64,
    pub rated_runs: u64,
    pub unrated_runs: u64,
    pub total_ecus: u64,
    pub classified_ecus: u64,
    pub clean_ecus: u64,
    pub rating_sum: Decimal,
    pub min_rating: Option<Decimal>,
    pub max_rating: Option<Decimal>,
}

impl SessionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single run into the summary.
    pub fn record(&mut self, report: &RunReport) {
        self.total_runs += 1;
        self.total_ecus += report.profiles.len() as u64;
        self.classified_ecus += report.result.classified_count() as u64;
        self.clean_ecus += report
            .profiles
            .iter()
            .filter(|p| p.vulnerabilities().is_clean())
            .count() as u64;

        match report.result.vehicle_rating {
            VehicleRating::Rated(rating) => {
                self.rated_runs += 1;
                self.rating_sum += rating;
                self.min_rating = Some(self.min_rating.map_or(rating, |m| m.min(rating)));
                self.max_rating = Some(self.max_rating.map_or(rating, |m| m.max(rating)));
            }
            VehicleRating::Unrated => {
                self.unrated_runs += 1;
            }
        }
    }

    /// Mean vehicle rating over rated runs.
    pub fn mean_rating(&self) -> Option<Decimal> {
        if self.rated_runs == 0 {
            return None;
        }
        Some(self.rating_sum / Decimal::from(self.rated_runs))
    }

    /// Build a summary string.
    pub fn summary(&self) -> String {
        let fmt = |v: Option<Decimal>| v.map_or_else(|| "n/a".to_string(), |d| d.round_dp(2).to_string());
        format!(
            "Runs: {} | Rated: {} | Unrated: {} | ECUs: {} | Clean: {} | Vehicle rating mean/min/max: {}/{}/{}",
            self.total_runs,
            self.rated_runs,
            self.unrated_runs,
            self.total_ecus,
            self.clean_ecus,
            fmt(self.mean_rating()),
            fmt(self.min_rating),
            fmt(self.max_rating),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RunMetadata;
    use rating_core::engine::RatingEngine;
    use types::component::{ComponentType, InteractionRisk};
    use types::profile::EcuAttributes;
    use types::safety::{ConformanceLevel, SafetyLevel};
    use types::vulnerability::VulnerabilityTriple;

    fn report(run: u32, triples: &[VulnerabilityTriple]) -> RunReport {
        let engine = RatingEngine::new();
        let attrs = EcuAttributes {
            component_type: ComponentType::Chassis,
            safety_level: SafetyLevel::D,
            conformance_level: ConformanceLevel::try_new(4).unwrap(),
            data_or_privacy: false,
            isolated_entity: false,
            interaction_risk: InteractionRisk::High,
        };
        let profiles: Vec<_> = triples.iter().map(|t| engine.score(attrs, *t)).collect();
        let result = engine.evaluate(&profiles);
        RunReport {
            metadata: RunMetadata {
                seed: 1,
                run,
                total_runs: 3,
            },
            no_vuln_probability: 0.5,
            profiles,
            result,
        }
    }

    #[test]
    fn test_summary_creation() {
        let summary = SessionSummary::new();
        assert_eq!(summary.total_runs, 0);
        assert_eq!(summary.mean_rating(), None);
        assert!(summary.summary().contains("Runs: 0"));
        assert!(summary.summary().contains("n/a"));
    }

    #[test]
    fn test_record_rated_and_unrated() {
        let mut summary = SessionSummary::new();
        summary.record(&report(1, &[VulnerabilityTriple::CLEAN, VulnerabilityTriple::CLEAN]));
        summary.record(&report(
            2,
            &[VulnerabilityTriple::new(Decimal::new(62, 1), Decimal::ZERO, Decimal::ZERO)],
        ));
        summary.record(&report(3, &[]));

        assert_eq!(summary.total_runs, 3);
        assert_eq!(summary.rated_runs, 2);
        assert_eq!(summary.unrated_runs, 1);
        assert_eq!(summary.total_ecus, 3);
        assert_eq!(summary.classified_ecus, 3);
        assert_eq!(summary.clean_ecus, 2);
        assert_eq!(summary.min_rating, Some(Decimal::new(5, 1)));
        assert_eq!(summary.max_rating, Some(Decimal::from(5)));
        assert_eq!(summary.mean_rating(), Some(Decimal::new(275, 2)));
    }
}
