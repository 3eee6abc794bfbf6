//! Vulnerability generator
//!
//! Decides whether an ECU carries findings and, if so, draws one to three
//! scores in the configured range. `p` is the probability that an ECU has
//! zero findings: p = 1 always yields a clean ECU, p = 0 never does.

use rand::Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use types::errors::ConfigError;
use types::vulnerability::{VulnerabilityTriple, SLOTS};

use crate::config::{check_bound, check_probability, ValidatedConfig};

/// Score precision in decimal places.
const SCORE_DP: u32 = 1;

/// Random source of vulnerability triples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VulnerabilityGenerator {
    no_vuln_probability: f64,
    min_vuln: f64,
    max_vuln: f64,
}

impl VulnerabilityGenerator {
    pub fn new(no_vuln_probability: f64, min_vuln: f64, max_vuln: f64) -> Result<Self, ConfigError> {
        check_probability(no_vuln_probability)?;
        check_bound("min_vuln", min_vuln)?;
        check_bound("max_vuln", max_vuln)?;
        if min_vuln > max_vuln {
            return Err(ConfigError::InvertedBounds {
                min: min_vuln,
                max: max_vuln,
            });
        }
        Ok(Self {
            no_vuln_probability,
            min_vuln,
            max_vuln,
        })
    }

    pub fn from_config(config: &ValidatedConfig) -> Self {
        Self {
            no_vuln_probability: config.no_vuln_probability,
            min_vuln: config.min_vuln,
            max_vuln: config.max_vuln,
        }
    }

    /// Same bounds, different no-vulnerability probability.
    pub fn with_probability(&self, no_vuln_probability: f64) -> Result<Self, ConfigError> {
        check_probability(no_vuln_probability)?;
        Ok(Self {
            no_vuln_probability,
            ..*self
        })
    }

    pub fn no_vuln_probability(&self) -> f64 {
        self.no_vuln_probability
    }

    /// Draw the findings of one ECU.
    ///
    /// A uniform draw `u` in [0, 1) below `p` gives a clean ECU. Otherwise
    /// 1-3 scores are drawn uniformly from [min, max], rounded to one
    /// decimal, and passed through the collapse rule.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> VulnerabilityTriple {
        let u: f64 = rng.gen();
        if u < self.no_vuln_probability {
            return VulnerabilityTriple::CLEAN;
        }

        let count = rng.gen_range(1..=SLOTS);
        let findings: Vec<Decimal> = (0..count).map(|_| self.draw_score(rng)).collect();
        VulnerabilityTriple::from_findings(&findings)
    }

    fn draw_score<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        let raw = rng.gen_range(self.min_vuln..=self.max_vuln);
        Decimal::from_f64(raw)
            .unwrap_or(Decimal::ZERO)
            .round_dp(SCORE_DP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use types::vulnerability::CRITICAL_THRESHOLD;

    #[test]
    fn test_probability_one_always_clean() {
        let g = VulnerabilityGenerator::new(1.0, 0.0, 6.9).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..1_000 {
            assert!(g.generate(&mut rng).is_clean());
        }
    }

    #[test]
    fn test_probability_zero_never_clean() {
        // Lower bound above zero so no draw rounds to an empty slot
        let g = VulnerabilityGenerator::new(0.0, 0.1, 6.9).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        for _ in 0..1_000 {
            assert!(!g.generate(&mut rng).is_clean());
        }
    }

    #[test]
    fn test_scores_within_bounds_and_rounded() {
        let g = VulnerabilityGenerator::new(0.0, 1.2, 4.8).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        for _ in 0..2_000 {
            let t = g.generate(&mut rng);
            for s in t.scores().iter().filter(|s| !s.is_zero()) {
                assert!(*s >= Decimal::new(12, 1) && *s <= Decimal::new(48, 1));
                assert_eq!(*s, s.round_dp(1));
            }
        }
    }

    #[test]
    fn test_critical_draws_collapse() {
        let g = VulnerabilityGenerator::new(0.0, 5.3, 6.9).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        for _ in 0..500 {
            let t = g.generate(&mut rng);
            assert!(t.worst() >= CRITICAL_THRESHOLD);
            assert_eq!(t.present_count(), 1);
        }
    }

    #[test]
    fn test_below_threshold_sorted_and_counts_vary() {
        let g = VulnerabilityGenerator::new(0.0, 0.5, 5.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(15);
        let mut counts = [0usize; 4];
        for _ in 0..3_000 {
            let t = g.generate(&mut rng);
            assert!(t.worst() >= t.middle() && t.middle() >= t.least());
            counts[t.present_count()] += 1;
        }
        assert_eq!(counts[0], 0);
        assert!(counts[1] > 0 && counts[2] > 0 && counts[3] > 0);
    }

    #[test]
    fn test_equal_bounds() {
        let g = VulnerabilityGenerator::new(0.0, 2.0, 2.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(16);
        let t = g.generate(&mut rng);
        assert_eq!(t.worst(), Decimal::new(20, 1));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(VulnerabilityGenerator::new(-0.1, 0.0, 1.0).is_err());
        assert!(VulnerabilityGenerator::new(0.5, 3.0, 1.0).is_err());
        assert!(VulnerabilityGenerator::new(0.5, 0.0, 8.0).is_err());
        let g = VulnerabilityGenerator::new(0.5, 0.0, 1.0).unwrap();
        assert!(g.with_probability(f64::NAN).is_err());
        assert_eq!(g.with_probability(0.2).unwrap().no_vuln_probability(), 0.2);
    }

    #[test]
    fn test_clean_share_tracks_probability() {
        let g = VulnerabilityGenerator::new(0.3, 1.0, 6.9).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let n = 20_000;
        let clean = (0..n).filter(|_| g.generate(&mut rng).is_clean()).count();
        let share = clean as f64 / n as f64;
        assert!((share - 0.3).abs() < 0.02, "share = {}", share);
    }
}
