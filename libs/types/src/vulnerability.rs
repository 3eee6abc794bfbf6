//! Vulnerability findings
//!
//! Each ECU carries at most three severity scores (worst, middle, least),
//! on a 0.0-6.9 scale. Unused slots hold zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of the severity scale (6.9).
pub const MAX_SCORE: Decimal = Decimal::from_parts(69, 0, 0, false, 1);

/// A single finding at or above this score (5.3) suppresses all others.
pub const CRITICAL_THRESHOLD: Decimal = Decimal::from_parts(53, 0, 0, false, 1);

/// Number of score slots per ECU.
pub const SLOTS: usize = 3;

/// Clamp a score into `[0, MAX_SCORE]`.
pub fn clamp_score(score: Decimal) -> Decimal {
    score.max(Decimal::ZERO).min(MAX_SCORE)
}

/// Three severity scores in slot order (W, M, L).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VulnerabilityTriple([Decimal; SLOTS]);

impl VulnerabilityTriple {
    /// The triple of an ECU without findings.
    pub const CLEAN: VulnerabilityTriple = VulnerabilityTriple([Decimal::ZERO; SLOTS]);

    /// Build a triple from raw slot values, kept in the given order.
    pub fn new(worst: Decimal, middle: Decimal, least: Decimal) -> Self {
        Self([worst, middle, least])
    }

    /// Build a triple from up to three findings, padding with zeros and
    /// applying the collapse rule. Findings beyond the third are ignored.
    pub fn from_findings(findings: &[Decimal]) -> Self {
        let mut slots = [Decimal::ZERO; SLOTS];
        for (slot, score) in slots.iter_mut().zip(findings) {
            *slot = *score;
        }
        Self(slots).collapsed()
    }

    /// Apply the dominance rule.
    ///
    /// If the largest score reaches `CRITICAL_THRESHOLD` the result is
    /// `(max, 0, 0)`; otherwise the scores are sorted descending.
    pub fn collapsed(self) -> Self {
        let max = self.max();
        if max >= CRITICAL_THRESHOLD {
            return Self([max, Decimal::ZERO, Decimal::ZERO]);
        }
        let mut sorted = self.0;
        sorted.sort_by(|a, b| b.cmp(a));
        Self(sorted)
    }

    pub fn worst(&self) -> Decimal {
        self.0[0]
    }

    pub fn middle(&self) -> Decimal {
        self.0[1]
    }

    pub fn least(&self) -> Decimal {
        self.0[2]
    }

    pub fn scores(&self) -> [Decimal; SLOTS] {
        self.0
    }

    /// Largest score in the triple.
    pub fn max(&self) -> Decimal {
        self.0.iter().copied().max().unwrap_or(Decimal::ZERO)
    }

    /// Number of slots holding a finding (score > 0).
    pub fn present_count(&self) -> usize {
        self.0.iter().filter(|s| **s > Decimal::ZERO).count()
    }

    pub fn is_clean(&self) -> bool {
        self.present_count() == 0
    }

    /// True if a critical finding is present.
    pub fn is_critical(&self) -> bool {
        self.max() >= CRITICAL_THRESHOLD
    }
}

impl fmt::Display for VulnerabilityTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_constants() {
        assert_eq!(MAX_SCORE, d("6.9"));
        assert_eq!(CRITICAL_THRESHOLD, d("5.3"));
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(d("-1.2")), Decimal::ZERO);
        assert_eq!(clamp_score(d("7.5")), MAX_SCORE);
        assert_eq!(clamp_score(d("3.3")), d("3.3"));
    }

    #[test]
    fn test_collapse_on_critical() {
        let triple = VulnerabilityTriple::new(d("5.5"), d("6.2"), Decimal::ZERO).collapsed();
        assert_eq!(triple, VulnerabilityTriple::new(d("6.2"), Decimal::ZERO, Decimal::ZERO));
    }

    #[test]
    fn test_collapse_at_exact_threshold() {
        let triple = VulnerabilityTriple::from_findings(&[d("1.0"), d("5.3")]);
        assert_eq!(triple.scores(), [d("5.3"), Decimal::ZERO, Decimal::ZERO]);
    }

    #[test]
    fn test_sort_below_threshold() {
        let triple = VulnerabilityTriple::from_findings(&[d("1.0"), d("5.2"), d("3.1")]);
        assert_eq!(triple.scores(), [d("5.2"), d("3.1"), d("1.0")]);
    }

    #[test]
    fn test_from_findings_pads() {
        let triple = VulnerabilityTriple::from_findings(&[d("2.5")]);
        assert_eq!(triple.present_count(), 1);
        assert_eq!(triple.worst(), d("2.5"));
        assert_eq!(triple.least(), Decimal::ZERO);
    }

    #[test]
    fn test_clean() {
        assert!(VulnerabilityTriple::CLEAN.is_clean());
        assert_eq!(VulnerabilityTriple::from_findings(&[]), VulnerabilityTriple::CLEAN);
    }

    #[test]
    fn test_serializes_as_array() {
        let triple = VulnerabilityTriple::new(d("6.2"), Decimal::ZERO, Decimal::ZERO);
        let json = serde_json::to_string(&triple).unwrap();
        assert!(json.starts_with('['));
        let back: VulnerabilityTriple = serde_json::from_str(&json).unwrap();
        assert_eq!(back, triple);
    }
}
