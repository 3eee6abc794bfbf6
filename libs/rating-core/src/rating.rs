//! Component rating calculus
//!
//! Reduces up to three severity scores to one grade on a 0.0-5.0 scale:
//!
//! `rating = round(-0.725 * weighted_severity + 5, 1)`
//!
//! where `weighted_severity` depends on how many findings are present.

use rust_decimal::{Decimal, RoundingStrategy};
use types::vulnerability::{clamp_score, VulnerabilityTriple};

/// Grade of a component without findings.
pub const PERFECT_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Grade lost per point of weighted severity (-0.725).
pub const SEVERITY_SLOPE: Decimal = Decimal::from_parts(725, 0, 0, true, 3);

/// Decimal places kept in a component rating.
pub const RATING_DP: u32 = 1;

// Weights for three findings, in slot order
const W3_WORST: Decimal = Decimal::from_parts(6, 0, 0, false, 1);
const W3_MIDDLE: Decimal = Decimal::from_parts(3, 0, 0, false, 1);
const W3_LEAST: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

// Weights for two findings, sorted high to low
const W2_HIGH: Decimal = Decimal::from_parts(6, 0, 0, false, 1);
const W2_LOW: Decimal = Decimal::from_parts(4, 0, 0, false, 1);

/// Weighted severity of a triple, before the affine grade map.
///
/// Scores are clamped into [0, 6.9] first; zero slots count as absent.
/// - 3 present: `0.6*W + 0.3*M + 0.1*L` in slot order
/// - 2 present: `0.6*high + 0.4*low`
/// - 1 present: the score itself
/// - none: 0
pub fn weighted_severity(triple: &VulnerabilityTriple) -> Decimal {
    let clamped = triple.scores().map(clamp_score);
    let mut present: Vec<Decimal> = clamped
        .iter()
        .copied()
        .filter(|s| *s > Decimal::ZERO)
        .collect();

    match present.len() {
        3 => clamped[0] * W3_WORST + clamped[1] * W3_MIDDLE + clamped[2] * W3_LEAST,
        2 => {
            present.sort_by(|a, b| b.cmp(a));
            present[0] * W2_HIGH + present[1] * W2_LOW
        }
        1 => present[0],
        _ => Decimal::ZERO,
    }
}

/// Component rating for a triple, rounded to one decimal with halves going
/// away from zero (0.65 → 0.7).
///
/// Ranges from 5.0 (no findings) down to 0.0 (all findings at 6.9, where the
/// raw value -0.0025 rounds to zero).
pub fn component_rating(triple: &VulnerabilityTriple) -> Decimal {
    let severity = weighted_severity(triple);
    (SEVERITY_SLOPE * severity + PERFECT_RATING)
        .round_dp_with_strategy(RATING_DP, RoundingStrategy::MidpointAwayFromZero)
        .max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn triple(w: &str, m: &str, l: &str) -> VulnerabilityTriple {
        VulnerabilityTriple::new(d(w), d(m), d(l))
    }

    #[test]
    fn test_three_findings() {
        // 0.6*6.0 + 0.3*3.0 + 0.1*1.0 = 4.6; -0.725*4.6 + 5 = 1.665
        let t = triple("6.0", "3.0", "1.0");
        assert_eq!(weighted_severity(&t), d("4.6"));
        assert_eq!(component_rating(&t), d("1.7"));
    }

    #[test]
    fn test_three_findings_use_slot_order() {
        // Unsorted input keeps its slot weights
        let t = triple("1.0", "3.0", "6.0");
        assert_eq!(weighted_severity(&t), d("2.1"));
    }

    #[test]
    fn test_collapsed_critical() {
        let t = triple("5.5", "6.2", "0").collapsed();
        assert_eq!(component_rating(&t), d("0.5"));
    }

    #[test]
    fn test_no_findings_is_perfect() {
        assert_eq!(component_rating(&VulnerabilityTriple::CLEAN), d("5.0"));
    }

    #[test]
    fn test_two_findings_sorted() {
        // 0.6*4.0 + 0.4*2.0 = 3.2 regardless of slot position
        let t = triple("0", "2.0", "4.0");
        assert_eq!(weighted_severity(&t), d("3.2"));
        assert_eq!(component_rating(&t), d("2.7"));
    }

    #[test]
    fn test_single_finding() {
        let t = triple("0", "0", "3.0");
        assert_eq!(weighted_severity(&t), d("3.0"));
        assert_eq!(component_rating(&t), d("2.8"));
    }

    #[test]
    fn test_half_tenth_rounds_up() {
        // -0.725*6.0 + 5 = 0.65
        assert_eq!(component_rating(&triple("6.0", "0", "0")), d("0.7"));
        // -0.725*2.0 + 5 = 3.55
        assert_eq!(component_rating(&triple("2.0", "0", "0")), d("3.6"));
        // 0.6*5.0 + 0.4*1.0 = 3.4; -0.725*3.4 + 5 = 2.535
        assert_eq!(component_rating(&triple("5.0", "1.0", "0")), d("2.5"));
    }

    #[test]
    fn test_out_of_range_inputs_clamped() {
        let t = triple("9.9", "-2.0", "0");
        // 9.9 clamps to 6.9, -2.0 clamps to 0 (absent)
        assert_eq!(weighted_severity(&t), d("6.9"));
        assert_eq!(component_rating(&t), d("0.0"));
    }

    #[test]
    fn test_worst_case_rating() {
        let t = triple("6.9", "6.9", "6.9");
        assert_eq!(weighted_severity(&t), d("6.9"));
        assert!(component_rating(&t) >= Decimal::ZERO);
    }
}
