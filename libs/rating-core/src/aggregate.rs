//! Aggregate scorer
//!
//! Collects classified component ratings into one bucket per severity class
//! and reduces the buckets of a run to per-class statistics and a single
//! vehicle rating.
//!
//! Class weights are renormalized over the classes that actually occur, so a
//! vehicle without class-D components is rated on C/B/A alone with their
//! weights scaled up proportionally.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::severity::{SeverityClass, SeverityWeights};

// ── Category buckets ────────────────────────────────────────────────

/// Per-run builder holding the ratings assigned to each severity class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBuckets {
    buckets: [Vec<Decimal>; 4],
}

impl CategoryBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a classified rating to its class bucket.
    pub fn push(&mut self, class: SeverityClass, rating: Decimal) {
        self.buckets[class.index()].push(rating);
    }

    pub fn bucket(&self, class: SeverityClass) -> &[Decimal] {
        &self.buckets[class.index()]
    }

    /// Total number of classified components.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reduce the buckets to a finished `RunResult`.
    pub fn finalize(self, weights: &SeverityWeights) -> RunResult {
        let stats = SeverityClass::ALL.map(|class| ClassStats::from_ratings(self.bucket(class)));
        let vehicle_rating = vehicle_rating(&stats, weights);
        RunResult {
            stats,
            vehicle_rating,
        }
    }
}

// ── Per-class statistics ────────────────────────────────────────────

/// Summary statistics over one class bucket.
///
/// All fields are zero for an empty bucket; `stdev` is the sample standard
/// deviation and is zero for a single rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassStats {
    pub sum: Decimal,
    pub count: usize,
    pub mean: Decimal,
    pub median: Decimal,
    pub stdev: Decimal,
}

impl ClassStats {
    pub fn from_ratings(ratings: &[Decimal]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }

        let count = ratings.len();
        let sum: Decimal = ratings.iter().copied().sum();
        let mean = sum / Decimal::from(count);

        Self {
            sum,
            count,
            mean,
            median: median(ratings),
            stdev: sample_stdev(ratings, mean),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Middle value, or the mean of the two middle values for even counts.
fn median(ratings: &[Decimal]) -> Decimal {
    let mut sorted = ratings.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / Decimal::TWO
    }
}

fn sample_stdev(ratings: &[Decimal], mean: Decimal) -> Decimal {
    if ratings.len() < 2 {
        return Decimal::ZERO;
    }
    let squares: Decimal = ratings
        .iter()
        .map(|r| {
            let dev = *r - mean;
            dev * dev
        })
        .sum();
    let variance = squares / Decimal::from(ratings.len() - 1);
    variance.sqrt().unwrap_or(Decimal::ZERO)
}

// ── Vehicle rating ──────────────────────────────────────────────────

/// Vehicle-level rating of one run.
///
/// `Unrated` marks a run in which no component was classified; its numeric
/// value is 0 but reports must keep it apart from a computed 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value")]
pub enum VehicleRating {
    Rated(Decimal),
    Unrated,
}

impl VehicleRating {
    /// Numeric value, zero when unrated.
    pub fn value(&self) -> Decimal {
        match self {
            VehicleRating::Rated(v) => *v,
            VehicleRating::Unrated => Decimal::ZERO,
        }
    }

    pub fn is_rated(&self) -> bool {
        matches!(self, VehicleRating::Rated(_))
    }
}

/// Base weights rescaled over the non-empty classes, most severe first.
///
/// Empty classes get `None`; the `Some` entries sum to 1. All entries are
/// `None` when every bucket is empty.
pub fn normalized_weights(
    stats: &[ClassStats; 4],
    weights: &SeverityWeights,
) -> [Option<Decimal>; 4] {
    let total: Decimal = SeverityClass::ALL
        .iter()
        .filter(|c| !stats[c.index()].is_empty())
        .map(|c| weights.weight(*c))
        .sum();

    SeverityClass::ALL.map(|class| {
        if stats[class.index()].is_empty() || total.is_zero() {
            None
        } else {
            Some(weights.weight(class) / total)
        }
    })
}

/// Weighted mean of the class means under renormalized weights.
pub fn vehicle_rating(stats: &[ClassStats; 4], weights: &SeverityWeights) -> VehicleRating {
    let normalized = normalized_weights(stats, weights);
    if normalized.iter().all(Option::is_none) {
        return VehicleRating::Unrated;
    }

    let score = SeverityClass::ALL
        .iter()
        .filter_map(|c| normalized[c.index()].map(|w| w * stats[c.index()].mean))
        .sum();
    VehicleRating::Rated(score)
}

// ── Run result ──────────────────────────────────────────────────────

/// Aggregate outcome of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Statistics per class, D first
    pub stats: [ClassStats; 4],
    pub vehicle_rating: VehicleRating,
}

impl RunResult {
    pub fn class_stats(&self, class: SeverityClass) -> &ClassStats {
        &self.stats[class.index()]
    }

    /// Total number of classified components.
    pub fn classified_count(&self) -> usize {
        self.stats.iter().map(|s| s.count).sum()
    }

    /// True when no component was classified.
    pub fn is_degenerate(&self) -> bool {
        !self.vehicle_rating.is_rated()
    }
}
