//! Severity classes
//!
//! Four ordered aggregation buckets, D (most severe) to A (least severe),
//! and the base weights used to combine them into a vehicle rating.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity class of a classified component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityClass {
    D,
    C,
    B,
    A,
}

impl SeverityClass {
    /// All classes, most severe first. Reports use this order.
    pub const ALL: [SeverityClass; 4] = [
        SeverityClass::D,
        SeverityClass::C,
        SeverityClass::B,
        SeverityClass::A,
    ];

    pub fn index(&self) -> usize {
        match self {
            SeverityClass::D => 0,
            SeverityClass::C => 1,
            SeverityClass::B => 2,
            SeverityClass::A => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityClass::D => "D",
            SeverityClass::C => "C",
            SeverityClass::B => "B",
            SeverityClass::A => "A",
        }
    }
}

impl fmt::Display for SeverityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed aggregation weight per severity class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityWeights {
    pub d: Decimal,
    pub c: Decimal,
    pub b: Decimal,
    pub a: Decimal,
}

impl SeverityWeights {
    pub fn weight(&self, class: SeverityClass) -> Decimal {
        match class {
            SeverityClass::D => self.d,
            SeverityClass::C => self.c,
            SeverityClass::B => self.b,
            SeverityClass::A => self.a,
        }
    }
}

impl Default for SeverityWeights {
    /// D 0.5, C 0.3, B 0.15, A 0.05
    fn default() -> Self {
        Self {
            d: Decimal::new(5, 1),
            c: Decimal::new(3, 1),
            b: Decimal::new(15, 2),
            a: Decimal::new(5, 2),
        }
    }
}
