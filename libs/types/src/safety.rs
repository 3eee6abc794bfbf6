//! Safety and assurance levels
//!
//! ASIL (ISO 26262) safety integrity levels and CAL (ISO/SAE 21434)
//! cybersecurity assurance levels, plus the fixed mapping that says which
//! CAL values are legal for a given ASIL.

use crate::errors::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Automotive Safety Integrity Level, ordered by increasing severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SafetyLevel {
    /// Quality managed (no ASIL requirement)
    QM,
    A,
    B,
    C,
    D,
}

impl SafetyLevel {
    /// All safety levels, in weight-vector order.
    pub const ALL: [SafetyLevel; 5] = [
        SafetyLevel::QM,
        SafetyLevel::A,
        SafetyLevel::B,
        SafetyLevel::C,
        SafetyLevel::D,
    ];

    pub fn index(&self) -> usize {
        match self {
            SafetyLevel::QM => 0,
            SafetyLevel::A => 1,
            SafetyLevel::B => 2,
            SafetyLevel::C => 3,
            SafetyLevel::D => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyLevel::QM => "QM",
            SafetyLevel::A => "A",
            SafetyLevel::B => "B",
            SafetyLevel::C => "C",
            SafetyLevel::D => "D",
        }
    }

    /// Standard legal CAL set for this ASIL.
    ///
    /// QM → {1,2}; A,B → {1,2,3}; C,D → {2,3,4}
    pub fn default_cal_levels(&self) -> &'static [ConformanceLevel] {
        static QM_LEVELS: [ConformanceLevel; 2] = [ConformanceLevel(1), ConformanceLevel(2)];
        static AB_LEVELS: [ConformanceLevel; 3] =
            [ConformanceLevel(1), ConformanceLevel(2), ConformanceLevel(3)];
        static CD_LEVELS: [ConformanceLevel; 3] =
            [ConformanceLevel(2), ConformanceLevel(3), ConformanceLevel(4)];

        match self {
            SafetyLevel::QM => &QM_LEVELS,
            SafetyLevel::A | SafetyLevel::B => &AB_LEVELS,
            SafetyLevel::C | SafetyLevel::D => &CD_LEVELS,
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafetyLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix("ASIL")
            .or_else(|| trimmed.strip_prefix("asil"))
            .map(str::trim)
            .unwrap_or(trimmed);

        SafetyLevel::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseError::UnknownSafetyLevel(s.to_string()))
    }
}

/// Cybersecurity Assurance Level, 1 through 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ConformanceLevel(u8);

impl ConformanceLevel {
    /// Create a CAL, rejecting values outside 1..=4.
    pub fn try_new(level: u8) -> Result<Self, ParseError> {
        if (1..=4).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ParseError::InvalidConformanceLevel(level))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ConformanceLevel {
    type Error = ParseError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::try_new(level)
    }
}

impl From<ConformanceLevel> for u8 {
    fn from(level: ConformanceLevel) -> Self {
        level.0
    }
}

impl fmt::Display for ConformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CAL{}", self.0)
    }
}
