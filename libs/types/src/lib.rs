//! Types library for the ECU risk-rating simulator
//!
//! Shared vocabulary for everything that samples, scores, classifies or
//! reports on synthetic ECU populations. Types here are plain data: no
//! randomness and no I/O.
//!
//! # Modules
//! - `component`: Component types and interaction-risk tiers
//! - `safety`: ASIL safety levels and CAL conformance levels
//! - `vulnerability`: Vulnerability score triples and the collapse rule
//! - `profile`: Sampled ECU attributes and scored ECU profiles
//! - `severity`: Severity classes and their aggregation weights
//! - `errors`: Error taxonomy

pub mod component;
pub mod safety;
pub mod vulnerability;
pub mod profile;
pub mod severity;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::component::*;
    pub use crate::safety::*;
    pub use crate::vulnerability::*;
    pub use crate::profile::*;
    pub use crate::severity::*;
    pub use crate::errors::*;
}
