//! Rating core
//!
//! The deterministic half of the ECU risk model. Given sampled attributes and
//! vulnerability findings it:
//! - reduces findings to a component rating (`rating`)
//! - assigns each component a severity class (`classifier`)
//! - folds classified ratings into per-class statistics and one
//!   renormalized vehicle rating (`aggregate`)
//!
//! `engine::RatingEngine` ties the three together. Nothing here draws random
//! numbers; sampling lives in the `simulation` crate.

pub mod rating;
pub mod classifier;
pub mod aggregate;
pub mod engine;
