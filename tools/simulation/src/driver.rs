//! Run driver
//!
//! Repeats population draws for a session. One `ChaCha8Rng` is seeded when
//! the session starts and every run draws from it in sequence, so a seed
//! reproduces the whole session.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rating_core::aggregate::{CategoryBuckets, RunResult};
use rating_core::engine::RatingEngine;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use types::profile::EcuProfile;

use crate::config::{round_tenths, ValidatedConfig};
use crate::error::SimulationError;
use crate::export::SinkError;
use crate::metrics::SessionSummary;
use crate::sampler::AttributeSampler;
use crate::security::{Baseline, ProbabilityPolicy};
use crate::vulnerability::VulnerabilityGenerator;

/// Largest seed picked when the caller asks for a random one.
pub const MAX_RANDOM_SEED: u64 = 10_000;

/// Seed 0 means "pick one": a random seed in 1..=10000, drawn once per session.
pub fn resolve_seed<R: Rng + ?Sized>(requested: u64, rng: &mut R) -> u64 {
    if requested == 0 {
        rng.gen_range(1..=MAX_RANDOM_SEED)
    } else {
        requested
    }
}

// ── Run output ──────────────────────────────────────────────────────

/// Identifies a run within its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub seed: u64,
    /// 1-based
    pub run: u32,
    pub total_runs: u32,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub metadata: RunMetadata,
    /// Probability actually used for this run, after policy
    pub no_vuln_probability: f64,
    pub profiles: Vec<EcuProfile>,
    pub result: RunResult,
}

/// Consumer of finished runs.
pub trait RunSink {
    fn record(&mut self, report: &RunReport) -> Result<(), SinkError>;

    /// Called once after the last run.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

// ── Simulation ──────────────────────────────────────────────────────

/// A seeded simulation session.
#[derive(Debug)]
pub struct Simulation {
    config: ValidatedConfig,
    sampler: AttributeSampler,
    generator: VulnerabilityGenerator,
    engine: RatingEngine,
    policy: Box<dyn ProbabilityPolicy>,
    rng: ChaCha8Rng,
    seed: u64,
}

impl Simulation {
    pub fn new(config: ValidatedConfig, seed: u64) -> Self {
        let sampler = AttributeSampler::from_config(&config);
        let generator = VulnerabilityGenerator::from_config(&config);
        Self {
            config,
            sampler,
            generator,
            engine: RatingEngine::new(),
            policy: Box::new(Baseline),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Replace the probability policy (baseline by default).
    pub fn with_policy(mut self, policy: Box<dyn ProbabilityPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the rating engine (default bounds and weights otherwise).
    pub fn with_engine(mut self, engine: RatingEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Execute one run.
    ///
    /// Draw order: the per-run probability (when rerolling), then for each
    /// ECU its attributes followed by its findings.
    pub fn run_once(&mut self, run: u32, total_runs: u32) -> Result<RunReport, SimulationError> {
        let base_probability = if self.config.reroll_probability_per_run {
            round_tenths(self.rng.gen_range(0.0..=1.0))
        } else {
            self.config.no_vuln_probability
        };
        let no_vuln_probability = self.policy.derive(base_probability).clamp(0.0, 1.0);
        let generator = self.generator.with_probability(no_vuln_probability)?;

        let mut buckets = CategoryBuckets::new();
        let mut profiles = Vec::with_capacity(self.config.ecu_count);
        for _ in 0..self.config.ecu_count {
            let attributes = self.sampler.sample(&mut self.rng);
            let vulnerabilities = generator.generate(&mut self.rng);
            let profile = self.engine.score(attributes, vulnerabilities);
            self.engine.record(&mut buckets, &profile);
            profiles.push(profile);
        }
        let result = self.engine.finalize(buckets);

        if result.is_degenerate() {
            warn!(run, ecus = profiles.len(), "No component classified, vehicle unrated");
        } else {
            info!(
                run,
                total_runs,
                p = no_vuln_probability,
                vehicle_rating = %result.vehicle_rating.value(),
                classified = result.classified_count(),
                "Run complete"
            );
        }

        Ok(RunReport {
            metadata: RunMetadata {
                seed: self.seed,
                run,
                total_runs,
            },
            no_vuln_probability,
            profiles,
            result,
        })
    }

    /// Execute `total_runs` runs, handing each report to every sink.
    pub fn run_all(
        &mut self,
        total_runs: u32,
        sinks: &mut [&mut dyn RunSink],
    ) -> Result<SessionSummary, SimulationError> {
        info!(seed = self.seed, total_runs, ecus = self.config.ecu_count, "Session started");

        let mut summary = SessionSummary::new();
        for run in 1..=total_runs {
            let report = self.run_once(run, total_runs)?;
            for sink in sinks.iter_mut() {
                sink.record(&report)?;
            }
            summary.record(&report);
        }
        for sink in sinks.iter_mut() {
            sink.flush()?;
        }

        info!(seed = self.seed, "{}", summary.summary());
        Ok(summary)
    }
}
