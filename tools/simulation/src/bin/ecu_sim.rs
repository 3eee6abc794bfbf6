use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use simulation::config::SimulationConfig;
use simulation::driver::{resolve_seed, RunSink, Simulation};
use simulation::export::{CsvReport, RawFormat, RawLog};
use simulation::security::{Baseline, FeatureCatalogue, ProbabilityPolicy, SecurityFeature};

/// Stream used for session setup draws, apart from the run stream.
const SETUP_STREAM: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Randomize every session parameter and the security features
    Auto,
    /// Use the config file and command-line overrides
    Manual,
}

/// ECU-SIM - Monte Carlo vehicle cybersecurity rating
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Parameter source
    #[arg(long, value_enum, default_value_t = Mode::Manual)]
    mode: Mode,

    /// Number of runs
    #[arg(short = 'n', long, default_value_t = 1)]
    runs: u32,

    /// Session seed (0 picks a random one)
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// JSON file with the base configuration (manual mode)
    #[arg(long)]
    config: Option<PathBuf>,

    /// ECUs per run
    #[arg(long)]
    ecus: Option<usize>,

    /// Probability that an ECU has no findings
    #[arg(long)]
    no_vuln_probability: Option<f64>,

    /// Lowest vulnerability score
    #[arg(long)]
    min_vuln: Option<f64>,

    /// Highest vulnerability score
    #[arg(long)]
    max_vuln: Option<f64>,

    /// ADAS,Powertrain,HMI,Body,Chassis weights
    #[arg(long, value_parser = parse_weights)]
    component_weights: Option<[f64; 5]>,

    /// QM,A,B,C,D weights
    #[arg(long, value_parser = parse_weights)]
    safety_weights: Option<[f64; 5]>,

    /// Enable a security feature (repeatable)
    #[arg(long = "feature", value_name = "NAME")]
    features: Vec<SecurityFeature>,

    /// Pick security features at random
    #[arg(long, conflicts_with = "features")]
    auto_features: bool,

    /// List the security feature catalogue and exit
    #[arg(long)]
    list_features: bool,

    /// CSV report, appended to if it exists
    #[arg(long, default_value = "simulation.csv")]
    report: PathBuf,

    /// Raw population log
    #[arg(long)]
    raw_log: Option<PathBuf>,

    /// Raw log encoding: binary, json or text
    #[arg(long, default_value = "binary")]
    raw_format: RawFormat,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_weights(s: &str) -> Result<[f64; 5], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("'{}': {}", v.trim(), e)))
        .collect::<Result<Vec<f64>, String>>()?;
    <[f64; 5]>::try_from(values).map_err(|v| format!("expected 5 weights, got {}", v.len()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if cli.list_features {
        for feature in SecurityFeature::ALL {
            let group = feature.group().map(|g| format!(" [{}]", g)).unwrap_or_default();
            println!("{:<24} -{}{}", feature.name(), feature.reduction().normalize(), group);
        }
        return Ok(());
    }

    let seed = resolve_seed(cli.seed, &mut rand::thread_rng());
    let mut setup_rng = ChaCha8Rng::seed_from_u64(seed);
    setup_rng.set_stream(SETUP_STREAM);

    let config = match cli.mode {
        Mode::Auto => SimulationConfig::randomized(&mut setup_rng),
        Mode::Manual => manual_config(&cli)?,
    };
    let validated = config.validate().context("invalid simulation parameters")?;
    info!(seed, mode = ?cli.mode, config = ?validated.inner(), "Session configured");

    let policy: Box<dyn ProbabilityPolicy> = if !cli.features.is_empty() {
        Box::new(FeatureCatalogue::new(cli.features.iter().copied())?)
    } else if cli.auto_features || cli.mode == Mode::Auto {
        Box::new(FeatureCatalogue::random(&mut setup_rng))
    } else {
        Box::new(Baseline)
    };

    let mut simulation = Simulation::new(validated, seed).with_policy(policy);

    let mut report = CsvReport::open(&cli.report)
        .with_context(|| format!("cannot open report {}", cli.report.display()))?;
    let mut raw_log = match &cli.raw_log {
        Some(path) => Some(
            RawLog::open(path, cli.raw_format)
                .with_context(|| format!("cannot open raw log {}", path.display()))?,
        ),
        None => None,
    };

    let mut sinks: Vec<&mut dyn RunSink> = vec![&mut report];
    if let Some(log) = raw_log.as_mut() {
        sinks.push(log);
    }

    let summary = simulation.run_all(cli.runs, &mut sinks)?;

    println!("Seed: {}", seed);
    println!("{}", summary.summary());
    println!("Report: {}", cli.report.display());
    Ok(())
}

fn manual_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(ecus) = cli.ecus {
        config.ecu_count = ecus;
    }
    if let Some(p) = cli.no_vuln_probability {
        config.no_vuln_probability = p;
    }
    if let Some(min) = cli.min_vuln {
        config.min_vuln = min;
    }
    if let Some(max) = cli.max_vuln {
        config.max_vuln = max;
    }
    if let Some(weights) = cli.component_weights {
        config.component_weights = weights;
    }
    if let Some(weights) = cli.safety_weights {
        config.safety_weights = weights;
    }
    Ok(config)
}
