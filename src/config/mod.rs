//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (applied last by the `worm` binary)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WormError};
use crate::graph::DEFAULT_DELIMITER;
use crate::simulation::SimulationParams;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Simulation run configuration
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Random graph generator configuration
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| WormError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| WormError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Default config file location (`<config dir>/worm-defense/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("worm-defense").join("config.toml"))
    }

    /// Load `path` if given, else the default file if it exists, else
    /// defaults; environment variables are applied on top.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path.or_else(|| Self::default_path().filter(|p| p.is_file()));
        let Some(path) = path else {
            return Self::from_env();
        };

        tracing::debug!("Using config file {}", path.display());
        let mut config = Self::from_file(path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay `WORM_*` environment variables.
    ///
    /// Unparseable numeric values are a config error rather than being
    /// silently ignored.
    pub fn apply_env(&mut self) -> Result<()> {
        let sim = &mut self.simulation;

        if let Some(p) = env_parse::<f64>("WORM_INFECTION_PROBABILITY")? {
            sim.infection_probability = p;
        }
        if let Some(p) = env_parse::<f64>("WORM_INOCULATION_PROBABILITY")? {
            sim.inoculation_probability = p;
        }
        if let Ok(node) = std::env::var("WORM_INFECTION_START") {
            sim.infection_start = node;
        }
        if let Ok(node) = std::env::var("WORM_INOCULATION_START") {
            sim.inoculation_start = Some(node);
        }
        if let Some(max) = env_parse::<usize>("WORM_MAX_PERIODS")? {
            sim.max_periods = Some(max);
        }
        if let Some(seed) = env_parse::<u64>("WORM_SEED")? {
            sim.seed = Some(seed);
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| WormError::Config(format!("{key}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Simulation run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Probability that an infected node infects a susceptible neighbor
    pub infection_probability: f64,

    /// Probability that an inoculated node inoculates a neighbor
    pub inoculation_probability: f64,

    /// Node the worm starts from
    pub infection_start: String,

    /// Node inoculation starts from (`None` = propagation only)
    pub inoculation_start: Option<String>,

    /// Period cutoff (`None` = unbounded, relying on stall detection)
    pub max_periods: Option<usize>,

    /// Seed for the per-step trials (`None` = entropy-seeded)
    pub seed: Option<u64>,

    /// Edge-list column delimiter
    pub delimiter: char,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            infection_probability: 0.5,
            inoculation_probability: 0.5,
            infection_start: "1".to_string(),
            inoculation_start: Some("1".to_string()),
            max_periods: Some(10_000),
            seed: None,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl SimulationConfig {
    /// Build engine parameters for a string-keyed network
    pub fn to_params(&self) -> SimulationParams<String> {
        let mut params =
            SimulationParams::new(self.infection_start.clone(), self.infection_probability);

        if let Some(start) = &self.inoculation_start {
            params = params.with_inoculation(start.clone(), self.inoculation_probability);
        }
        if let Some(max) = self.max_periods {
            params = params.with_max_periods(max);
        }
        params
    }
}

/// Random graph generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of nodes
    pub nodes: usize,

    /// Edge probability (Erdős–Rényi) / rewiring probability (Watts–Strogatz)
    pub edge_probability: f64,

    /// Edges attached per new node (Barabási–Albert)
    pub attachment: usize,

    /// Ring neighbors per node (Watts–Strogatz)
    pub ring_neighbors: usize,

    /// Graph generation seed
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            nodes: 30,
            edge_probability: 0.25,
            attachment: 5,
            ring_neighbors: 3,
            seed: 15,
        }
    }
}
