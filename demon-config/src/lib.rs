//! Configuration loading for the demon simulation.
//!
//! A config file (JSON, or TOML when the path ends in `.toml`) describes the
//! container, the starting particles, the collision broad phase, optional
//! parallelism and where snapshots go.

use std::fs;
use std::path::Path;

use demon_core::{Simulation, SimulationError};
use log::info;
use thiserror::Error;

pub use self::scenario::generate;
pub use self::types::{
    BroadPhaseSetting, CollisionSettings, Config, FileSenderOptions, InitialState,
    ParallelSettings, ParticleEntry, RandomScenario, SenderConfig, SerializerType,
    TransportConfig,
};

mod scenario;
mod types;

// Config error handling
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Reads, parses and validates a config file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));
    let config = if is_toml {
        from_toml_str(&content)?
    } else {
        from_json_str(&content)?
    };
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

pub fn from_json_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

pub fn from_toml_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Checks the settings the core does not validate itself. Geometry is left
/// to `Simulation::new`.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.framerate == 0 {
        return Err(ConfigError::Validation(
            "Framerate must be greater than 0".to_string(),
        ));
    }

    match &config.initial_state {
        InitialState::Random(scenario) => {
            if scenario.count == 0 {
                return Err(ConfigError::Validation(
                    "Random particle count must be greater than 0".to_string(),
                ));
            }
            if !(scenario.radius > 0.0) {
                return Err(ConfigError::Validation(
                    "Random particle radius must be positive".to_string(),
                ));
            }
            if !(scenario.max_speed >= 0.0) || !scenario.max_speed.is_finite() {
                return Err(ConfigError::Validation(
                    "Maximum speed must be a non-negative number".to_string(),
                ));
            }
            if 2.0 * scenario.radius > config.container.width.min(config.container.height) {
                return Err(ConfigError::Validation(
                    "Random particle radius does not fit the container".to_string(),
                ));
            }
            let speed_limit =
                config.container.width.min(config.container.height) - 2.0 * scenario.radius;
            if scenario.max_speed > speed_limit {
                return Err(ConfigError::Validation(format!(
                    "Maximum speed {} exceeds {} (smaller container side minus one diameter)",
                    scenario.max_speed, speed_limit
                )));
            }
        }
        InitialState::Explicit(entries) => {
            if entries.is_empty() {
                return Err(ConfigError::Validation(
                    "Explicit initial state must list at least one particle".to_string(),
                ));
            }
        }
    }

    if let BroadPhaseSetting::Grid { cell_size } = config.collisions.broad_phase {
        if !(cell_size > 0.0) {
            return Err(ConfigError::Validation(
                "Grid cell size must be positive".to_string(),
            ));
        }
    }

    if let Some(parallel) = &config.parallel {
        if parallel.threshold == 0 {
            return Err(ConfigError::Validation(
                "Parallel threshold must be greater than 0".to_string(),
            ));
        }
    }

    if let SenderConfig::File(options) = &config.transport.sender {
        if options.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "File sender requires a non-empty path".to_string(),
            ));
        }
    }

    Ok(())
}

impl Config {
    /// Replaces the seed of a random scenario. No effect on explicit ones.
    pub fn override_seed(&mut self, seed: u64) {
        if let InitialState::Random(scenario) = &mut self.initial_state {
            scenario.seed = Some(seed);
        }
    }

    /// Builds the simulation described by this config.
    pub fn build_simulation(&self) -> Result<Simulation, ConfigError> {
        let particles = self.initial_state.particles(&self.container);
        let mut simulation = Simulation::new(self.container, particles)?
            .with_broad_phase(self.collisions.broad_phase.build());
        if let Some(parallel) = self.parallel.as_ref().filter(|p| p.enabled) {
            simulation = simulation.with_parallel_threshold(parallel.threshold);
        }
        Ok(simulation)
    }
}
