use demon_core::{AllPairs, BroadPhase, Container, UniformGrid};
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    /// Stop after this many steps; run until interrupted when absent.
    #[serde(default)]
    pub max_steps: Option<u64>,
    pub container: Container,
    pub initial_state: InitialState,
    #[serde(default)]
    pub collisions: CollisionSettings,
    #[serde(default)]
    pub parallel: Option<ParallelSettings>,
    #[serde(default)]
    pub transport: TransportConfig,
    /// Log chamber statistics every N frames (0 disables).
    #[serde(default = "default_log_frequency")]
    pub log_frequency: u32,
}

fn default_framerate() -> u32 { 60 }
fn default_log_frequency() -> u32 { 120 }

// --- Initial state ---

/// Where the starting particles come from.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
pub enum InitialState {
    /// Seeded random placement.
    Random(RandomScenario),
    /// Particles listed one by one.
    Explicit(Vec<ParticleEntry>),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RandomScenario {
    pub count: usize,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    /// RNG seed; fresh entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

// Keeps max_speed <= 2 * radius so no particle can step over the gate window.
fn default_radius() -> f64 { 8.0 }
fn default_max_speed() -> f64 { 16.0 }

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ParticleEntry {
    pub position: [f64; 2],
    pub velocity: [f64; 2],
    pub radius: f64,
}

// --- Collisions ---

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CollisionSettings {
    #[serde(default)]
    pub broad_phase: BroadPhaseSetting,
}

/// Which broad phase feeds the pairwise collision test.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhaseSetting {
    #[default]
    AllPairs,
    Grid {
        #[serde(default = "default_cell_size")]
        cell_size: f64,
    },
}

fn default_cell_size() -> f64 { 20.0 }

impl BroadPhaseSetting {
    pub fn build(&self) -> Box<dyn BroadPhase> {
        match self {
            BroadPhaseSetting::AllPairs => Box::new(AllPairs),
            BroadPhaseSetting::Grid { cell_size } => Box::new(UniformGrid::new(*cell_size)),
        }
    }
}

// --- Parallelism ---

/// Configuration for the parallel per-particle pass
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ParallelSettings {
    pub enabled: bool,
    #[serde(default = "default_parallel_threshold")]
    pub threshold: usize,
}

fn default_parallel_threshold() -> usize { 2048 }

// --- Transport ---

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TransportConfig {
    #[serde(default)]
    pub serializer: SerializerType,
    #[serde(default)]
    pub sender: SenderConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SerializerType {
    #[default]
    Json,
    Binary,
}

/// Configuration specific to the File sender
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FileSenderOptions {
    pub path: String,
}

/// Enum defining the sender type and its specific configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(tag = "type", content = "options", rename_all = "lowercase")]
pub enum SenderConfig {
    Stdio,
    File(FileSenderOptions),
    #[default]
    Null,
}
