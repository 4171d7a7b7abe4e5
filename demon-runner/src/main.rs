use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use demon_config::{load_config, ConfigError};
use demon_transport::TransportError;
use env_logger::Env;
use log::{error, info};
use thiserror::Error;

mod driver;
mod output;

use driver::Driver;
use output::{create_sender, create_serializer, spawn_output};

/// Frames buffered between the simulation and the output thread.
const FRAME_QUEUE_DEPTH: usize = 8;

#[derive(Parser, Debug)]
#[command(author, version, about = "Maxwell's demon particle simulation", long_about = None)]
struct Args {
    /// Path to the simulation configuration file (JSON, or TOML by extension)
    #[arg(short, long, default_value = "demon.json")]
    config: PathBuf,

    /// Stop after this many steps, overriding `max_steps`
    #[arg(long)]
    steps: Option<u64>,

    /// Seed for a random initial state, overriding the configured one
    #[arg(long)]
    seed: Option<u64>,

    /// Run as fast as possible instead of pacing at the configured framerate
    #[arg(long)]
    headless: bool,
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Failed to set up step timing histogram: {0}")]
    Histogram(#[from] hdrhistogram::CreationError),

    #[error("Failed to start output thread: {0}")]
    Thread(#[from] std::io::Error),

    #[error("Output thread panicked")]
    OutputPanicked,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        return Err(e.into());
    }
    Ok(())
}

fn run(args: Args) -> Result<(), RunnerError> {
    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.override_seed(seed);
    }
    let max_steps = args.steps.or(config.max_steps);

    let mut simulation = config.build_simulation()?;
    info!(
        "Simulating {} particles with {} broad phase at {} FPS{}",
        simulation.num_particles(),
        simulation.broad_phase_name(),
        config.framerate,
        if args.headless { " (headless)" } else { "" }
    );

    let serializer = create_serializer(config.transport.serializer);
    let sender = create_sender(&config.transport.sender)?;
    let (frames_tx, frames_rx) = crossbeam_channel::bounded(FRAME_QUEUE_DEPTH);
    let output = spawn_output(frames_rx, serializer, sender)?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })?;

    let driver = Driver::new(config.framerate, max_steps, config.log_frequency, args.headless);
    let summary = driver.run(&mut simulation, &frames_tx, &running)?;
    drop(frames_tx);

    let frames_written = output.join().map_err(|_| RunnerError::OutputPanicked)??;
    summary.log();
    info!("Wrote {} frames", frames_written);
    Ok(())
}
