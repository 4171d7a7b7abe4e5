//! The frame loop: step, capture, hand off, pace.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use demon_core::Simulation;
use demon_transport::Frame;
use hdrhistogram::Histogram;
use log::{info, warn};

use crate::RunnerError;

/// Slowest step the histogram tracks, in microseconds.
const MAX_TRACKED_STEP_MICROS: u64 = 60_000_000;

pub struct Driver {
    pub max_steps: Option<u64>,
    pub log_frequency: u32,
    pub framerate: u32,
    /// Target frame time; `None` runs as fast as possible.
    pub frame_duration: Option<Duration>,
}

pub struct RunSummary {
    pub steps: u64,
    pub interrupted: bool,
    pub step_micros: Histogram<u64>,
}

impl Driver {
    pub fn new(framerate: u32, max_steps: Option<u64>, log_frequency: u32, headless: bool) -> Self {
        let frame_duration =
            (!headless).then(|| Duration::from_secs_f64(1.0 / f64::from(framerate.max(1))));
        Driver {
            max_steps,
            log_frequency,
            framerate,
            frame_duration,
        }
    }

    /// Steps `simulation` until `max_steps` is reached, `running` is cleared
    /// or the output side hangs up.
    pub fn run(
        &self,
        simulation: &mut Simulation,
        frames: &Sender<Frame>,
        running: &AtomicBool,
    ) -> Result<RunSummary, RunnerError> {
        let mut step_micros = Histogram::<u64>::new_with_bounds(1, MAX_TRACKED_STEP_MICROS, 3)?;
        let mut steps = 0u64;
        let mut interrupted = false;

        loop {
            if !running.load(Ordering::SeqCst) {
                interrupted = true;
                break;
            }
            if self.max_steps.map_or(false, |max| steps >= max) {
                break;
            }

            let frame_start = Instant::now();
            simulation.step();
            let step_time = frame_start.elapsed();
            step_micros.saturating_record(step_time.as_micros() as u64);
            steps += 1;

            if frames.send(Frame::capture(simulation)).is_err() {
                warn!("Output thread hung up at tick {}; stopping", simulation.tick());
                break;
            }

            if self.log_frequency > 0 && steps % u64::from(self.log_frequency) == 0 {
                log_progress(simulation);
            }

            if let Some(frame_duration) = self.frame_duration {
                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    spin_sleep::sleep(frame_duration - elapsed);
                } else if self.framerate > 10 {
                    // Only worth mentioning when the target framerate is high enough to matter
                    warn!("Frame time exceeded budget: {:?} > {:?}", elapsed, frame_duration);
                }
            }
        }

        Ok(RunSummary {
            steps,
            interrupted,
            step_micros,
        })
    }
}

fn log_progress(simulation: &Simulation) {
    let chambers = simulation.chamber_stats();
    let gate = simulation.gate_stats();
    info!(
        "tick {}: left {} particles ({} hot, mean KE {:.2}) | right {} particles ({} hot, mean KE {:.2}) | gap {:.2}",
        simulation.tick(),
        chambers.left.count,
        chambers.left.hot,
        chambers.left.mean_kinetic_energy,
        chambers.right.count,
        chambers.right.hot,
        chambers.right.mean_kinetic_energy,
        chambers.temperature_gap(),
    );
    info!(
        "gate: admitted {} hot / {} cold, rejected {} hot / {} cold, wall bounces {}",
        gate.admitted_hot, gate.admitted_cold, gate.rejected_hot, gate.rejected_cold, gate.wall_bounces,
    );
}

impl RunSummary {
    pub fn log(&self) {
        info!(
            "Ran {} steps{}",
            self.steps,
            if self.interrupted { " (interrupted)" } else { "" }
        );
        if self.step_micros.len() > 0 {
            info!(
                "Step time (us): mean {:.1}, p50 {}, p99 {}, max {}",
                self.step_micros.mean(),
                self.step_micros.value_at_quantile(0.5),
                self.step_micros.value_at_quantile(0.99),
                self.step_micros.max(),
            );
        }
    }
}
