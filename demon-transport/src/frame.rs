use demon_core::{ChamberSummary, Simulation};
use serde::{Deserialize, Serialize};

/// One particle as seen by a renderer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FrameParticle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub hot: bool,
}

/// Owned snapshot of the simulation after a step.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Frame {
    pub tick: u64,
    pub particles: Vec<FrameParticle>,
    pub left: ChamberSummary,
    pub right: ChamberSummary,
}

impl Frame {
    /// Copies the committed state out of `simulation`. The frame does not
    /// borrow from the simulation, so it can cross threads while the next
    /// step runs.
    pub fn capture(simulation: &Simulation) -> Self {
        let particles = simulation
            .snapshot()
            .into_iter()
            .map(|view| FrameParticle {
                x: view.position.x,
                y: view.position.y,
                radius: view.radius,
                hot: view.hot,
            })
            .collect();
        let chambers = simulation.chamber_stats();
        Frame {
            tick: simulation.tick(),
            particles,
            left: chambers.left,
            right: chambers.right,
        }
    }
}
