//! Turns the `initial_state` section into particles for the core.

use std::f64::consts::TAU;

use demon_core::{Container, InitialParticle, Vector2};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{InitialState, ParticleEntry, RandomScenario};

/// Placement attempts per particle before accepting an overlap.
const PLACEMENT_ATTEMPTS: usize = 64;

impl InitialState {
    pub fn particles(&self, container: &Container) -> Vec<InitialParticle> {
        match self {
            InitialState::Random(scenario) => generate(scenario, container),
            InitialState::Explicit(entries) => entries.iter().map(InitialParticle::from).collect(),
        }
    }
}

impl From<&ParticleEntry> for InitialParticle {
    fn from(entry: &ParticleEntry) -> Self {
        InitialParticle::new(
            Vector2::from(entry.position),
            Vector2::from(entry.velocity),
            entry.radius,
        )
    }
}

/// Places `scenario.count` particles uniformly inside the container with a
/// uniformly random heading and a speed in `[0, max_speed]`.
///
/// Positions are resampled a few times to avoid starting overlaps.
pub fn generate(scenario: &RandomScenario, container: &Container) -> Vec<InitialParticle> {
    let mut rng = match scenario.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let r = scenario.radius;
    let mut particles: Vec<InitialParticle> = Vec::with_capacity(scenario.count);
    let mut overlapping = 0usize;

    for _ in 0..scenario.count {
        let mut position = sample_position(&mut rng, container, r);
        let mut attempts = 1;
        while attempts < PLACEMENT_ATTEMPTS && overlaps_any(&particles, position, r) {
            position = sample_position(&mut rng, container, r);
            attempts += 1;
        }
        if overlaps_any(&particles, position, r) {
            overlapping += 1;
        }

        let angle = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(0.0..=scenario.max_speed);
        let velocity = Vector2::new(speed * angle.cos(), speed * angle.sin());
        particles.push(InitialParticle::new(position, velocity, r));
    }

    if overlapping > 0 {
        debug!("{} particle(s) placed overlapping a neighbour", overlapping);
    }
    info!(
        "Generated {} random particles (radius {}, max speed {}, seed {:?})",
        particles.len(),
        r,
        scenario.max_speed,
        scenario.seed
    );
    particles
}

fn sample_position(rng: &mut StdRng, container: &Container, r: f64) -> Vector2 {
    Vector2::new(
        rng.gen_range(r..=container.width - r),
        rng.gen_range(r..=container.height - r),
    )
}

fn overlaps_any(particles: &[InitialParticle], position: Vector2, radius: f64) -> bool {
    particles
        .iter()
        .any(|p| p.position.distance(position) <= p.radius + radius)
}
