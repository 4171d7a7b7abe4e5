//! The step pipeline: integrate, outer walls, gate, commit, then collisions.

use log::{debug, error, info, trace, warn};
use rayon::prelude::*;

use crate::boundary::BoundaryReflector;
use crate::collision::{BroadPhase, CollisionResolver};
use crate::container::Container;
use crate::error::SimulationError;
use crate::gate::{GateController, GateOutcome, GateStats};
use crate::particle::{InitialParticle, Particle, ParticleView};
use crate::stats::ChamberStats;

/// Slack allowed on the containment check for reflection round-off.
const CONTAINMENT_EPSILON: f64 = 1e-9;

/// Owns the particles and the container and advances them one tick at a time.
///
/// Wall and gate handling for a particle reads only that particle's own
/// state, so it does not depend on particle order and may run in parallel.
/// The collision pass is order-sensitive: pairs are resolved in ascending
/// `(i, j)` index order, which keeps runs reproducible for a fixed ordering.
pub struct Simulation {
    container: Container,
    particles: Vec<Particle>,
    resolver: CollisionResolver,
    /// Minimum particle count for the rayon pass. `None` keeps it sequential.
    parallel_threshold: Option<usize>,
    tick: u64,
    gate_totals: GateStats,
    last_gate: GateStats,
    last_collisions: usize,
}

impl Simulation {
    /// Builds a simulation from a container and initial particle states.
    ///
    /// # Errors
    ///
    /// Fails fast on inconsistent geometry: an invalid container, a radius
    /// that is non-positive or larger than half the container's smaller
    /// dimension, non-finite values, a particle starting outside the walls,
    /// or a velocity component too large for one reflection to contain.
    pub fn new(
        container: Container,
        initial: Vec<InitialParticle>,
    ) -> Result<Self, SimulationError> {
        container.validate()?;
        validate_particles(&container, &initial)?;

        let tunnelling = initial
            .iter()
            .filter(|p| p.velocity.x.abs() > 2.0 * p.radius)
            .count();
        if tunnelling > 0 {
            warn!(
                "{} particle(s) move more than one diameter per tick along x and may skip the gate check",
                tunnelling
            );
        }

        let particles: Vec<Particle> = initial
            .into_iter()
            .map(|p| Particle::new(p.position, p.velocity, p.radius, container.speed_threshold))
            .collect();

        info!(
            "Simulation created: {} particles in {}x{} container, gate {} , threshold {}",
            particles.len(),
            container.width,
            container.height,
            container.gate_size,
            container.speed_threshold
        );

        Ok(Self {
            container,
            particles,
            resolver: CollisionResolver::default(),
            parallel_threshold: None,
            tick: 0,
            gate_totals: GateStats::default(),
            last_gate: GateStats::default(),
            last_collisions: 0,
        })
    }

    /// Replaces the collision broad phase. Outcomes are unchanged.
    pub fn with_broad_phase(mut self, broad_phase: Box<dyn BroadPhase>) -> Self {
        debug!("Using '{}' broad phase", broad_phase.name());
        self.resolver = CollisionResolver::new(broad_phase);
        self
    }

    /// Runs the per-particle pass on the rayon pool once the particle count
    /// reaches `threshold`.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = Some(threshold);
        self
    }

    /// Advances every particle by one tick.
    pub fn step(&mut self) {
        let container = self.container;

        let gate = match self.parallel_threshold {
            Some(threshold) if self.particles.len() >= threshold => self
                .particles
                .par_iter_mut()
                .map(|particle| GateStats::from_outcome(advance(&container, particle)))
                .reduce(GateStats::default, |a, b| a + b),
            _ => self
                .particles
                .iter_mut()
                .fold(GateStats::default(), |mut acc, particle| {
                    acc.record(advance(&container, particle));
                    acc
                }),
        };

        self.last_collisions = self.resolver.resolve_all(&mut self.particles);
        self.last_gate = gate;
        self.gate_totals += gate;
        self.tick += 1;

        trace!(
            "tick {}: {} collisions, {} admitted, {} rejected",
            self.tick,
            self.last_collisions,
            gate.admitted(),
            gate.rejected()
        );

        if cfg!(debug_assertions) {
            if let Err(err) = self.check_invariants() {
                error!("{}", err);
                panic!("{}", err);
            }
        }
    }

    /// Checks classification consistency and containment for every particle.
    pub fn check_invariants(&self) -> Result<(), SimulationError> {
        let c = &self.container;
        for (index, p) in self.particles.iter().enumerate() {
            if !p.classification_is_current() {
                return Err(SimulationError::InvariantViolation {
                    tick: self.tick,
                    index,
                    reason: format!(
                        "classified {} at speed {}",
                        if p.is_hot() { "hot" } else { "cold" },
                        p.speed()
                    ),
                });
            }
            let pos = p.position();
            let r = p.radius();
            let inside = pos.x >= r - CONTAINMENT_EPSILON
                && pos.x <= c.width - r + CONTAINMENT_EPSILON
                && pos.y >= r - CONTAINMENT_EPSILON
                && pos.y <= c.height - r + CONTAINMENT_EPSILON;
            if !inside {
                return Err(SimulationError::InvariantViolation {
                    tick: self.tick,
                    index,
                    reason: format!("position ({}, {}) outside the container", pos.x, pos.y),
                });
            }
        }
        Ok(())
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Owned copy of what a renderer needs, as committed by the last step.
    pub fn snapshot(&self) -> Vec<ParticleView> {
        self.particles.iter().map(ParticleView::from).collect()
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Gate outcomes summed over the whole run.
    pub fn gate_stats(&self) -> GateStats {
        self.gate_totals
    }

    pub fn last_step_gate_stats(&self) -> GateStats {
        self.last_gate
    }

    pub fn last_step_collisions(&self) -> usize {
        self.last_collisions
    }

    pub fn chamber_stats(&self) -> ChamberStats {
        ChamberStats::collect(&self.container, &self.particles)
    }

    pub fn broad_phase_name(&self) -> &'static str {
        self.resolver.broad_phase_name()
    }

    /// Total kinetic energy (unit masses).
    pub fn total_kinetic_energy(&self) -> f64 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }
}

/// Steps (a) to (d) for one particle.
fn advance(container: &Container, particle: &mut Particle) -> GateOutcome {
    let tentative = particle.integrate();
    let tentative = BoundaryReflector::apply(container, particle, tentative);
    let (next, outcome) = GateController::apply(container, particle, tentative);
    particle.commit_position(next);
    outcome
}

fn validate_particles(
    container: &Container,
    initial: &[InitialParticle],
) -> Result<(), SimulationError> {
    let max_radius = initial.iter().map(|p| p.radius).fold(0.0_f64, f64::max);

    for (index, p) in initial.iter().enumerate() {
        let invalid = |reason: String| SimulationError::InvalidParticle { index, reason };

        if !p.position.is_finite() || !p.velocity.is_finite() || !p.radius.is_finite() {
            return Err(invalid("position, velocity and radius must be finite".to_string()));
        }
        if p.radius <= 0.0 {
            return Err(invalid(format!("radius must be positive, got {}", p.radius)));
        }
        if p.radius > container.max_radius() {
            return Err(invalid(format!(
                "radius {} exceeds half the container's smaller dimension ({})",
                p.radius,
                container.max_radius()
            )));
        }
        let (x, y, r) = (p.position.x, p.position.y, p.radius);
        if x < r || x > container.width - r || y < r || y > container.height - r {
            return Err(invalid(format!(
                "position ({}, {}) does not fit inside the container with radius {}",
                x, y, r
            )));
        }
        if p.velocity.x.abs() > container.width - 2.0 * max_radius
            || p.velocity.y.abs() > container.height - 2.0 * max_radius
        {
            return Err(invalid(format!(
                "velocity ({}, {}) is too large to stay inside the container",
                p.velocity.x, p.velocity.y
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::UniformGrid;
    use crate::particle::Vector2;

    fn container() -> Container {
        Container::new(800.0, 600.0, 100.0, 10.0).unwrap()
    }

    fn single(x: f64, y: f64, vx: f64, vy: f64) -> Simulation {
        Simulation::new(
            container(),
            vec![InitialParticle::new(
                Vector2::new(x, y),
                Vector2::new(vx, vy),
                5.0,
            )],
        )
        .unwrap()
    }

    /// Deterministic pseudo-random particle layout on a coarse lattice.
    fn lattice(count: usize) -> Vec<InitialParticle> {
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 10_000) as f64 / 10_000.0
        };
        (0..count)
            .map(|i| {
                let col = (i % 30) as f64;
                let row = (i / 30) as f64;
                InitialParticle::new(
                    Vector2::new(20.0 + col * 25.0, 20.0 + row * 25.0),
                    Vector2::new(next() * 16.0 - 8.0, next() * 16.0 - 8.0),
                    4.0,
                )
            })
            .collect()
    }

    #[test]
    fn particle_away_from_divider_just_advances() {
        let mut sim = single(450.0, 300.0, 12.0, 0.0);
        assert!(sim.particles()[0].is_hot());
        sim.step();
        assert_eq!(sim.particles()[0].position(), Vector2::new(462.0, 300.0));
        assert_eq!(sim.last_step_gate_stats(), GateStats::default());
    }

    #[test]
    fn particle_outside_trigger_window_is_untouched() {
        let mut sim = single(398.0, 300.0, 12.0, 0.0);
        sim.step();
        assert_eq!(sim.particles()[0].position(), Vector2::new(410.0, 300.0));
        assert_eq!(sim.particles()[0].velocity(), Vector2::new(12.0, 0.0));
    }

    #[test]
    fn demon_closes_door_on_hot_particle_heading_right() {
        // |v| = 10 is hot; tentative x = 405 is within one radius of 400.
        let mut sim = single(397.0, 300.0, 8.0, 6.0);
        sim.step();
        let p = &sim.particles()[0];
        assert_eq!(p.position(), Vector2::new(395.0, 306.0));
        assert_eq!(p.velocity(), Vector2::new(-8.0, 6.0));
        assert_eq!(sim.gate_stats().rejected_hot, 1);
    }

    #[test]
    fn demon_lets_cold_particle_through_to_the_right() {
        let mut sim = single(397.0, 300.0, 8.0, 0.0);
        assert!(!sim.particles()[0].is_hot());
        sim.step();
        let p = &sim.particles()[0];
        assert_eq!(p.position(), Vector2::new(405.0, 300.0));
        assert_eq!(p.velocity(), Vector2::new(8.0, 0.0));
        assert_eq!(sim.gate_stats().admitted_cold, 1);
    }

    #[test]
    fn speed_preserved_without_collisions() {
        let mut sim = single(120.0, 80.0, 9.5, -7.25);
        let speed = sim.particles()[0].speed();
        for _ in 0..5_000 {
            sim.step();
            assert_eq!(sim.particles()[0].speed(), speed);
        }
        assert!(sim.gate_stats().wall_bounces + sim.gate_stats().rejected() > 0);
    }

    #[test]
    fn particles_stay_inside_and_classified() {
        let mut sim = Simulation::new(container(), lattice(300)).unwrap();
        for _ in 0..500 {
            sim.step();
            sim.check_invariants().unwrap();
        }
        assert_eq!(sim.tick(), 500);
        assert_eq!(sim.num_particles(), 300);
    }

    #[test]
    fn collisions_preserve_total_energy() {
        let mut sim = Simulation::new(container(), lattice(300)).unwrap();
        let energy = sim.total_kinetic_energy();
        let mut collided = 0;
        for _ in 0..300 {
            sim.step();
            collided += sim.last_step_collisions();
        }
        assert!(collided > 0);
        assert!((sim.total_kinetic_energy() - energy).abs() < 1e-6);
    }

    #[test]
    fn grid_broad_phase_matches_all_pairs() {
        let mut reference = Simulation::new(container(), lattice(240)).unwrap();
        let mut gridded = Simulation::new(container(), lattice(240))
            .unwrap()
            .with_broad_phase(Box::new(UniformGrid::new(12.0)));
        assert_eq!(gridded.broad_phase_name(), "grid");
        for _ in 0..400 {
            reference.step();
            gridded.step();
        }
        assert_eq!(reference.particles(), gridded.particles());
        assert_eq!(reference.gate_stats(), gridded.gate_stats());
    }

    #[test]
    fn parallel_pass_matches_sequential() {
        let mut sequential = Simulation::new(container(), lattice(240)).unwrap();
        let mut parallel = Simulation::new(container(), lattice(240))
            .unwrap()
            .with_parallel_threshold(1);
        for _ in 0..200 {
            sequential.step();
            parallel.step();
        }
        assert_eq!(sequential.particles(), parallel.particles());
        assert_eq!(sequential.gate_stats(), parallel.gate_stats());
    }

    #[test]
    fn snapshot_reflects_committed_state() {
        let mut sim = single(397.0, 300.0, 8.0, 6.0);
        sim.step();
        let view = sim.snapshot();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].position, Vector2::new(395.0, 306.0));
        assert_eq!(view[0].radius, 5.0);
        assert!(view[0].hot);
    }

    #[test]
    fn rejects_oversized_radius() {
        let err = Simulation::new(
            container(),
            vec![InitialParticle::new(Vector2::new(400.0, 300.0), Vector2::ZERO, 301.0)],
        )
        .err()
        .unwrap();
        assert!(matches!(err, SimulationError::InvalidParticle { index: 0, .. }));
    }

    #[test]
    fn rejects_particle_outside_walls() {
        let result = Simulation::new(
            container(),
            vec![InitialParticle::new(Vector2::new(2.0, 300.0), Vector2::ZERO, 5.0)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_runaway_velocity() {
        let result = Simulation::new(
            container(),
            vec![InitialParticle::new(
                Vector2::new(100.0, 300.0),
                Vector2::new(0.0, 595.0),
                5.0,
            )],
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_invalid_container() {
        let bad = Container {
            width: 800.0,
            height: 600.0,
            gate_size: 700.0,
            speed_threshold: 10.0,
        };
        let result = Simulation::new(bad, Vec::new());
        assert!(matches!(result, Err(SimulationError::InvalidContainer(_))));
    }

    #[test]
    fn invariant_check_catches_stale_position() {
        let mut sim = single(100.0, 100.0, 1.0, 1.0);
        sim.particles[0].commit_position(Vector2::new(-10.0, 100.0));
        let err = sim.check_invariants().unwrap_err();
        assert!(matches!(err, SimulationError::InvariantViolation { index: 0, .. }));
    }

    #[test]
    fn invariant_check_catches_stale_classification() {
        let mut sim = single(100.0, 100.0, 1.0, 1.0);
        assert!(sim.check_invariants().is_ok());
        sim.particles[0].force_classification(true);
        let err = sim.check_invariants().unwrap_err();
        match err {
            SimulationError::InvariantViolation { tick, index, reason } => {
                assert_eq!(tick, 0);
                assert_eq!(index, 0);
                assert!(reason.contains("hot"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn demon_sorts_hot_left_and_cold_right() {
        // One particle per horizontal lane, lanes further apart than a
        // diameter and vy = 0, so nothing ever collides. Every lane lies
        // inside the gate opening. Half-integer x keeps particles off the
        // dividing line itself.
        let c = Container::new(400.0, 400.0, 200.0, 5.0).unwrap();
        let mut initial = Vec::new();
        for lane in 0..19 {
            let y = 110.0 + lane as f64 * 10.0;
            let x = if lane % 3 == 0 { 60.5 } else { 330.5 };
            let vx = match lane % 4 {
                0 => 7.0,
                1 => -7.0,
                2 => 3.0,
                _ => -3.0,
            };
            initial.push(InitialParticle::new(Vector2::new(x, y), Vector2::new(vx, 0.0), 4.0));
        }
        let hot_total = initial.iter().filter(|p| p.velocity.x.abs() >= 5.0).count();
        let cold_total = initial.len() - hot_total;

        let mut sim = Simulation::new(c, initial).unwrap();
        for _ in 0..2_000 {
            sim.step();
        }
        let stats = sim.chamber_stats();
        assert_eq!(stats.left.hot, hot_total);
        assert_eq!(stats.left.cold(), 0);
        assert_eq!(stats.right.cold(), cold_total);
        assert_eq!(stats.right.hot, 0);
        assert!(stats.temperature_gap() > 0.0);
        assert_eq!(sim.gate_stats().wall_bounces, 0);
    }
}
