//! The demon: admission control at the dividing wall.
//!
//! The rule only decides *where* a particle goes. Admission leaves the
//! particle alone; rejection is an elastic reflection off the dividing line.
//! Speed is never changed here, so any temperature difference that builds up
//! between the chambers comes from sorting alone.

use std::ops::{Add, AddAssign};

use serde::Serialize;

use crate::container::{Chamber, Container};
use crate::particle::{Axis, Particle, Vector2};

/// Result of evaluating one particle against the dividing wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Not at the dividing wall, or not moving toward it.
    Clear,
    AdmittedHot,
    AdmittedCold,
    /// Hot particle heading right, door closed.
    RejectedHot,
    /// Cold particle heading left, door closed.
    RejectedCold,
    /// Hit the solid part of the dividing wall.
    WallBounce,
}

impl GateOutcome {
    #[inline]
    pub fn reflects(self) -> bool {
        matches!(
            self,
            GateOutcome::RejectedHot | GateOutcome::RejectedCold | GateOutcome::WallBounce
        )
    }
}

/// Decides, for a particle at the dividing wall, whether it passes or bounces.
///
/// Hot particles belong on the left, cold ones on the right: a hot particle
/// is let through only while moving left (`vx < 0`) and a cold one only while
/// moving right (`vx > 0`).
pub struct GateController;

impl GateController {
    /// True if the tentative x lies within one radius of the dividing line.
    #[inline]
    pub fn is_triggered(container: &Container, tentative_x: f64, radius: f64) -> bool {
        (tentative_x - container.divider_x()).abs() <= radius
    }

    /// True if `vx` carries a particle at `x` toward the dividing line.
    #[inline]
    pub fn is_approaching(container: &Container, x: f64, vx: f64) -> bool {
        let divider = container.divider_x();
        (x <= divider && vx > 0.0) || (x >= divider && vx < 0.0)
    }

    /// The admission rule on its own.
    #[inline]
    pub fn admits(hot: bool, vx: f64) -> bool {
        if hot {
            vx < 0.0
        } else {
            vx > 0.0
        }
    }

    /// Evaluates the gate without touching the particle.
    pub fn evaluate(container: &Container, particle: &Particle, tentative: Vector2) -> GateOutcome {
        let vx = particle.velocity().x;
        if !Self::is_triggered(container, tentative.x, particle.radius())
            || !Self::is_approaching(container, particle.position().x, vx)
        {
            return GateOutcome::Clear;
        }
        if !container.is_in_gate(tentative.y) {
            return GateOutcome::WallBounce;
        }
        match (particle.is_hot(), Self::admits(particle.is_hot(), vx)) {
            (true, true) => GateOutcome::AdmittedHot,
            (false, true) => GateOutcome::AdmittedCold,
            (true, false) => GateOutcome::RejectedHot,
            (false, false) => GateOutcome::RejectedCold,
        }
    }

    /// Evaluates the gate and, on rejection or a wall hit, reflects the
    /// particle back into the chamber it came from.
    ///
    /// Returns the position to commit together with the outcome.
    pub fn apply(
        container: &Container,
        particle: &mut Particle,
        tentative: Vector2,
    ) -> (Vector2, GateOutcome) {
        let outcome = Self::evaluate(container, particle, tentative);
        if !outcome.reflects() {
            return (tentative, outcome);
        }
        let origin = Self::origin_chamber(container, particle);
        let mirrored = Vector2::new(Self::mirror(container, origin, tentative.x), tentative.y);
        particle.reflect_axis(Axis::X);
        (mirrored, outcome)
    }

    /// Chamber an approaching particle is coming from. A particle sitting on
    /// the line is attributed by its direction of travel.
    fn origin_chamber(container: &Container, particle: &Particle) -> Chamber {
        let x = particle.position().x;
        let divider = container.divider_x();
        if x < divider || (x == divider && particle.velocity().x > 0.0) {
            Chamber::Left
        } else {
            Chamber::Right
        }
    }

    /// Mirrors `tentative_x` about the dividing line onto the `origin` side.
    /// For a tentative position past the line this is `2 * divider - x`.
    fn mirror(container: &Container, origin: Chamber, tentative_x: f64) -> f64 {
        let divider = container.divider_x();
        let depth = (tentative_x - divider).abs();
        match origin {
            Chamber::Left => divider - depth,
            Chamber::Right => divider + depth,
        }
    }
}

/// Tally of gate outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GateStats {
    pub admitted_hot: u64,
    pub admitted_cold: u64,
    pub rejected_hot: u64,
    pub rejected_cold: u64,
    pub wall_bounces: u64,
}

impl GateStats {
    pub fn record(&mut self, outcome: GateOutcome) {
        match outcome {
            GateOutcome::Clear => {}
            GateOutcome::AdmittedHot => self.admitted_hot += 1,
            GateOutcome::AdmittedCold => self.admitted_cold += 1,
            GateOutcome::RejectedHot => self.rejected_hot += 1,
            GateOutcome::RejectedCold => self.rejected_cold += 1,
            GateOutcome::WallBounce => self.wall_bounces += 1,
        }
    }

    pub fn from_outcome(outcome: GateOutcome) -> Self {
        let mut stats = Self::default();
        stats.record(outcome);
        stats
    }

    pub fn admitted(&self) -> u64 {
        self.admitted_hot + self.admitted_cold
    }

    pub fn rejected(&self) -> u64 {
        self.rejected_hot + self.rejected_cold
    }
}

impl Add for GateStats {
    type Output = GateStats;

    fn add(self, rhs: GateStats) -> GateStats {
        GateStats {
            admitted_hot: self.admitted_hot + rhs.admitted_hot,
            admitted_cold: self.admitted_cold + rhs.admitted_cold,
            rejected_hot: self.rejected_hot + rhs.rejected_hot,
            rejected_cold: self.rejected_cold + rhs.rejected_cold,
            wall_bounces: self.wall_bounces + rhs.wall_bounces,
        }
    }
}

impl AddAssign for GateStats {
    fn add_assign(&mut self, rhs: GateStats) {
        *self = *self + rhs;
    }
}
