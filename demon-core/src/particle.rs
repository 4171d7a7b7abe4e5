use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 2D vector used for positions and velocities.
pub type Vector2 = DVec2;

/// Cartesian axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    pub fn of(self, v: Vector2) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    #[inline]
    pub fn set(self, v: &mut Vector2, value: f64) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
        }
    }
}

/// Initial state of a particle as handed over by a scenario loader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialParticle {
    pub position: Vector2,
    pub velocity: Vector2,
    pub radius: f64,
}

impl InitialParticle {
    pub fn new(position: Vector2, velocity: Vector2, radius: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }
}

/// A hard disc moving through the container.
///
/// `hot` is derived from the velocity magnitude and only ever written by
/// [`Particle::reclassify`]. Every path that can change the magnitude calls
/// it before returning.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: Vector2,
    velocity: Vector2,
    radius: f64,
    speed_threshold: f64,
    hot: bool,
}

impl Particle {
    pub fn new(position: Vector2, velocity: Vector2, radius: f64, speed_threshold: f64) -> Self {
        let mut particle = Self {
            position,
            velocity,
            radius,
            speed_threshold,
            hot: false,
        };
        particle.reclassify();
        particle
    }

    #[inline]
    pub fn position(&self) -> Vector2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn is_hot(&self) -> bool {
        self.hot
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Kinetic energy for unit mass.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.velocity.length_squared()
    }

    /// Tentative next position. Does not mutate the particle.
    #[inline]
    pub fn integrate(&self) -> Vector2 {
        self.position + self.velocity
    }

    /// Recomputes the hot/cold classification from the current velocity.
    pub fn reclassify(&mut self) {
        self.hot = self.speed() >= self.speed_threshold;
    }

    /// Negates the velocity component on `axis`. Speed is unchanged, so the
    /// classification is left alone.
    #[inline]
    pub fn reflect_axis(&mut self, axis: Axis) {
        let value = axis.of(self.velocity);
        axis.set(&mut self.velocity, -value);
    }

    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity;
        self.reclassify();
    }

    /// Commits a position computed by the step pipeline.
    #[inline]
    pub(crate) fn commit_position(&mut self, position: Vector2) {
        self.position = position;
    }

    /// Overwrites the stored classification without looking at the velocity.
    #[cfg(test)]
    pub(crate) fn force_classification(&mut self, hot: bool) {
        self.hot = hot;
    }

    /// Exchanges velocities with `other` and reclassifies both.
    pub(crate) fn exchange_velocity(&mut self, other: &mut Particle) {
        std::mem::swap(&mut self.velocity, &mut other.velocity);
        self.reclassify();
        other.reclassify();
    }

    /// True if the stored classification matches the velocity.
    pub fn classification_is_current(&self) -> bool {
        self.hot == (self.speed() >= self.speed_threshold)
    }
}

/// Read-only view of a particle for drawing or export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub position: Vector2,
    pub radius: f64,
    pub hot: bool,
}

impl From<&Particle> for ParticleView {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position,
            radius: p.radius,
            hot: p.hot,
        }
    }
}
