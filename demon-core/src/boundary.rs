//! Elastic reflection of particles off the four outer walls.

use crate::container::Container;
use crate::particle::{Axis, Particle, Vector2};

/// Reflects particles off the container's outer rectangle.
///
/// Each axis is handled on its own, so a particle hitting a corner bounces
/// off both walls in the same step. Reflection negates one velocity
/// component and mirrors the coordinate, so speed is always preserved.
pub struct BoundaryReflector;

impl BoundaryReflector {
    /// True if a disc of `radius` centred at `value` touches or crosses
    /// either end of `[0, extent]`.
    #[inline]
    pub fn has_breached(extent: f64, value: f64, radius: f64) -> bool {
        value + radius >= extent || value - radius <= 0.0
    }

    /// Mirrors `value` about the nearer boundary face.
    ///
    /// The low face sits at `radius`, the high face at `extent - radius`.
    #[inline]
    pub fn reflect(extent: f64, value: f64, radius: f64) -> f64 {
        if value < extent / 2.0 {
            2.0 * radius - value
        } else {
            2.0 * (extent - radius) - value
        }
    }

    /// Applies the outer walls to a tentative position, flipping the
    /// particle's velocity on every axis that breached.
    ///
    /// Returns the (possibly mirrored) tentative position.
    pub fn apply(container: &Container, particle: &mut Particle, tentative: Vector2) -> Vector2 {
        let mut next = tentative;
        let radius = particle.radius();
        for (axis, extent) in [(Axis::X, container.width), (Axis::Y, container.height)] {
            let value = axis.of(next);
            if Self::has_breached(extent, value, radius) {
                axis.set(&mut next, Self::reflect(extent, value, radius));
                particle.reflect_axis(axis);
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Container {
        Container::new(800.0, 600.0, 100.0, 10.0).unwrap()
    }

    #[test]
    fn breach_detection_is_inclusive() {
        assert!(BoundaryReflector::has_breached(800.0, 795.0, 5.0));
        assert!(BoundaryReflector::has_breached(800.0, 5.0, 5.0));
        assert!(!BoundaryReflector::has_breached(800.0, 794.0, 5.0));
        assert!(!BoundaryReflector::has_breached(800.0, 6.0, 5.0));
    }

    #[test]
    fn reflect_mirrors_about_faces() {
        // low face at 5: 3 -> 7
        assert_eq!(BoundaryReflector::reflect(800.0, 3.0, 5.0), 7.0);
        // high face at 795: 801 -> 789
        assert_eq!(BoundaryReflector::reflect(800.0, 801.0, 5.0), 789.0);
    }

    #[test]
    fn apply_bounces_off_right_wall() {
        let c = container();
        let mut p = Particle::new(Vector2::new(790.0, 100.0), Vector2::new(8.0, 1.0), 5.0, 10.0);
        let tentative = p.integrate();
        let next = BoundaryReflector::apply(&c, &mut p, tentative);
        assert_eq!(next, Vector2::new(792.0, 101.0));
        assert_eq!(p.velocity(), Vector2::new(-8.0, 1.0));
    }

    #[test]
    fn corner_reflects_both_axes() {
        let c = container();
        let mut p = Particle::new(Vector2::new(7.0, 7.0), Vector2::new(-4.0, -4.0), 5.0, 10.0);
        let speed = p.speed();
        let tentative = p.integrate();
        let next = BoundaryReflector::apply(&c, &mut p, tentative);
        assert_eq!(next, Vector2::new(7.0, 7.0));
        assert_eq!(p.velocity(), Vector2::new(4.0, 4.0));
        assert_eq!(p.speed(), speed);
    }

    #[test]
    fn interior_motion_untouched() {
        let c = container();
        let mut p = Particle::new(Vector2::new(100.0, 100.0), Vector2::new(3.0, -2.0), 5.0, 10.0);
        let tentative = p.integrate();
        let next = BoundaryReflector::apply(&c, &mut p, tentative);
        assert_eq!(next, Vector2::new(103.0, 98.0));
        assert_eq!(p.velocity(), Vector2::new(3.0, -2.0));
    }
}
