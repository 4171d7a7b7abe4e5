//! Per-chamber summaries used to watch the demon do its work.

use serde::{Deserialize, Serialize};

use crate::container::{Chamber, Container};
use crate::particle::Particle;

/// Population and mean kinetic energy of one chamber.
///
/// With unit masses the mean kinetic energy stands in for temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChamberSummary {
    pub count: usize,
    pub hot: usize,
    pub mean_kinetic_energy: f64,
}

impl ChamberSummary {
    pub fn cold(&self) -> usize {
        self.count - self.hot
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChamberStats {
    pub left: ChamberSummary,
    pub right: ChamberSummary,
}

impl ChamberStats {
    pub fn collect(container: &Container, particles: &[Particle]) -> Self {
        let mut left = Accumulator::default();
        let mut right = Accumulator::default();
        for particle in particles {
            let acc = match container.chamber_of(particle.position().x) {
                Chamber::Left => &mut left,
                Chamber::Right => &mut right,
            };
            acc.add(particle);
        }
        Self {
            left: left.finish(),
            right: right.finish(),
        }
    }

    pub fn chamber(&self, chamber: Chamber) -> &ChamberSummary {
        match chamber {
            Chamber::Left => &self.left,
            Chamber::Right => &self.right,
        }
    }

    /// Left minus right mean kinetic energy. Grows positive as hot particles
    /// gather on the left.
    pub fn temperature_gap(&self) -> f64 {
        self.left.mean_kinetic_energy - self.right.mean_kinetic_energy
    }
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    hot: usize,
    energy: f64,
}

impl Accumulator {
    fn add(&mut self, particle: &Particle) {
        self.count += 1;
        if particle.is_hot() {
            self.hot += 1;
        }
        self.energy += particle.kinetic_energy();
    }

    fn finish(self) -> ChamberSummary {
        let mean_kinetic_energy = if self.count == 0 {
            0.0
        } else {
            self.energy / self.count as f64
        };
        ChamberSummary {
            count: self.count,
            hot: self.hot,
            mean_kinetic_energy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Vector2;

    #[test]
    fn splits_particles_by_chamber() {
        let c = Container::new(800.0, 600.0, 100.0, 10.0).unwrap();
        let particles = vec![
            Particle::new(Vector2::new(100.0, 100.0), Vector2::new(12.0, 0.0), 5.0, 10.0),
            Particle::new(Vector2::new(200.0, 100.0), Vector2::new(0.0, 4.0), 5.0, 10.0),
            Particle::new(Vector2::new(600.0, 100.0), Vector2::new(2.0, 0.0), 5.0, 10.0),
        ];
        let stats = ChamberStats::collect(&c, &particles);
        assert_eq!(stats.left.count, 2);
        assert_eq!(stats.left.hot, 1);
        assert_eq!(stats.left.cold(), 1);
        assert!((stats.left.mean_kinetic_energy - 40.0).abs() < 1e-12); // (72 + 8) / 2
        assert_eq!(stats.chamber(Chamber::Right).count, 1);
        assert!((stats.temperature_gap() - 38.0).abs() < 1e-12);
    }

    #[test]
    fn empty_chamber_has_zero_energy() {
        let c = Container::new(800.0, 600.0, 100.0, 10.0).unwrap();
        let stats = ChamberStats::collect(&c, &[]);
        assert_eq!(stats.left, ChamberSummary::default());
    }
}
