//! Pairwise particle collisions.
//!
//! Colliding discs exchange velocities (equal masses, no contact normal).
//! Pairs are always resolved in ascending `(i, j)` order with `i < j`, which
//! makes the outcome deterministic for a fixed particle ordering. A
//! [`BroadPhase`] only narrows down which pairs get the distance test; it
//! never changes the order or the result.

use std::collections::HashMap;

use log::trace;
use smallvec::SmallVec;

use crate::particle::Particle;

/// Produces the candidate pairs tested by the narrow phase.
///
/// Implementations must fill `pairs` with index pairs `(i, j)`, `i < j`,
/// sorted ascending and without duplicates, and must include every pair
/// whose discs overlap.
pub trait BroadPhase: Send {
    fn candidate_pairs(&mut self, particles: &[Particle], pairs: &mut Vec<(usize, usize)>);

    fn name(&self) -> &'static str;
}

/// Every unordered pair. O(n²), fine for a few hundred particles.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllPairs;

impl BroadPhase for AllPairs {
    fn candidate_pairs(&mut self, particles: &[Particle], pairs: &mut Vec<(usize, usize)>) {
        pairs.clear();
        let n = particles.len();
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((i, j));
            }
        }
    }

    fn name(&self) -> &'static str {
        "all_pairs"
    }
}

/// Uniform spatial hash over the container.
///
/// The effective cell size is never smaller than the largest particle
/// diameter, so any two overlapping discs sit in the same or adjacent cells.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    cell_size: f64,
    cells: HashMap<(i32, i32), SmallVec<[usize; 8]>>,
}

impl UniformGrid {
    pub fn new(cell_size: f64) -> Self {
        UniformGrid {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_of(x: f64, y: f64, cell_size: f64) -> (i32, i32) {
        ((x / cell_size).floor() as i32, (y / cell_size).floor() as i32)
    }

    fn rebuild(&mut self, particles: &[Particle], cell_size: f64) {
        self.cells.clear();
        for (index, particle) in particles.iter().enumerate() {
            let p = particle.position();
            self.cells
                .entry(Self::cell_of(p.x, p.y, cell_size))
                .or_default()
                .push(index);
        }
    }
}

impl BroadPhase for UniformGrid {
    fn candidate_pairs(&mut self, particles: &[Particle], pairs: &mut Vec<(usize, usize)>) {
        pairs.clear();
        let max_diameter = particles
            .iter()
            .map(|p| 2.0 * p.radius())
            .fold(0.0_f64, f64::max);
        let cell_size = self.cell_size.max(max_diameter);
        if cell_size <= 0.0 {
            return AllPairs.candidate_pairs(particles, pairs);
        }

        self.rebuild(particles, cell_size);

        for (i, particle) in particles.iter().enumerate() {
            let p = particle.position();
            let (cx, cy) = Self::cell_of(p.x, p.y, cell_size);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    if let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) {
                        pairs.extend(bucket.iter().filter(|&&j| j > i).map(|&j| (i, j)));
                    }
                }
            }
        }

        pairs.sort_unstable();
        pairs.dedup();
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}

/// Detects overlapping pairs and exchanges their velocities.
pub struct CollisionResolver {
    broad_phase: Box<dyn BroadPhase>,
    pairs: Vec<(usize, usize)>,
}

impl CollisionResolver {
    pub fn new(broad_phase: Box<dyn BroadPhase>) -> Self {
        Self {
            broad_phase,
            pairs: Vec::new(),
        }
    }

    pub fn broad_phase_name(&self) -> &'static str {
        self.broad_phase.name()
    }

    /// True if the two discs touch or overlap.
    #[inline]
    pub fn overlaps(a: &Particle, b: &Particle) -> bool {
        a.position().distance(b.position()) <= a.radius() + b.radius()
    }

    /// Exchanges velocities if the discs overlap and reports whether they did.
    pub fn resolve(a: &mut Particle, b: &mut Particle) -> bool {
        if !Self::overlaps(a, b) {
            return false;
        }
        a.exchange_velocity(b);
        true
    }

    /// Runs the narrow phase over all candidate pairs, in ascending order.
    ///
    /// Returns the number of collisions resolved.
    pub fn resolve_all(&mut self, particles: &mut [Particle]) -> usize {
        self.broad_phase
            .candidate_pairs(particles, &mut self.pairs);

        let mut collisions = 0;
        for &(i, j) in &self.pairs {
            let (head, tail) = particles.split_at_mut(j);
            if Self::resolve(&mut head[i], &mut tail[0]) {
                trace!("collision between particles {} and {}", i, j);
                collisions += 1;
            }
        }
        collisions
    }
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(Box::new(AllPairs))
    }
}
