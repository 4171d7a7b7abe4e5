//! Particle kinetics and gate admission for a Maxwell's demon simulation.
//!
//! A [`Simulation`] owns the particles and an immutable [`Container`].
//! Each call to [`Simulation::step`] integrates every particle, bounces it off
//! the outer walls, lets the [`GateController`] decide what happens at the
//! dividing wall, commits the result, and finally exchanges velocities between
//! touching particles.

pub mod boundary;
pub mod collision;
pub mod container;
pub mod error;
pub mod gate;
pub mod particle;
pub mod simulation;
pub mod stats;

pub use boundary::BoundaryReflector;
pub use collision::{AllPairs, BroadPhase, CollisionResolver, UniformGrid};
pub use container::{Chamber, Container};
pub use error::SimulationError;
pub use gate::{GateController, GateOutcome, GateStats};
pub use particle::{Axis, InitialParticle, Particle, ParticleView, Vector2};
pub use simulation::Simulation;
pub use stats::{ChamberStats, ChamberSummary};
