//! Immutable container geometry shared by every component of a step.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// One half of the container, split by the dividing wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chamber {
    Left,
    Right,
}

/// Rectangular box with a dividing wall at `width / 2` and a gate centred at
/// `height / 2`.
///
/// Built once at start-up and passed by reference into every component call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub width: f64,
    pub height: f64,
    /// Total vertical extent of the gate opening.
    pub gate_size: f64,
    /// Speeds at or above this are hot.
    pub speed_threshold: f64,
}

impl Container {
    /// Creates a validated container.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidContainer` for non-positive or
    /// non-finite dimensions, a gate that is negative or spans the whole
    /// height, or a negative threshold.
    pub fn new(
        width: f64,
        height: f64,
        gate_size: f64,
        speed_threshold: f64,
    ) -> Result<Self, SimulationError> {
        let container = Self {
            width,
            height,
            gate_size,
            speed_threshold,
        };
        container.validate()?;
        Ok(container)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(SimulationError::InvalidContainer(
                "width and height must be finite".to_string(),
            ));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SimulationError::InvalidContainer(format!(
                "width and height must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.gate_size.is_finite() || self.gate_size < 0.0 {
            return Err(SimulationError::InvalidContainer(format!(
                "gate size must be a non-negative number, got {}",
                self.gate_size
            )));
        }
        if self.gate_size >= self.height {
            return Err(SimulationError::InvalidContainer(format!(
                "gate size {} must be smaller than the container height {}",
                self.gate_size, self.height
            )));
        }
        if !self.speed_threshold.is_finite() || self.speed_threshold < 0.0 {
            return Err(SimulationError::InvalidContainer(format!(
                "speed threshold must be a non-negative number, got {}",
                self.speed_threshold
            )));
        }
        Ok(())
    }

    /// x-position of the dividing wall.
    #[inline]
    pub fn divider_x(&self) -> f64 {
        self.width / 2.0
    }

    /// Inclusive y-range of the gate opening.
    #[inline]
    pub fn gate_range(&self) -> (f64, f64) {
        let centre = self.height / 2.0;
        let half = self.gate_size / 2.0;
        (centre - half, centre + half)
    }

    /// True if `y` lies in the gate opening. Both ends count as open.
    #[inline]
    pub fn is_in_gate(&self, y: f64) -> bool {
        let (low, high) = self.gate_range();
        y >= low && y <= high
    }

    #[inline]
    pub fn is_hot(&self, speed: f64) -> bool {
        speed >= self.speed_threshold
    }

    pub fn chamber_of(&self, x: f64) -> Chamber {
        if x < self.divider_x() {
            Chamber::Left
        } else {
            Chamber::Right
        }
    }

    /// Largest radius a particle may have in this container.
    pub fn max_radius(&self) -> f64 {
        self.width.min(self.height) / 2.0
    }
}
