use thiserror::Error;

/// Errors raised while building or auditing a simulation.
///
/// Construction problems (`InvalidContainer`, `InvalidParticle`) are reported
/// by `Simulation::new` and never by `step()`. `InvariantViolation` marks a
/// logic defect in boundary or gate handling and is only produced by
/// `Simulation::check_invariants`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    #[error("Invalid particle #{index}: {reason}")]
    InvalidParticle { index: usize, reason: String },

    #[error("Invariant violated at tick {tick} by particle #{index}: {reason}")]
    InvariantViolation {
        tick: u64,
        index: usize,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = SimulationError::InvalidParticle {
            index: 3,
            reason: "radius must be positive".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("#3"));
        assert!(msg.contains("radius"));

        let err = SimulationError::InvariantViolation {
            tick: 12,
            index: 0,
            reason: "out of bounds".to_string(),
        };
        assert!(err.to_string().contains("tick 12"));
    }
}
