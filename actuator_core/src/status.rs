//! Outcome of a single `Actuator::step`.

use crate::limits::Boundary;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionStatus {
    /// Not moving.
    Idle,
    /// Velocity ramp still in progress.
    Ramping { velocity: f64 },
    /// Moving at the target velocity.
    Cruising { velocity: f64 },
    /// Clamped to a boundary and hard-stopped (stop policy).
    LimitStop(Boundary),
    /// Reversing away from a boundary (eccentric policy).
    Redirected(Boundary),
}

impl MotionStatus {
    pub fn is_moving(&self) -> bool {
        matches!(self, Self::Ramping { .. } | Self::Cruising { .. } | Self::Redirected(_))
    }
}
