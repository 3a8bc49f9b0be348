//! Runtime configuration consumed by the actuator builder.

use actuator_traits::Vec3;

use crate::limits::{LimitPolicy, ResetPosition, ZoneLayout};

/// Motor speeds and ramps.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveCfg {
    /// m/s, > 0
    pub speed: f64,
    /// m/s while the alternate-speed input is asserted, > 0
    pub alternate_speed: f64,
    pub use_ramp: bool,
    pub ramp_up_ms: f64,
    pub ramp_down_ms: f64,
}

impl Default for DriveCfg {
    fn default() -> Self {
        Self {
            speed: 0.3,
            alternate_speed: 0.1,
            use_ramp: true,
            ramp_up_ms: 300.0,
            ramp_down_ms: 300.0,
        }
    }
}

/// Travel range, limit behaviour and geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelCfg {
    pub min: f64,
    pub mid: f64,
    pub max: f64,
    pub tolerance: f64,
    pub layout: ZoneLayout,
    pub policy: LimitPolicy,
    pub reset_position: ResetPosition,
    /// Normalized by the builder.
    pub axis: Vec3,
    /// Distance already travelled when the scene was saved.
    pub initial_position: f64,
}

impl Default for TravelCfg {
    fn default() -> Self {
        Self {
            min: 0.0,
            mid: 0.25,
            max: 0.5,
            tolerance: 0.05,
            layout: ZoneLayout::MinMidMax,
            policy: LimitPolicy::Stop,
            reset_position: ResetPosition::Min,
            axis: Vec3::UNIT_Z,
            initial_position: 0.0,
        }
    }
}
