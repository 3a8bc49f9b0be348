//! `From` implementations bridging `actuator_config` types to `actuator_core` types.

use actuator_traits::Vec3;

use crate::arbiter::DriveInput;
use crate::config::{DriveCfg, TravelCfg};
use crate::limits::{LimitPolicy, ResetPosition, ZoneLayout};
use crate::runner::{Action, TimedAction};

// ── DriveCfg ─────────────────────────────────────────────────────────────────

impl From<&actuator_config::DriveCfg> for DriveCfg {
    fn from(c: &actuator_config::DriveCfg) -> Self {
        Self {
            speed: c.speed,
            alternate_speed: c.alternate_speed,
            use_ramp: c.use_ramp,
            ramp_up_ms: c.ramp_up_ms,
            ramp_down_ms: c.ramp_down_ms,
        }
    }
}

// ── Limit vocabulary ─────────────────────────────────────────────────────────

impl From<actuator_config::ZoneLayout> for ZoneLayout {
    fn from(c: actuator_config::ZoneLayout) -> Self {
        match c {
            actuator_config::ZoneLayout::Max => Self::Max,
            actuator_config::ZoneLayout::MinMax => Self::MinMax,
            actuator_config::ZoneLayout::MinMidMax => Self::MinMidMax,
        }
    }
}

impl From<actuator_config::LimitPolicy> for LimitPolicy {
    fn from(c: actuator_config::LimitPolicy) -> Self {
        match c {
            actuator_config::LimitPolicy::Stop => Self::Stop,
            actuator_config::LimitPolicy::Eccentric => Self::Eccentric,
        }
    }
}

impl From<actuator_config::ResetPosition> for ResetPosition {
    fn from(c: actuator_config::ResetPosition) -> Self {
        match c {
            actuator_config::ResetPosition::Min => Self::Min,
            actuator_config::ResetPosition::Mid => Self::Mid,
            actuator_config::ResetPosition::Max => Self::Max,
        }
    }
}

// ── TravelCfg ────────────────────────────────────────────────────────────────

impl From<&actuator_config::TravelCfg> for TravelCfg {
    fn from(c: &actuator_config::TravelCfg) -> Self {
        Self {
            min: c.min,
            mid: c.mid,
            max: c.max,
            tolerance: c.tolerance,
            layout: c.layout.into(),
            policy: c.policy.into(),
            reset_position: c.reset_position.into(),
            axis: Vec3::from(c.axis),
            initial_position: c.initial_position,
        }
    }
}

// ── Script ───────────────────────────────────────────────────────────────────

impl From<&actuator_config::ScriptStep> for TimedAction {
    fn from(s: &actuator_config::ScriptStep) -> Self {
        use actuator_config::ScriptAction as A;
        let level = s.level.unwrap_or(false);
        let action = match s.action {
            A::MoveForward => Action::Input(DriveInput::MoveForward, level),
            A::MoveBackward => Action::Input(DriveInput::MoveBackward, level),
            A::AlternateSpeed => Action::Input(DriveInput::AlternateSpeed, level),
            A::Ready => Action::Ready(level),
            A::Forward => Action::Forward,
            A::Backward => Action::Backward,
            A::Stop => Action::Stop,
            A::Start => Action::Start,
            A::SwitchDirection => Action::SwitchDirection,
            A::Calibrate => Action::Calibrate,
            A::Reset => Action::Reset,
            A::HardStop => Action::HardStop,
        };
        Self {
            at_ms: s.time_ms,
            action,
        }
    }
}
