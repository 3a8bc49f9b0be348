#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Motion and limit control for a simulated linear actuator (host-agnostic).
//!
//! A motor is driven by two opposing move inputs plus an alternate-speed
//! input, ramps its velocity trapezoidally, integrates the travelled distance
//! along an axis and moves the attached parts with it. Boundary handling is
//! pluggable: stop at the limit, or reverse and oscillate (eccentric).
//!
//! ## Architecture
//!
//! - **Signals**: edge-triggered boolean lines (`signal` module)
//! - **Velocity**: trapezoidal ramp with zero-crossing reversal (`velocity`)
//! - **Arbitration**: input/command state machine (`arbiter`)
//! - **Limits**: ordered limits and zone evaluation (`limits`), policies (`handler`)
//! - **Position**: distance, parts and limit outputs (`tracker`)
//! - **Sensors**: windowed presence sensors (`range_sensor`)
//! - **Actuator**: the motor entity tying it together (`actuator`, `builder`)
//! - **Runner**: fixed-rate scripted runs (`runner`)
//!
//! All host interaction goes through `actuator_traits::{Placement, SceneLifecycle, Clock}`.
//! Everything here is single-threaded: signals and parts are shared via `Rc`.

pub mod actuator;
pub mod arbiter;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod error;
pub mod handler;
pub mod limits;
pub mod mocks;
pub mod range_sensor;
pub mod runner;
pub mod signal;
pub mod status;
pub mod tracker;
pub mod util;
pub mod velocity;

pub use actuator::{Actuator, Direction, DriveSignals};
pub use arbiter::{Command, DriveInput};
pub use builder::{ActuatorBuilder, Missing, Set};
pub use config::{DriveCfg, TravelCfg};
pub use error::{AbortReason, ActuatorError, BuildError, Result};
pub use handler::{LimitHandler, LimitReaction};
pub use limits::{
    Boundary, LimitConfiguration, LimitFlags, LimitPolicy, ResetPosition, SetOutcome, ZoneLayout,
};
pub use range_sensor::RangeSensor;
pub use runner::{Action, RunParams, RunSummary, Sample, TimedAction};
pub use signal::{DigitalSignal, Edge, SubscriptionId};
pub use status::MotionStatus;
pub use tracker::{LimitOutputs, PositionTracker};
pub use velocity::{RampTick, VelocityController};
