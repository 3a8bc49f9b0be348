//! Type-state builder for `Actuator`.
//!
//! The builder enforces at compile time that a scene handle is provided
//! before `build()` is available. `try_build()` is always available for
//! dynamic checks and reports `BuildError::MissingScene` otherwise.

use std::marker::PhantomData;
use std::rc::Rc;

use actuator_traits::{Placement, SceneLifecycle};

use crate::actuator::{Actuator, ActuatorParts, DriveSignals};
use crate::config::{DriveCfg, TravelCfg};
use crate::error::{BuildError, Result};
use crate::limits::LimitConfiguration;
use crate::range_sensor::RangeSensor;
use crate::tracker::{LimitOutputs, PositionTracker};

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

struct SensorSpec {
    symbol: Option<String>,
    center: f64,
    width: f64,
}

/// Builder for `Actuator`. All fields are validated on `build()`.
pub struct ActuatorBuilder<Sc> {
    name: String,
    drive: Option<DriveCfg>,
    travel: Option<TravelCfg>,
    inputs: Option<DriveSignals>,
    parts: Vec<(Box<dyn Placement>, f64)>,
    sensors: Vec<SensorSpec>,
    scene: Option<Rc<dyn SceneLifecycle>>,
    _sc: PhantomData<Sc>,
}

impl ActuatorBuilder<Missing> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            drive: None,
            travel: None,
            inputs: None,
            parts: Vec::new(),
            sensors: Vec::new(),
            scene: None,
            _sc: PhantomData,
        }
    }

    /// Scene lifecycle the actuator consults before touching part positions.
    pub fn with_scene(self, scene: Rc<dyn SceneLifecycle>) -> ActuatorBuilder<Set> {
        ActuatorBuilder {
            name: self.name,
            drive: self.drive,
            travel: self.travel,
            inputs: self.inputs,
            parts: self.parts,
            sensors: self.sensors,
            scene: Some(scene),
            _sc: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state.
impl<Sc> ActuatorBuilder<Sc> {
    pub fn with_drive(mut self, drive: DriveCfg) -> Self {
        self.drive = Some(drive);
        self
    }

    pub fn with_travel(mut self, travel: TravelCfg) -> Self {
        self.travel = Some(travel);
        self
    }

    /// Use host-owned input lines instead of fresh ones.
    pub fn with_inputs(mut self, inputs: DriveSignals) -> Self {
        self.inputs = Some(inputs);
        self
    }

    pub fn with_part(mut self, part: impl Placement + 'static, gear: f64) -> Self {
        self.parts.push((Box::new(part), gear));
        self
    }

    pub fn with_sensor(mut self, center: f64, width: f64) -> Self {
        self.sensors.push(SensorSpec {
            symbol: None,
            center,
            width,
        });
        self
    }

    pub fn with_named_sensor(mut self, symbol: impl Into<String>, center: f64, width: f64) -> Self {
        self.sensors.push(SensorSpec {
            symbol: Some(symbol.into()),
            center,
            width,
        });
        self
    }

    /// Fallible build available in any type-state.
    pub fn try_build(self) -> Result<Actuator> {
        let scene = self
            .scene
            .ok_or_else(|| eyre::Report::new(BuildError::MissingScene))?;
        let drive = self.drive.unwrap_or_default();
        let travel = self.travel.unwrap_or_default();

        // ── Validation ───────────────────────────────────────────────────────
        if !(drive.speed.is_finite() && drive.speed > 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "speed must be > 0",
            )));
        }
        if !(drive.alternate_speed.is_finite() && drive.alternate_speed > 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "alternate speed must be > 0",
            )));
        }
        if !(drive.ramp_up_ms.is_finite() && drive.ramp_up_ms >= 0.0)
            || !(drive.ramp_down_ms.is_finite() && drive.ramp_down_ms >= 0.0)
        {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "ramp times must be >= 0",
            )));
        }
        let limits =
            LimitConfiguration::new(travel.min, travel.mid, travel.max, travel.tolerance)
                .ok_or_else(|| {
                    eyre::Report::new(BuildError::InvalidConfig(
                        "limits must satisfy min < mid < max and tolerance >= 0",
                    ))
                })?;
        let axis = travel.axis.normalized().ok_or_else(|| {
            eyre::Report::new(BuildError::InvalidConfig(
                "axis must be a non-zero finite vector",
            ))
        })?;
        if !(limits.min()..=limits.max()).contains(&travel.initial_position) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "initial position must be within [min, max]",
            )));
        }

        let mut drive = drive;
        if drive.ramp_up_ms == 0.0 && drive.ramp_down_ms == 0.0 {
            drive.use_ramp = false;
        }

        let mut tracker = PositionTracker::new(
            limits,
            travel.layout,
            axis,
            LimitOutputs::new(&self.name),
        );
        for (part, gear) in self.parts {
            tracker.add_part(part, gear)?;
        }
        tracker.set_position_unsynced(travel.initial_position);

        let mut sensors = Vec::with_capacity(self.sensors.len());
        for (i, spec) in self.sensors.into_iter().enumerate() {
            let symbol = spec
                .symbol
                .unwrap_or_else(|| format!("{}.sensor.{i}", self.name));
            let sensor = RangeSensor::new(symbol, spec.center, spec.width).ok_or_else(|| {
                eyre::Report::new(BuildError::InvalidConfig(
                    "sensor width must be > 0 and center finite",
                ))
            })?;
            sensors.push(sensor);
        }

        let inputs = self
            .inputs
            .unwrap_or_else(|| DriveSignals::new(&self.name));

        Ok(Actuator::from_parts(ActuatorParts {
            name: self.name,
            drive,
            tracker,
            policy: travel.policy,
            reset_position: travel.reset_position,
            inputs,
            sensors,
            scene,
        }))
    }
}

impl ActuatorBuilder<Set> {
    /// Validate and build. Only available once a scene is set.
    pub fn build(self) -> Result<Actuator> {
        self.try_build()
    }
}
