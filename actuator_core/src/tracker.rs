//! Travelled distance along the axis, the parts it drives, and the limit
//! outputs derived from it.

use actuator_traits::{Placement, Vec3};

use crate::error::{ActuatorError, Result};
use crate::limits::{Boundary, LimitConfiguration, LimitFlags, ResetPosition, ZoneLayout};
use crate::signal::DigitalSignal;

/// Min / mid / max indicator lines.
#[derive(Debug, Clone)]
pub struct LimitOutputs {
    pub min: DigitalSignal,
    pub mid: DigitalSignal,
    pub max: DigitalSignal,
}

impl LimitOutputs {
    pub fn new(prefix: &str) -> Self {
        Self {
            min: DigitalSignal::new(format!("{prefix}.limit.min")),
            mid: DigitalSignal::new(format!("{prefix}.limit.mid")),
            max: DigitalSignal::new(format!("{prefix}.limit.max")),
        }
    }

    pub fn flags(&self) -> LimitFlags {
        LimitFlags {
            min: self.min.is_active(),
            mid: self.mid.is_active(),
            max: self.max.is_active(),
        }
    }

    fn apply(&self, flags: LimitFlags) {
        self.max.set(flags.max);
        self.mid.set(flags.mid);
        self.min.set(flags.min);
    }

    fn clear(&self) {
        self.apply(LimitFlags::default());
    }
}

struct MovedPart {
    part: Box<dyn Placement>,
    gear: f64,
    /// Local position when the part was attached.
    origin: Vec3,
}

pub struct PositionTracker {
    position: f64,
    axis: Vec3,
    limits: LimitConfiguration,
    layout: ZoneLayout,
    parts: Vec<MovedPart>,
    outputs: LimitOutputs,
}

impl std::fmt::Debug for PositionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionTracker")
            .field("position", &self.position)
            .field("axis", &self.axis)
            .field("limits", &self.limits)
            .field("layout", &self.layout)
            .field("parts", &self.parts.len())
            .finish_non_exhaustive()
    }
}

impl PositionTracker {
    /// `axis` must already be a unit vector.
    pub fn new(limits: LimitConfiguration, layout: ZoneLayout, axis: Vec3, outputs: LimitOutputs) -> Self {
        Self {
            position: 0.0,
            axis,
            limits,
            layout,
            parts: Vec::new(),
            outputs,
        }
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    #[inline]
    pub fn limits(&self) -> &LimitConfiguration {
        &self.limits
    }

    pub(crate) fn limits_mut(&mut self) -> &mut LimitConfiguration {
        &mut self.limits
    }

    #[inline]
    pub fn layout(&self) -> ZoneLayout {
        self.layout
    }

    pub fn outputs(&self) -> &LimitOutputs {
        &self.outputs
    }

    pub(crate) fn set_layout(&mut self, layout: ZoneLayout) {
        self.layout = layout;
        self.reset_limit_signals();
        self.update_limit_signals();
    }

    /// Returns false for a zero or non-finite axis.
    pub(crate) fn set_axis(&mut self, axis: Vec3) -> bool {
        match axis.normalized() {
            Some(unit) => {
                self.axis = unit;
                true
            }
            None => false,
        }
    }

    /// Set the travelled distance without moving any part.
    pub(crate) fn set_position_unsynced(&mut self, position: f64) {
        self.position = position;
    }

    /// Move the parts by `delta` along the axis, scaled by each gear ratio.
    pub fn translate(&mut self, delta: f64) {
        if delta == 0.0 {
            return;
        }
        for moved in &mut self.parts {
            let step = self.axis * (delta * moved.gear);
            let at = moved.part.local_position();
            moved.part.set_local_position(at + step);
        }
    }

    /// Integrate one tick of travel.
    pub fn advance(&mut self, delta: f64) {
        self.position += delta;
        self.translate(delta);
        self.update_limit_signals();
    }

    /// Pull position back onto `boundary`; the residual is applied to the parts.
    pub fn clamp_to(&mut self, boundary: Boundary) -> f64 {
        let limit = self.limits.boundary(boundary);
        let residual = limit - self.position;
        self.position = limit;
        self.translate(residual);
        self.update_limit_signals();
        residual
    }

    /// Jump to a named position, dragging the parts along.
    pub fn move_to(&mut self, at: ResetPosition) {
        let limit = self.limits.position_of(at);
        let delta = self.position - limit;
        self.position = limit;
        self.translate(-delta);
    }

    pub fn update_limit_signals(&self) {
        self.outputs
            .apply(self.limits.zones_at(self.position, self.layout));
    }

    pub fn reset_limit_signals(&self) {
        self.outputs.clear();
    }

    /// Re-apply the stored distance to parts loaded at their design position.
    pub fn restore(&mut self) {
        let distance = self.position;
        self.translate(distance);
        self.update_limit_signals();
    }

    /// Put every part back where it was attached and zero the distance.
    pub fn rewind(&mut self) {
        for moved in &mut self.parts {
            moved.part.set_local_position(moved.origin);
        }
        self.position = 0.0;
    }

    /// Attach a part. Re-adding a name replaces the earlier entry in place.
    pub fn add_part(&mut self, part: Box<dyn Placement>, gear: f64) -> Result<()> {
        if !part.is_configured() {
            tracing::error!(part = part.name(), "part is not attached to an assembly");
            return Err(eyre::Report::new(ActuatorError::PartNotConfigured(
                part.name().to_string(),
            )));
        }
        if !(gear.is_finite() && gear > 0.0) {
            return Err(eyre::Report::new(ActuatorError::State(format!(
                "gear for part `{}` must be > 0, got {gear}",
                part.name()
            ))));
        }
        let entry = MovedPart {
            origin: part.local_position(),
            part,
            gear,
        };
        match self
            .parts
            .iter_mut()
            .find(|m| m.part.name() == entry.part.name())
        {
            Some(slot) => *slot = entry,
            None => self.parts.push(entry),
        }
        Ok(())
    }

    pub fn remove_part(&mut self, name: &str) -> bool {
        let before = self.parts.len();
        self.parts.retain(|m| m.part.name() != name);
        self.parts.len() != before
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|m| m.part.name())
    }

    pub fn gear_of(&self, name: &str) -> Option<f64> {
        self.parts
            .iter()
            .find(|m| m.part.name() == name)
            .map(|m| m.gear)
    }
}
