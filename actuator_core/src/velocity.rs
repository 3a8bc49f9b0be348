//! Trapezoidal velocity ramp with a zero-crossing reversal.
//!
//! The controller integrates a constant slope toward a target velocity. The
//! slope is chosen from the signed ramp-up/ramp-down durations depending on
//! whether the magnitude grows or shrinks. A request that flips the sign is
//! split in two legs: decelerate to exactly 0 using the ramp-down time, then
//! accelerate to the new target using the ramp-up time.

use crate::util::finite_or_zero;

/// Outcome of a single `VelocityController::step`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RampTick {
    pub velocity: f64,
    /// The reversal waypoint (0) was reached on this tick.
    pub direction_switched: bool,
    /// The target was reached on this tick by ramping.
    pub reached: bool,
}

#[derive(Debug, Clone)]
pub struct VelocityController {
    current: f64,
    target: f64,
    set_point: f64,
    ramp_up: f64,
    ramp_down: f64,
    /// Signed duration of the active leg; its sign is the slope's sign.
    ramp_time: f64,
    slope: f64,
    /// Change applied on the previous integrating tick.
    delta: f64,
    switch_direction: bool,
    plateau: bool,
    acceleration_enabled: bool,
}

impl Default for VelocityController {
    fn default() -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            set_point: 0.0,
            ramp_up: 0.0,
            ramp_down: 0.0,
            ramp_time: 0.0,
            slope: 0.0,
            delta: 0.0,
            switch_direction: false,
            plateau: true,
            acceleration_enabled: true,
        }
    }
}

/// `value` lies within `tol` of `target` (inclusive on both sides).
#[inline]
fn within(value: f64, target: f64, tol: f64) -> bool {
    value + tol >= target && value - tol <= target
}

impl VelocityController {
    pub fn new(acceleration_enabled: bool) -> Self {
        Self {
            acceleration_enabled,
            ..Self::default()
        }
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Intermediate target of the active leg: 0 while a reversal is pending.
    #[inline]
    pub fn set_point(&self) -> f64 {
        self.set_point
    }

    #[inline]
    pub fn slope(&self) -> f64 {
        self.slope
    }

    #[inline]
    pub fn ramp_time(&self) -> f64 {
        self.ramp_time
    }

    #[inline]
    pub fn ramp_up(&self) -> f64 {
        self.ramp_up
    }

    #[inline]
    pub fn ramp_down(&self) -> f64 {
        self.ramp_down
    }

    #[inline]
    pub fn is_plateau(&self) -> bool {
        self.plateau
    }

    #[inline]
    pub fn is_switching_direction(&self) -> bool {
        self.switch_direction
    }

    #[inline]
    pub fn at_target(&self) -> bool {
        self.current == self.target
    }

    #[inline]
    pub fn acceleration_enabled(&self) -> bool {
        self.acceleration_enabled
    }

    pub fn set_acceleration_enabled(&mut self, enabled: bool) {
        self.acceleration_enabled = enabled;
    }

    /// Seconds from 0 to target. Non-positive or non-finite values are ignored.
    pub fn set_ramp_up(&mut self, secs: f64) -> bool {
        if secs.is_finite() && secs > 0.0 {
            self.ramp_up = secs;
            true
        } else {
            false
        }
    }

    /// Seconds from target to 0. Non-positive or non-finite values are ignored.
    pub fn set_ramp_down(&mut self, secs: f64) -> bool {
        if secs.is_finite() && secs > 0.0 {
            self.ramp_down = secs;
            true
        } else {
            false
        }
    }

    fn store_slope(&mut self, slope: f64) {
        self.slope = finite_or_zero(slope);
    }

    /// Retarget the ramp. Invalid ramp durations keep their previous values;
    /// a non-finite target is rejected and leaves the controller untouched.
    pub fn set_target(&mut self, target: f64, ramp_up_secs: f64, ramp_down_secs: f64) -> bool {
        if !target.is_finite() {
            return false;
        }
        self.set_ramp_up(ramp_up_secs);
        self.set_ramp_down(ramp_down_secs);
        self.target = target;
        self.switch_direction = false;

        let (cur, tgt) = (self.current, target);
        if (cur == 0.0 && tgt > 0.0) || (cur > 0.0 && tgt >= 0.0) {
            self.ramp_time = if tgt < cur {
                -self.ramp_down
            } else {
                self.ramp_up
            };
        } else if (cur == 0.0 && tgt < 0.0) || (cur < 0.0 && tgt <= 0.0) {
            self.ramp_time = if tgt < cur {
                -self.ramp_up
            } else {
                self.ramp_down
            };
        } else if (cur > 0.0 && tgt < 0.0) || (cur < 0.0 && tgt > 0.0) {
            self.switch_direction = true;
            self.ramp_time = if tgt < cur {
                -self.ramp_down
            } else {
                self.ramp_down
            };
        }

        self.set_point = if self.switch_direction { 0.0 } else { tgt };
        self.store_slope((self.set_point - cur).abs() / self.ramp_time);
        true
    }

    /// Second leg of a reversal: accelerate away from 0 toward the target.
    fn switch_ramp(&mut self) {
        self.switch_direction = false;
        self.set_point = self.target;
        self.ramp_time = if self.target < self.current {
            -self.ramp_up
        } else {
            self.ramp_up
        };
        self.store_slope((self.target - self.current).abs() / self.ramp_time);
    }

    /// Advance the ramp by `dt` seconds.
    ///
    /// A reversal spends one whole tick at exactly `0.0` (`direction_switched`
    /// is set on that tick); the new slope applies from the next tick on.
    pub fn step(&mut self, dt: f64) -> RampTick {
        if self.current == self.target {
            return RampTick {
                velocity: self.target,
                ..RampTick::default()
            };
        }

        if !self.acceleration_enabled || self.ramp_time == 0.0 {
            self.current = self.target;
            self.switch_direction = false;
            self.plateau = true;
            return RampTick {
                velocity: self.current,
                ..RampTick::default()
            };
        }

        if self.switch_direction {
            let next = self.current + self.slope * dt;
            let crosses = next == 0.0 || next.signum() != self.current.signum();
            if within(self.current, 0.0, self.delta.abs()) || crosses {
                // Velocity always visits exactly 0 between the two legs.
                self.delta = -self.current;
                self.current = 0.0;
                self.switch_ramp();
                self.plateau = false;
                return RampTick {
                    velocity: 0.0,
                    direction_switched: true,
                    reached: false,
                };
            }
        }

        self.delta = self.slope * dt;
        self.current += self.delta;

        if within(self.current, self.target, self.delta.abs()) {
            self.current = self.target;
            self.plateau = true;
            RampTick {
                velocity: self.current,
                direction_switched: false,
                reached: true,
            }
        } else {
            self.plateau = false;
            RampTick {
                velocity: self.current,
                ..RampTick::default()
            }
        }
    }

    /// Hard stop: velocity, slope and target snap to 0.
    pub fn reset(&mut self) {
        self.current = 0.0;
        self.target = 0.0;
        self.set_point = 0.0;
        self.slope = 0.0;
        self.delta = 0.0;
        self.switch_direction = false;
        self.plateau = true;
    }
}
