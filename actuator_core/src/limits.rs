//! Travel limits, zone evaluation and the limit-policy vocabulary.

/// End of the travel range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Min,
    Max,
}

impl Boundary {
    /// Sign of a velocity pointing into this boundary.
    #[inline]
    pub fn toward_sign(self) -> f64 {
        match self {
            Self::Min => -1.0,
            Self::Max => 1.0,
        }
    }

    /// Sign of a velocity pointing away from this boundary.
    #[inline]
    pub fn away_sign(self) -> f64 {
        -self.toward_sign()
    }
}

/// Where `calibrate` puts the carriage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPosition {
    #[default]
    Min,
    Mid,
    Max,
}

/// Which limit outputs exist on the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneLayout {
    /// End-of-travel indicator only.
    Max,
    MinMax,
    #[default]
    MinMidMax,
}

impl ZoneLayout {
    #[inline]
    pub fn drives_min(self) -> bool {
        !matches!(self, Self::Max)
    }

    #[inline]
    pub fn drives_mid(self) -> bool {
        matches!(self, Self::MinMidMax)
    }
}

/// Reaction to reaching a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitPolicy {
    /// Clamp to the boundary and hard-stop.
    #[default]
    Stop,
    /// Reverse at the boundary and oscillate between min and max.
    Eccentric,
}

/// Levels the limit outputs should take at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitFlags {
    pub min: bool,
    pub mid: bool,
    pub max: bool,
}

/// Result of a guarded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Changed,
    Unchanged,
    Rejected,
}

/// Ordered travel limits with a shared tolerance.
///
/// `min < mid < max` and `tolerance >= 0` hold after every write; a write
/// that would break them is rejected and leaves the configuration as it was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitConfiguration {
    min: f64,
    mid: f64,
    max: f64,
    tolerance: f64,
}

impl Default for LimitConfiguration {
    fn default() -> Self {
        Self {
            min: 0.0,
            mid: 0.25,
            max: 0.5,
            tolerance: 0.05,
        }
    }
}

impl LimitConfiguration {
    /// `None` if the values are not finite and strictly ordered.
    pub fn new(min: f64, mid: f64, max: f64, tolerance: f64) -> Option<Self> {
        let all_finite = [min, mid, max, tolerance].iter().all(|v| v.is_finite());
        if all_finite && min < mid && mid < max && tolerance >= 0.0 {
            Some(Self {
                min,
                mid,
                max,
                tolerance,
            })
        } else {
            None
        }
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn mid(&self) -> f64 {
        self.mid
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn write(slot: &mut f64, value: f64, valid: bool) -> SetOutcome {
        if !value.is_finite() || !valid {
            SetOutcome::Rejected
        } else if *slot == value {
            SetOutcome::Unchanged
        } else {
            *slot = value;
            SetOutcome::Changed
        }
    }

    pub fn set_min(&mut self, value: f64) -> SetOutcome {
        let valid = value < self.mid;
        Self::write(&mut self.min, value, valid)
    }

    pub fn set_mid(&mut self, value: f64) -> SetOutcome {
        let valid = value > self.min && value < self.max;
        Self::write(&mut self.mid, value, valid)
    }

    pub fn set_max(&mut self, value: f64) -> SetOutcome {
        let valid = value > self.mid;
        Self::write(&mut self.max, value, valid)
    }

    pub fn set_tolerance(&mut self, value: f64) -> SetOutcome {
        let valid = value >= 0.0;
        Self::write(&mut self.tolerance, value, valid)
    }

    pub fn position_of(&self, at: ResetPosition) -> f64 {
        match at {
            ResetPosition::Min => self.min,
            ResetPosition::Mid => self.mid,
            ResetPosition::Max => self.max,
        }
    }

    pub fn boundary(&self, b: Boundary) -> f64 {
        match b {
            Boundary::Min => self.min,
            Boundary::Max => self.max,
        }
    }

    /// Boundary the carriage is at or past while still moving into it.
    pub fn overshoot(&self, position: f64, velocity: f64) -> Option<Boundary> {
        if position >= self.max && velocity > 0.0 {
            Some(Boundary::Max)
        } else if position <= self.min && velocity < 0.0 {
            Some(Boundary::Min)
        } else {
            None
        }
    }

    /// Output levels at `position`.
    ///
    /// Each zone switches on and off at the same threshold, so the result
    /// depends on the position only:
    /// - max: `position >= max - tol`
    /// - mid: `mid - tol <= position <= mid + tol`
    /// - min: `position <= min + tol`
    pub fn zones_at(&self, position: f64, layout: ZoneLayout) -> LimitFlags {
        let tol = self.tolerance;
        LimitFlags {
            max: position >= self.max - tol,
            mid: layout.drives_mid() && position >= self.mid - tol && position <= self.mid + tol,
            min: layout.drives_min() && position <= self.min + tol,
        }
    }
}
