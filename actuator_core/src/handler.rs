//! Limit policies: what happens when the carriage reaches a boundary.

use crate::arbiter::Command;
use crate::limits::{Boundary, LimitConfiguration, LimitFlags, LimitPolicy};

/// What the motor has to do after a moving step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitReaction {
    None,
    /// Clamp to the boundary and hard-stop.
    Clamp(Boundary),
    /// Retarget away from the boundary without clamping.
    Redirect(Boundary),
}

/// Eccentric memory: the boundary last hit and whether the reversal is
/// still under way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Approach {
    last: Option<Boundary>,
    transitioning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitHandler {
    policy: LimitPolicy,
    approach: Approach,
}

impl LimitHandler {
    pub fn new(policy: LimitPolicy) -> Self {
        Self {
            policy,
            approach: Approach::default(),
        }
    }

    #[inline]
    pub fn policy(&self) -> LimitPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: LimitPolicy) {
        self.policy = policy;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.approach = Approach::default();
    }

    /// +1 after hitting max, -1 after hitting min, 0 when nothing is remembered.
    pub fn last_approach_direction(&self) -> f64 {
        self.approach.last.map_or(0.0, Boundary::toward_sign)
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.approach.transitioning
    }

    /// Reversal finished (zero crossing or target reached).
    pub fn settle(&mut self) {
        self.approach.transitioning = false;
    }

    pub fn assess(
        &mut self,
        limits: &LimitConfiguration,
        position: f64,
        velocity: f64,
        command: Command,
    ) -> LimitReaction {
        let Some(boundary) = limits.overshoot(position, velocity) else {
            return LimitReaction::None;
        };
        match self.policy {
            LimitPolicy::Stop => LimitReaction::Clamp(boundary),
            LimitPolicy::Eccentric => {
                // Still decelerating out of this boundary.
                if command == Command::Stop
                    || (self.approach.transitioning && self.approach.last == Some(boundary))
                {
                    return LimitReaction::None;
                }
                self.approach = Approach {
                    last: Some(boundary),
                    transitioning: true,
                };
                LimitReaction::Redirect(boundary)
            }
        }
    }

    /// Sign applied to the commanded speed when the motor is retargeted.
    /// Once a boundary is remembered the eccentric motor keeps heading away
    /// from it, also while the reversal is still under way.
    pub fn target_sign(&self, command: Command) -> f64 {
        match (self.policy, command) {
            (LimitPolicy::Eccentric, Command::Forward | Command::Backward) => self
                .approach
                .last
                .map_or(command.sign(), Boundary::away_sign),
            _ => command.sign(),
        }
    }

    /// Stop policy refuses to drive further into an active limit.
    pub fn blocks(&self, outputs: LimitFlags, target: f64) -> bool {
        self.policy == LimitPolicy::Stop
            && ((outputs.min && target < 0.0) || (outputs.max && target > 0.0))
    }
}
