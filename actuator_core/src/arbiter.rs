//! Command arbitration between the two opposing move inputs.
//!
//! The arbiter is a pure transition function: it takes the current
//! [`ArbiterState`], one [`ArbiterEvent`] and a snapshot of the motor, and
//! returns the next state plus the [`Effect`] the motor has to carry out.
//! Keeping it free of side effects lets the input rules be tested as a table.
//!
//! Rules for the move inputs:
//! - the first asserted input wins; asserting the opposite one meanwhile is
//!   ignored;
//! - releasing the winning input hands over to the other one if it is still
//!   asserted, otherwise the motor is commanded to stop.

/// Direction of travel requested from the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    #[default]
    Forward,
    Stop,
    Backward,
}

impl Command {
    /// +1, 0 or -1.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Stop => 0.0,
            Self::Backward => -1.0,
        }
    }

    /// Stop has no opposite.
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
            Self::Stop => Self::Stop,
        }
    }
}

/// Input lines the motor listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveInput {
    MoveForward,
    MoveBackward,
    AlternateSpeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterEvent {
    Input { input: DriveInput, active: bool },
    Forward,
    Backward,
    Stop,
    Start,
    SwitchDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArbiterState {
    pub command: Command,
    pub move_forward: bool,
    pub move_backward: bool,
    pub alternate: bool,
}

/// What the motor looks like when the event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorSnapshot {
    /// Velocity is non-zero or a ramp is still in progress.
    pub running: bool,
    /// Last non-zero velocity; its sign picks the direction of a bare start.
    pub last_speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Re-run the velocity controller with the current command.
    Retarget,
    /// Motor was at rest: begin moving with the current command.
    Start,
}

#[inline]
fn kick(snapshot: MotorSnapshot) -> Effect {
    if snapshot.running {
        Effect::Retarget
    } else {
        Effect::Start
    }
}

#[inline]
fn follow(snapshot: MotorSnapshot) -> Effect {
    if snapshot.running {
        Effect::Retarget
    } else {
        Effect::None
    }
}

pub fn transition(
    state: ArbiterState,
    event: ArbiterEvent,
    snapshot: MotorSnapshot,
) -> (ArbiterState, Effect) {
    let mut next = state;
    let effect = match event {
        ArbiterEvent::Input {
            input: DriveInput::MoveForward,
            active,
        } => {
            next.move_forward = active;
            engage(&mut next, Command::Forward, state.move_backward, active, snapshot)
        }
        ArbiterEvent::Input {
            input: DriveInput::MoveBackward,
            active,
        } => {
            next.move_backward = active;
            engage(&mut next, Command::Backward, state.move_forward, active, snapshot)
        }
        ArbiterEvent::Input {
            input: DriveInput::AlternateSpeed,
            active,
        } => {
            next.alternate = active;
            if next.move_forward {
                next.command = Command::Forward;
            } else if next.move_backward {
                next.command = Command::Backward;
            }
            follow(snapshot)
        }
        ArbiterEvent::Forward => {
            next.command = Command::Forward;
            follow(snapshot)
        }
        ArbiterEvent::Backward => {
            next.command = Command::Backward;
            follow(snapshot)
        }
        ArbiterEvent::Stop => {
            next.command = Command::Stop;
            follow(snapshot)
        }
        ArbiterEvent::Start => {
            if next.command == Command::Stop {
                next.command = if snapshot.last_speed >= 0.0 {
                    Command::Forward
                } else {
                    Command::Backward
                };
            }
            kick(snapshot)
        }
        ArbiterEvent::SwitchDirection => {
            if next.command == Command::Stop {
                Effect::None
            } else {
                next.command = next.command.reversed();
                follow(snapshot)
            }
        }
    };
    (next, effect)
}

/// Edge on one move input; `other_active` is the opposing input's level.
fn engage(
    next: &mut ArbiterState,
    own: Command,
    other_active: bool,
    active: bool,
    snapshot: MotorSnapshot,
) -> Effect {
    if active {
        if other_active {
            return Effect::None;
        }
        next.command = own;
        kick(snapshot)
    } else if other_active {
        next.command = own.reversed();
        kick(snapshot)
    } else {
        next.command = Command::Stop;
        follow(snapshot)
    }
}
