use actuator_core::arbiter::{
    ArbiterEvent, ArbiterState, Effect, MotorSnapshot, transition,
};
use actuator_core::{Command, DriveInput};
use rstest::rstest;

const IDLE: MotorSnapshot = MotorSnapshot {
    running: false,
    last_speed: 0.0,
};
const RUNNING: MotorSnapshot = MotorSnapshot {
    running: true,
    last_speed: 0.3,
};

fn input(input: DriveInput, active: bool) -> ArbiterEvent {
    ArbiterEvent::Input { input, active }
}

fn state(command: Command, fwd: bool, bwd: bool) -> ArbiterState {
    ArbiterState {
        command,
        move_forward: fwd,
        move_backward: bwd,
        alternate: false,
    }
}

#[rstest]
// Asserting one input while the other is idle claims the motor.
#[case(state(Command::Stop, false, false), input(DriveInput::MoveForward, true), IDLE, Command::Forward, Effect::Start)]
#[case(state(Command::Stop, false, false), input(DriveInput::MoveBackward, true), IDLE, Command::Backward, Effect::Start)]
#[case(state(Command::Backward, false, false), input(DriveInput::MoveForward, true), RUNNING, Command::Forward, Effect::Retarget)]
// First asserted wins.
#[case(state(Command::Forward, true, false), input(DriveInput::MoveBackward, true), RUNNING, Command::Forward, Effect::None)]
#[case(state(Command::Backward, false, true), input(DriveInput::MoveForward, true), RUNNING, Command::Backward, Effect::None)]
// Releasing the winner hands over to a still-asserted opposite input.
#[case(state(Command::Forward, true, true), input(DriveInput::MoveForward, false), RUNNING, Command::Backward, Effect::Retarget)]
#[case(state(Command::Forward, true, true), input(DriveInput::MoveForward, false), IDLE, Command::Backward, Effect::Start)]
// Releasing with nothing else asserted stops.
#[case(state(Command::Forward, true, false), input(DriveInput::MoveForward, false), RUNNING, Command::Stop, Effect::Retarget)]
#[case(state(Command::Forward, true, false), input(DriveInput::MoveForward, false), IDLE, Command::Stop, Effect::None)]
#[case(state(Command::Backward, false, true), input(DriveInput::MoveBackward, false), RUNNING, Command::Stop, Effect::Retarget)]
// Explicit commands only retarget a running motor.
#[case(state(Command::Forward, false, false), ArbiterEvent::SwitchDirection, RUNNING, Command::Backward, Effect::Retarget)]
#[case(state(Command::Backward, false, false), ArbiterEvent::SwitchDirection, IDLE, Command::Forward, Effect::None)]
#[case(state(Command::Stop, false, false), ArbiterEvent::SwitchDirection, RUNNING, Command::Stop, Effect::None)]
#[case(state(Command::Forward, false, false), ArbiterEvent::Stop, RUNNING, Command::Stop, Effect::Retarget)]
#[case(state(Command::Stop, false, false), ArbiterEvent::Backward, IDLE, Command::Backward, Effect::None)]
#[case(state(Command::Forward, false, false), ArbiterEvent::Start, IDLE, Command::Forward, Effect::Start)]
fn transition_table(
    #[case] from: ArbiterState,
    #[case] event: ArbiterEvent,
    #[case] snapshot: MotorSnapshot,
    #[case] command: Command,
    #[case] effect: Effect,
) {
    let (next, got) = transition(from, event, snapshot);
    assert_eq!(next.command, command);
    assert_eq!(got, effect);
}

#[rstest]
#[case(0.2, Command::Forward)]
#[case(0.0, Command::Forward)]
#[case(-0.2, Command::Backward)]
fn start_from_stop_follows_last_speed(#[case] last_speed: f64, #[case] expected: Command) {
    let snap = MotorSnapshot {
        running: false,
        last_speed,
    };
    let (next, effect) = transition(state(Command::Stop, false, false), ArbiterEvent::Start, snap);
    assert_eq!(next.command, expected);
    assert_eq!(effect, Effect::Start);
}

#[test]
fn alternate_speed_rederives_command_from_asserted_input() {
    let from = state(Command::Stop, false, true);
    let (next, effect) = transition(from, input(DriveInput::AlternateSpeed, true), RUNNING);
    assert!(next.alternate);
    assert_eq!(next.command, Command::Backward);
    assert_eq!(effect, Effect::Retarget);

    let (next, effect) = transition(next, input(DriveInput::AlternateSpeed, false), IDLE);
    assert!(!next.alternate);
    assert_eq!(effect, Effect::None);
}

#[test]
fn input_levels_are_tracked() {
    let s = ArbiterState::default();
    assert_eq!(s.command, Command::Forward);
    let (s, _) = transition(s, input(DriveInput::MoveForward, true), IDLE);
    let (s, _) = transition(s, input(DriveInput::MoveBackward, true), RUNNING);
    assert!(s.move_forward && s.move_backward);
    let (s, _) = transition(s, input(DriveInput::MoveBackward, false), RUNNING);
    assert!(s.move_forward && !s.move_backward);
    assert_eq!(s.command, Command::Forward);
}
