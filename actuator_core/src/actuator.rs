//! The linear actuator: a ramped motor driven by two opposing inputs that
//! moves a set of parts along one axis between travel limits.
//!
//! One `step(dt)` does, in order:
//! 1. drain queued input edges through the arbiter;
//! 2. advance the velocity ramp (only while the ready line is on);
//! 3. integrate position and move the parts;
//! 4. refresh limit outputs and let the limit policy react;
//! 5. refresh range sensors.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use actuator_traits::{Placement, SceneLifecycle, Vec3};

use crate::arbiter::{self, ArbiterEvent, ArbiterState, Command, DriveInput, Effect, MotorSnapshot};
use crate::builder::{ActuatorBuilder, Missing};
use crate::config::DriveCfg;
use crate::error::Result;
use crate::handler::{LimitHandler, LimitReaction};
use crate::limits::{
    Boundary, LimitConfiguration, LimitPolicy, ResetPosition, SetOutcome, ZoneLayout,
};
use crate::range_sensor::RangeSensor;
use crate::signal::{DigitalSignal, SubscriptionId};
use crate::status::MotionStatus;
use crate::tracker::{LimitOutputs, PositionTracker};
use crate::util::ms_to_secs;

/// Direction the motor is set to travel in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Input lines owned by the motor. Clone a handle to drive them from the host.
#[derive(Debug, Clone)]
pub struct DriveSignals {
    pub move_forward: DigitalSignal,
    pub move_backward: DigitalSignal,
    pub alternate_speed: DigitalSignal,
}

impl DriveSignals {
    pub fn new(prefix: &str) -> Self {
        Self {
            move_forward: DigitalSignal::new(format!("{prefix}.move_forward")),
            move_backward: DigitalSignal::new(format!("{prefix}.move_backward")),
            alternate_speed: DigitalSignal::new(format!("{prefix}.alternate_speed")),
        }
    }

    pub fn get(&self, input: DriveInput) -> &DigitalSignal {
        match input {
            DriveInput::MoveForward => &self.move_forward,
            DriveInput::MoveBackward => &self.move_backward,
            DriveInput::AlternateSpeed => &self.alternate_speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Queued {
    Input(DriveInput, bool),
    Ready(bool),
}

type Inbox = Rc<RefCell<VecDeque<Queued>>>;

pub struct Actuator {
    name: String,
    drive: DriveCfg,
    motion: crate::velocity::VelocityController,
    arbiter: ArbiterState,
    handler: LimitHandler,
    tracker: PositionTracker,
    reset_position: ResetPosition,
    inputs: DriveSignals,
    ready: DigitalSignal,
    running: DigitalSignal,
    sensors: Vec<RangeSensor>,
    scene: Rc<dyn SceneLifecycle>,
    inbox: Inbox,
    subscriptions: Vec<(DigitalSignal, SubscriptionId)>,
    /// A ramp is in progress (the "Move" flag).
    moving: bool,
    current_speed: f64,
    last_speed: f64,
    scene_restored: bool,
}

impl std::fmt::Debug for Actuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actuator")
            .field("name", &self.name)
            .field("command", &self.arbiter.command)
            .field("speed", &self.current_speed)
            .field("position", &self.tracker.position())
            .field("moving", &self.moving)
            .finish_non_exhaustive()
    }
}

pub(crate) struct ActuatorParts {
    pub name: String,
    pub drive: DriveCfg,
    pub tracker: PositionTracker,
    pub policy: LimitPolicy,
    pub reset_position: ResetPosition,
    pub inputs: DriveSignals,
    pub sensors: Vec<RangeSensor>,
    pub scene: Rc<dyn SceneLifecycle>,
}

impl Actuator {
    /// Start building an actuator.
    pub fn builder(name: impl Into<String>) -> ActuatorBuilder<Missing> {
        ActuatorBuilder::new(name)
    }

    pub(crate) fn from_parts(p: ActuatorParts) -> Self {
        let mut motion = crate::velocity::VelocityController::new(p.drive.use_ramp);
        motion.set_ramp_up(ms_to_secs(p.drive.ramp_up_ms));
        motion.set_ramp_down(ms_to_secs(p.drive.ramp_down_ms));

        let ready = DigitalSignal::new(format!("{}.ready", p.name));
        let running = DigitalSignal::new(format!("{}.running", p.name));
        ready.on();

        let inbox: Inbox = Rc::new(RefCell::new(VecDeque::new()));
        let mut subscriptions = Vec::with_capacity(4);
        for input in [
            DriveInput::MoveForward,
            DriveInput::MoveBackward,
            DriveInput::AlternateSpeed,
        ] {
            let signal = p.inputs.get(input).clone();
            let q = inbox.clone();
            let id = signal.subscribe(move |edge| {
                q.borrow_mut()
                    .push_back(Queued::Input(input, edge.is_active()));
            });
            subscriptions.push((signal, id));
        }
        let q = inbox.clone();
        let id = ready.subscribe(move |edge| q.borrow_mut().push_back(Queued::Ready(edge.is_active())));
        subscriptions.push((ready.clone(), id));

        let arbiter = ArbiterState {
            move_forward: p.inputs.move_forward.is_active(),
            move_backward: p.inputs.move_backward.is_active(),
            alternate: p.inputs.alternate_speed.is_active(),
            ..ArbiterState::default()
        };

        let act = Self {
            name: p.name,
            drive: p.drive,
            motion,
            arbiter,
            handler: LimitHandler::new(p.policy),
            tracker: p.tracker,
            reset_position: p.reset_position,
            inputs: p.inputs,
            ready,
            running,
            sensors: p.sensors,
            scene: p.scene,
            inbox,
            subscriptions,
            moving: false,
            current_speed: 0.0,
            last_speed: 0.0,
            scene_restored: false,
        };
        act.tracker.update_limit_signals();
        act.evaluate_sensors();
        act
    }

    // ── Observers ────────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn command(&self) -> Command {
        self.arbiter.command
    }

    pub fn direction(&self) -> Direction {
        match self.arbiter.command {
            Command::Backward => Direction::Backward,
            Command::Forward | Command::Stop => Direction::Forward,
        }
    }

    #[inline]
    pub fn current_speed(&self) -> f64 {
        self.current_speed
    }

    /// Last non-zero speed; 0 until the motor has moved once.
    #[inline]
    pub fn last_speed(&self) -> f64 {
        self.last_speed
    }

    #[inline]
    pub fn target_speed(&self) -> f64 {
        self.motion.target()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.current_speed != 0.0
    }

    /// A velocity ramp is in progress.
    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.moving
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.tracker.position()
    }

    pub fn limits(&self) -> &LimitConfiguration {
        self.tracker.limits()
    }

    pub fn limit_outputs(&self) -> &LimitOutputs {
        self.tracker.outputs()
    }

    pub fn inputs(&self) -> &DriveSignals {
        &self.inputs
    }

    /// Mechanical switch line; the ramp only advances while it is on.
    pub fn ready(&self) -> &DigitalSignal {
        &self.ready
    }

    /// Mirrors `is_running()`.
    pub fn running_output(&self) -> &DigitalSignal {
        &self.running
    }

    pub fn drive(&self) -> &DriveCfg {
        &self.drive
    }

    pub fn velocity_controller(&self) -> &crate::velocity::VelocityController {
        &self.motion
    }

    pub fn policy(&self) -> LimitPolicy {
        self.handler.policy()
    }

    pub fn layout(&self) -> ZoneLayout {
        self.tracker.layout()
    }

    pub fn reset_position(&self) -> ResetPosition {
        self.reset_position
    }

    pub fn axis(&self) -> Vec3 {
        self.tracker.axis()
    }

    pub fn last_approach_direction(&self) -> f64 {
        self.handler.last_approach_direction()
    }

    pub fn is_transitioning(&self) -> bool {
        self.handler.is_transitioning()
    }

    pub fn part_count(&self) -> usize {
        self.tracker.part_count()
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.tracker.part_names()
    }

    pub fn gear_of(&self, part: &str) -> Option<f64> {
        self.tracker.gear_of(part)
    }

    pub fn sensors(&self) -> &[RangeSensor] {
        &self.sensors
    }

    // ── Inputs ───────────────────────────────────────────────────────────────

    /// Drive one of the motor's input lines and apply the resulting edge.
    pub fn set_input(&mut self, input: DriveInput, active: bool) {
        self.inputs.get(input).set(active);
        self.process_inputs();
    }

    /// Apply input edges queued by the signal subscriptions, oldest first.
    pub fn process_inputs(&mut self) {
        loop {
            let next = self.inbox.borrow_mut().pop_front();
            let Some(event) = next else { break };
            match event {
                Queued::Input(input, active) => {
                    self.dispatch(ArbiterEvent::Input { input, active });
                }
                Queued::Ready(true) => {
                    tracing::debug!(motor = %self.name, "ready switched on");
                }
                Queued::Ready(false) => {
                    tracing::debug!(motor = %self.name, "ready switched off");
                    self.hard_stop();
                }
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    pub fn forward(&mut self) {
        self.dispatch(ArbiterEvent::Forward);
    }

    pub fn backward(&mut self) {
        self.dispatch(ArbiterEvent::Backward);
    }

    pub fn stop(&mut self) {
        self.dispatch(ArbiterEvent::Stop);
    }

    /// Begin moving; a stopped command resumes in the last travelled direction.
    pub fn start(&mut self) {
        self.dispatch(ArbiterEvent::Start);
    }

    pub fn switch_direction(&mut self) {
        self.dispatch(ArbiterEvent::SwitchDirection);
    }

    /// Turn the ready line on.
    pub fn switch_on(&mut self) {
        self.ready.on();
        self.process_inputs();
    }

    /// Turn the ready line off; the motor stops immediately.
    pub fn switch_off(&mut self) {
        self.ready.off();
        self.process_inputs();
    }

    fn dispatch(&mut self, event: ArbiterEvent) {
        let snapshot = MotorSnapshot {
            running: self.is_running() || self.moving,
            last_speed: self.last_speed,
        };
        let before = self.arbiter.command;
        let (next, effect) = arbiter::transition(self.arbiter, event, snapshot);
        self.arbiter = next;
        if next.command != before {
            tracing::debug!(
                motor = %self.name,
                from = ?before,
                to = ?next.command,
                "command changed"
            );
        }
        match effect {
            Effect::None => {}
            Effect::Retarget => self.retarget(),
            Effect::Start => {
                tracing::debug!(motor = %self.name, command = ?next.command, "start");
                self.retarget();
            }
        }
    }

    fn commanded_magnitude(&self) -> f64 {
        if self.arbiter.alternate {
            self.drive.alternate_speed
        } else {
            self.drive.speed
        }
    }

    /// Re-run the velocity controller with the current command.
    fn retarget(&mut self) {
        let target = self.commanded_magnitude() * self.handler.target_sign(self.arbiter.command);
        if self.handler.blocks(self.tracker.outputs().flags(), target) {
            tracing::warn!(
                motor = %self.name,
                target,
                position = self.tracker.position(),
                "retarget refused: limit output active in that direction"
            );
            return;
        }
        self.drive_to(target);
    }

    fn drive_to(&mut self, target: f64) {
        self.motion.set_acceleration_enabled(self.drive.use_ramp);
        self.motion.set_target(
            target,
            ms_to_secs(self.drive.ramp_up_ms),
            ms_to_secs(self.drive.ramp_down_ms),
        );
        if !self.moving && self.current_speed == 0.0 && target != 0.0 {
            tracing::info!(motor = %self.name, target, "motor starting");
        }
        self.moving = true;
    }

    fn set_current_speed(&mut self, v: f64) {
        self.current_speed = v;
        if v != 0.0 {
            self.last_speed = v;
        }
    }

    fn update_running_output(&self) {
        self.running.set(self.is_running());
    }

    fn evaluate_sensors(&self) {
        let position = self.tracker.position();
        for sensor in &self.sensors {
            sensor.update(position);
        }
    }

    /// Snap velocity to zero, bypassing the ramp.
    pub fn hard_stop(&mut self) {
        let was_moving = self.is_running() || self.moving;
        self.motion.reset();
        self.moving = false;
        self.set_current_speed(0.0);
        self.handler.reset();
        self.update_running_output();
        if was_moving {
            tracing::info!(
                motor = %self.name,
                position = self.tracker.position(),
                "motor stopped"
            );
        }
    }

    // ── Stepping ─────────────────────────────────────────────────────────────

    /// Advance the simulation by `dt` seconds. Non-positive or non-finite
    /// `dt` only drains queued inputs.
    pub fn step(&mut self, dt: f64) -> MotionStatus {
        self.process_inputs();
        if !(dt.is_finite() && dt > 0.0) {
            return self.resting_status();
        }

        if self.ready.is_active() && self.moving {
            let tick = self.motion.step(dt);
            self.set_current_speed(tick.velocity);
            if tick.direction_switched {
                tracing::debug!(motor = %self.name, "direction switched");
                self.handler.settle();
            }
            if tick.reached {
                tracing::debug!(motor = %self.name, velocity = tick.velocity, "velocity reached");
            }
            if self.motion.is_plateau() || self.motion.at_target() {
                self.moving = false;
                self.handler.settle();
            }
        }
        self.update_running_output();

        if !self.is_running() {
            return self.resting_status();
        }

        let velocity = self.current_speed;
        let ramping = self.moving;
        self.tracker.advance(velocity * dt);

        let reaction = self.handler.assess(
            self.tracker.limits(),
            self.tracker.position(),
            velocity,
            self.arbiter.command,
        );
        let status = match reaction {
            LimitReaction::Clamp(boundary) => {
                self.tracker.clamp_to(boundary);
                tracing::info!(
                    motor = %self.name,
                    boundary = ?boundary,
                    position = self.tracker.position(),
                    "limit reached"
                );
                self.hard_stop();
                MotionStatus::LimitStop(boundary)
            }
            LimitReaction::Redirect(boundary) => {
                self.redirect(boundary);
                MotionStatus::Redirected(boundary)
            }
            LimitReaction::None if ramping => MotionStatus::Ramping { velocity },
            LimitReaction::None => MotionStatus::Cruising { velocity },
        };
        self.evaluate_sensors();
        status
    }

    fn resting_status(&self) -> MotionStatus {
        if self.moving {
            MotionStatus::Ramping {
                velocity: self.current_speed,
            }
        } else {
            MotionStatus::Idle
        }
    }

    /// Eccentric reversal away from `boundary`.
    fn redirect(&mut self, boundary: Boundary) {
        let target = self.commanded_magnitude() * boundary.away_sign();
        tracing::debug!(
            motor = %self.name,
            boundary = ?boundary,
            position = self.tracker.position(),
            target,
            "reversing at boundary"
        );
        self.drive_to(target);
    }

    // ── Calibration & lifecycle ──────────────────────────────────────────────

    /// Calibrate to the configured reset position.
    pub fn calibrate(&mut self) {
        self.calibrate_to(self.reset_position);
    }

    /// Force the position to `at`, dragging parts along, and re-derive all
    /// limit outputs from scratch. Ignored while the scene is loading.
    pub fn calibrate_to(&mut self, at: ResetPosition) {
        if self.scene.is_loading() {
            tracing::debug!(motor = %self.name, "calibration skipped while scene is loading");
            return;
        }
        if self.is_running() || self.moving {
            self.hard_stop();
        }
        self.handler.reset();
        self.tracker.move_to(at);
        self.tracker.reset_limit_signals();
        self.tracker.update_limit_signals();
        self.evaluate_sensors();
        tracing::debug!(
            motor = %self.name,
            at = ?at,
            position = self.tracker.position(),
            "calibrated"
        );
    }

    /// Stop, return all parts to where they were attached and zero the
    /// travelled distance. Ignored while the scene is loading.
    pub fn reset(&mut self) {
        if self.scene.is_loading() {
            return;
        }
        self.hard_stop();
        self.tracker.rewind();
        self.tracker.update_limit_signals();
        self.evaluate_sensors();
        tracing::debug!(motor = %self.name, "reset");
    }

    /// One-shot: re-apply the persisted distance once the scene is loaded.
    pub fn on_scene_loaded(&mut self) {
        if self.scene_restored {
            return;
        }
        self.scene_restored = true;
        self.tracker.reset_limit_signals();
        self.tracker.restore();
        self.evaluate_sensors();
        tracing::info!(
            motor = %self.name,
            position = self.tracker.position(),
            "scene loaded; position restored"
        );
    }

    // ── Properties ───────────────────────────────────────────────────────────

    fn rejected(&self, property: &'static str, value: f64) -> bool {
        tracing::warn!(motor = %self.name, property, value, "rejected; keeping previous");
        false
    }

    /// m/s, must be > 0.
    pub fn set_speed(&mut self, speed: f64) -> bool {
        if !(speed.is_finite() && speed > 0.0) {
            return self.rejected("speed", speed);
        }
        self.drive.speed = speed;
        if self.is_running() {
            self.retarget();
        }
        true
    }

    /// m/s, must be > 0.
    pub fn set_alternate_speed(&mut self, speed: f64) -> bool {
        if !(speed.is_finite() && speed > 0.0) {
            return self.rejected("alternate_speed", speed);
        }
        self.drive.alternate_speed = speed;
        if self.is_running() {
            self.retarget();
        }
        true
    }

    pub fn set_use_ramp(&mut self, use_ramp: bool) {
        self.drive.use_ramp = use_ramp;
        self.motion.set_acceleration_enabled(use_ramp);
    }

    /// Milliseconds, >= 0. Zeroing both ramps disables acceleration.
    pub fn set_ramp_up_ms(&mut self, ms: f64) -> bool {
        if !(ms.is_finite() && ms >= 0.0) {
            return self.rejected("ramp_up_ms", ms);
        }
        self.drive.ramp_up_ms = ms;
        if ms == 0.0 && self.drive.ramp_down_ms == 0.0 {
            tracing::debug!(motor = %self.name, "both ramps are zero; acceleration disabled");
            self.set_use_ramp(false);
        } else {
            self.motion.set_ramp_up(ms_to_secs(ms));
        }
        true
    }

    /// Milliseconds, >= 0. Zeroing both ramps disables acceleration.
    pub fn set_ramp_down_ms(&mut self, ms: f64) -> bool {
        if !(ms.is_finite() && ms >= 0.0) {
            return self.rejected("ramp_down_ms", ms);
        }
        self.drive.ramp_down_ms = ms;
        if ms == 0.0 && self.drive.ramp_up_ms == 0.0 {
            tracing::debug!(motor = %self.name, "both ramps are zero; acceleration disabled");
            self.set_use_ramp(false);
        } else {
            self.motion.set_ramp_down(ms_to_secs(ms));
        }
        true
    }

    fn apply_limit(&mut self, property: &'static str, value: f64, outcome: SetOutcome) -> bool {
        match outcome {
            SetOutcome::Changed => {
                tracing::debug!(motor = %self.name, property, value, "limit changed");
                self.calibrate();
                true
            }
            SetOutcome::Unchanged => true,
            SetOutcome::Rejected => self.rejected(property, value),
        }
    }

    pub fn set_min_limit(&mut self, value: f64) -> bool {
        let outcome = self.tracker.limits_mut().set_min(value);
        self.apply_limit("limits.min", value, outcome)
    }

    pub fn set_mid_limit(&mut self, value: f64) -> bool {
        let outcome = self.tracker.limits_mut().set_mid(value);
        self.apply_limit("limits.mid", value, outcome)
    }

    pub fn set_max_limit(&mut self, value: f64) -> bool {
        let outcome = self.tracker.limits_mut().set_max(value);
        self.apply_limit("limits.max", value, outcome)
    }

    pub fn set_tolerance(&mut self, value: f64) -> bool {
        let outcome = self.tracker.limits_mut().set_tolerance(value);
        self.apply_limit("limits.tolerance", value, outcome)
    }

    /// A changed policy recalibrates.
    pub fn set_policy(&mut self, policy: LimitPolicy) {
        if self.handler.policy() == policy {
            return;
        }
        self.handler.set_policy(policy);
        self.calibrate();
    }

    /// A changed reset position recalibrates to it.
    pub fn set_reset_position(&mut self, at: ResetPosition) {
        if self.reset_position == at {
            return;
        }
        self.reset_position = at;
        self.calibrate();
    }

    pub fn set_layout(&mut self, layout: ZoneLayout) {
        self.tracker.set_layout(layout);
    }

    /// Change the travel axis; the motor is reset afterwards.
    pub fn set_axis(&mut self, axis: Vec3) -> bool {
        let before = self.tracker.axis();
        if !self.tracker.set_axis(axis) {
            tracing::warn!(motor = %self.name, ?axis, "axis must be a non-zero finite vector");
            return false;
        }
        if self.tracker.axis() != before {
            self.reset();
        }
        true
    }

    // ── Parts & sensors ──────────────────────────────────────────────────────

    /// Attach a part moved with `gear` times the motor's travel.
    pub fn add_part(&mut self, part: impl Placement + 'static, gear: f64) -> Result<()> {
        self.tracker.add_part(Box::new(part), gear)
    }

    pub fn remove_part(&mut self, name: &str) -> bool {
        self.tracker.remove_part(name)
    }

    /// Attach a range sensor; it is evaluated immediately.
    pub fn add_sensor(&mut self, sensor: RangeSensor) -> usize {
        sensor.update(self.tracker.position());
        self.sensors.push(sensor);
        self.sensors.len() - 1
    }

    pub fn remove_sensor(&mut self, index: usize) -> Option<RangeSensor> {
        (index < self.sensors.len()).then(|| self.sensors.remove(index))
    }

    pub fn sensor_mut(&mut self, index: usize) -> Option<&mut RangeSensor> {
        self.sensors.get_mut(index)
    }
}

impl Drop for Actuator {
    fn drop(&mut self) {
        for (signal, id) in self.subscriptions.drain(..) {
            signal.unsubscribe(id);
        }
    }
}
