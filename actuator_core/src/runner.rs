//! Fixed-rate scripted runs.
//!
//! `run` steps an actuator at `tick_hz` for `duration_ms`, applying timed
//! actions before the tick they fall due on, and hands one [`Sample`] per
//! tick to a sink. Pacing goes through a [`Clock`], so the same loop serves
//! real-time runs (`MonotonicClock`) and virtual-time runs (`ManualClock`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use actuator_traits::Clock;

use crate::actuator::Actuator;
use crate::arbiter::{Command, DriveInput};
use crate::error::{AbortReason, ActuatorError, Result};
use crate::limits::LimitFlags;
use crate::status::MotionStatus;
use crate::util::period_us;

/// Something a script can do to the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Input(DriveInput, bool),
    Ready(bool),
    Forward,
    Backward,
    Stop,
    Start,
    SwitchDirection,
    Calibrate,
    Reset,
    HardStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedAction {
    pub at_ms: u64,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    pub tick_hz: u32,
    pub duration_ms: u64,
}

/// State observed after one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub t_ms: u64,
    pub velocity: f64,
    pub position: f64,
    pub command: Command,
    pub limits: LimitFlags,
    pub status: MotionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub final_position: f64,
    pub final_velocity: f64,
    pub min_position: f64,
    pub max_position: f64,
    pub limit_stops: u32,
    pub redirects: u32,
    pub actions_applied: usize,
}

impl Actuator {
    /// Apply one script action immediately.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Input(input, active) => self.set_input(input, active),
            Action::Ready(true) => self.switch_on(),
            Action::Ready(false) => self.switch_off(),
            Action::Forward => self.forward(),
            Action::Backward => self.backward(),
            Action::Stop => self.stop(),
            Action::Start => self.start(),
            Action::SwitchDirection => self.switch_direction(),
            Action::Calibrate => self.calibrate(),
            Action::Reset => self.reset(),
            Action::HardStop => self.hard_stop(),
        }
    }
}

/// Drive `actuator` through `script`. Actions must be sorted by `at_ms`.
pub fn run<C: Clock + ?Sized>(
    actuator: &mut Actuator,
    script: &[TimedAction],
    params: RunParams,
    clock: &C,
    shutdown: Option<&AtomicBool>,
    mut sink: impl FnMut(&Sample),
) -> Result<RunSummary> {
    if script.windows(2).any(|w| w[1].at_ms < w[0].at_ms) {
        return Err(eyre::Report::new(ActuatorError::Script(
            "actions must be sorted by time".into(),
        )));
    }

    let tick_us = period_us(params.tick_hz);
    let period = Duration::from_micros(tick_us);
    // Whole microseconds keep the ramp and the script on the same timeline.
    #[allow(clippy::cast_precision_loss)]
    let dt = tick_us as f64 / 1_000_000.0;
    let end_us = params.duration_ms.saturating_mul(1_000);

    let mut summary = RunSummary {
        min_position: actuator.position(),
        max_position: actuator.position(),
        ..RunSummary::default()
    };
    let mut pending = script.iter().peekable();
    let epoch = clock.now();
    let mut now_us: u64 = 0;

    tracing::info!(
        motor = actuator.name(),
        tick_hz = params.tick_hz,
        duration_ms = params.duration_ms,
        actions = script.len(),
        "run start"
    );

    while now_us < end_us {
        if shutdown.is_some_and(|f| f.load(Ordering::Relaxed)) {
            actuator.hard_stop();
            tracing::warn!(t_ms = now_us / 1_000, "run aborted by shutdown request");
            return Err(eyre::Report::new(ActuatorError::Aborted(
                AbortReason::Shutdown,
            )));
        }

        while let Some(next) = pending.next_if(|a| a.at_ms.saturating_mul(1_000) <= now_us) {
            tracing::debug!(t_ms = next.at_ms, action = ?next.action, "apply");
            actuator.apply(next.action);
            summary.actions_applied += 1;
        }

        let status = actuator.step(dt);
        now_us += tick_us;
        summary.ticks += 1;
        match status {
            MotionStatus::LimitStop(_) => summary.limit_stops += 1,
            MotionStatus::Redirected(_) => summary.redirects += 1,
            _ => {}
        }
        let position = actuator.position();
        summary.min_position = summary.min_position.min(position);
        summary.max_position = summary.max_position.max(position);

        sink(&Sample {
            t_ms: now_us / 1_000,
            velocity: actuator.current_speed(),
            position,
            command: actuator.command(),
            limits: actuator.limit_outputs().flags(),
            status,
        });

        let deadline = epoch + period * u32::try_from(summary.ticks).unwrap_or(u32::MAX);
        let now = clock.now();
        if deadline > now {
            clock.sleep(deadline - now);
        }
    }

    let skipped = pending.count();
    if skipped > 0 {
        tracing::debug!(skipped, "actions scheduled after the end of the run were not applied");
    }

    summary.elapsed_ms = now_us / 1_000;
    summary.final_position = actuator.position();
    summary.final_velocity = actuator.current_speed();
    tracing::info!(
        ticks = summary.ticks,
        position = summary.final_position,
        limit_stops = summary.limit_stops,
        redirects = summary.redirects,
        "run complete"
    );
    Ok(summary)
}
