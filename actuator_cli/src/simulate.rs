//! Simulation glue: config mapping, host doubles, scripted runs and reports.

use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;

use actuator_config::Config;
use actuator_core::error::{ActuatorError, Result};
use actuator_core::mocks::{SceneFlag, SharedPart};
use actuator_core::runner::{self, Action, RunParams, RunSummary, Sample, TimedAction};
use actuator_core::{Actuator, Command, LimitFlags};
use actuator_traits::{Clock, ManualClock, MonotonicClock, Placement, Vec3};
use serde_json::json;

/// Name given to the simulated motor; prefixes every signal symbol.
pub const MOTOR_NAME: &str = "actuator";

pub struct SimulateOpts<'a> {
    pub script: &'a Path,
    pub duration_ms: Option<u64>,
    pub tick_hz: Option<u32>,
    pub realtime: bool,
    pub trace: bool,
    pub json: bool,
}

/// A motor built from config plus handles to the parts it moves.
pub struct Assembly {
    pub actuator: Actuator,
    pub parts: Vec<SharedPart>,
}

/// Build the motor the way a host would: construct while the scene is
/// loading, then finish loading so the stored distance is re-applied.
pub fn assemble(cfg: &Config) -> Result<Assembly> {
    let scene = SceneFlag::loading();
    let mut builder = Actuator::builder(MOTOR_NAME)
        .with_scene(Rc::new(scene.clone()))
        .with_drive((&cfg.drive).into())
        .with_travel((&cfg.travel).into());

    let mut parts = Vec::with_capacity(cfg.parts.len());
    for p in &cfg.parts {
        let part = SharedPart::new(&p.name, Vec3::ZERO);
        builder = builder.with_part(part.clone(), p.gear);
        parts.push(part);
    }
    for s in &cfg.sensors {
        builder = match &s.name {
            Some(name) => builder.with_named_sensor(name.clone(), s.center, s.width),
            None => builder.with_sensor(s.center, s.width),
        };
    }

    let mut actuator = builder.build()?;
    scene.set_loading(false);
    actuator.on_scene_loaded();
    Ok(Assembly { actuator, parts })
}

/// Final state of a completed simulation.
pub struct Report {
    pub summary: RunSummary,
    pub command: Command,
    pub limits: LimitFlags,
    pub sensors: Vec<(String, bool)>,
    pub parts: Vec<(String, Vec3)>,
}

pub fn run_simulate(cfg: &Config, opts: &SimulateOpts<'_>, shutdown: &AtomicBool) -> Result<Report> {
    let steps = actuator_config::load_script_csv(opts.script)
        .map_err(|e| eyre::Report::new(ActuatorError::Script(e.to_string())))?;
    let script: Vec<TimedAction> = steps.iter().map(TimedAction::from).collect();

    let params = RunParams {
        tick_hz: opts.tick_hz.unwrap_or(cfg.simulation.tick_hz),
        duration_ms: opts.duration_ms.unwrap_or(cfg.simulation.duration_ms),
    };

    let Assembly {
        mut actuator,
        parts,
    } = assemble(cfg)?;

    let clock: Box<dyn Clock> = if opts.realtime {
        Box::new(MonotonicClock::new())
    } else {
        Box::new(ManualClock::new())
    };

    let (trace, json_out) = (opts.trace, opts.json);
    let summary = runner::run(
        &mut actuator,
        &script,
        params,
        clock.as_ref(),
        Some(shutdown),
        |s| {
            if trace {
                println!("{}", format_sample(s, json_out));
            }
        },
    )?;

    Ok(Report {
        summary,
        command: actuator.command(),
        limits: actuator.limit_outputs().flags(),
        sensors: actuator
            .sensors()
            .iter()
            .map(|s| (s.output().symbol().to_string(), s.is_active()))
            .collect(),
        parts: parts
            .iter()
            .map(|p| (p.name().to_string(), p.position()))
            .collect(),
    })
}

/// Build the motor and drive it briefly in virtual time. Tries forward
/// first and falls back to backward when parked against the max limit.
pub fn self_check(cfg: &Config) -> Result<RunSummary> {
    let params = RunParams {
        tick_hz: cfg.simulation.tick_hz,
        duration_ms: 500,
    };
    for action in [Action::Forward, Action::Backward] {
        let Assembly { mut actuator, .. } = assemble(cfg)?;
        let start = actuator.position();
        let script = [
            TimedAction { at_ms: 0, action },
            TimedAction {
                at_ms: 0,
                action: Action::Start,
            },
        ];
        let summary = runner::run(
            &mut actuator,
            &script,
            params,
            &ManualClock::new(),
            None,
            |_| {},
        )?;
        if (summary.final_position - start).abs() > 0.0 {
            return Ok(summary);
        }
        tracing::debug!(?action, "self-check: no travel in this direction");
    }
    Err(eyre::Report::new(ActuatorError::State(
        "motor did not move during self-check".into(),
    )))
}

fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

fn format_sample(s: &Sample, json_out: bool) -> String {
    if json_out {
        json!({
            "t_ms": s.t_ms,
            "velocity": s.velocity,
            "position": s.position,
            "command": format!("{:?}", s.command),
            "limits": { "min": s.limits.min, "mid": s.limits.mid, "max": s.limits.max },
            "status": format!("{:?}", s.status),
        })
        .to_string()
    } else {
        format!(
            "t={:>6}ms v={:+.4} x={:.4} cmd={:?} min={} mid={} max={}",
            s.t_ms,
            s.velocity,
            s.position,
            s.command,
            on_off(s.limits.min),
            on_off(s.limits.mid),
            on_off(s.limits.max),
        )
    }
}

fn unix_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

pub fn report_json(r: &Report) -> String {
    let s = &r.summary;
    json!({
        "timestamp": unix_timestamp(),
        "ticks": s.ticks,
        "elapsed_ms": s.elapsed_ms,
        "final_position": s.final_position,
        "final_velocity": s.final_velocity,
        "min_position": s.min_position,
        "max_position": s.max_position,
        "command": format!("{:?}", r.command),
        "limits": { "min": r.limits.min, "mid": r.limits.mid, "max": r.limits.max },
        "limit_stops": s.limit_stops,
        "redirects": s.redirects,
        "actions_applied": s.actions_applied,
        "sensors": r.sensors.iter().map(|(name, active)| json!({ "name": name, "active": active })).collect::<Vec<_>>(),
        "parts": r.parts.iter().map(|(name, p)| json!({ "name": name, "position": [p.x, p.y, p.z] })).collect::<Vec<_>>(),
        "abort_reason": null,
    })
    .to_string()
}

pub fn report_text(r: &Report) -> String {
    let s = &r.summary;
    let mut out = format!(
        "Simulation complete: {} ticks ({} ms)\n\
         position: {:.6} m (range {:.6}..{:.6})\n\
         velocity: {:.6} m/s, command: {:?}\n\
         limits: min={} mid={} max={}\n\
         limit stops: {}, redirects: {}, actions: {}",
        s.ticks,
        s.elapsed_ms,
        s.final_position,
        s.min_position,
        s.max_position,
        s.final_velocity,
        r.command,
        on_off(r.limits.min),
        on_off(r.limits.mid),
        on_off(r.limits.max),
        s.limit_stops,
        s.redirects,
        s.actions_applied,
    );
    for (name, active) in &r.sensors {
        out.push_str(&format!("\nsensor {name}: {}", on_off(*active)));
    }
    for (name, p) in &r.parts {
        out.push_str(&format!("\npart {name}: ({:.4}, {:.4}, {:.4})", p.x, p.y, p.z));
    }
    out
}
