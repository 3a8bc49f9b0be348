#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and script parsing for the linear actuator.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The script CSV loader enforces headers and turns rows into timed
//!   steps (`ScriptStep`) that a runner can replay against a motor.
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DriveCfg {
    /// Nominal speed in m/s
    pub speed: f64,
    /// Speed used while the alternate-speed input is asserted (m/s)
    pub alternate_speed: f64,
    pub use_ramp: bool,
    /// Time to ramp 0 -> target (ms)
    pub ramp_up_ms: f64,
    /// Time to ramp target -> 0 (ms)
    pub ramp_down_ms: f64,
}

impl Default for DriveCfg {
    fn default() -> Self {
        Self {
            speed: 0.3,
            alternate_speed: 0.1,
            use_ramp: true,
            ramp_up_ms: 300.0,
            ramp_down_ms: 300.0,
        }
    }
}

/// Which limit outputs are driven.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneLayout {
    Max,
    MinMax,
    #[default]
    MinMidMax,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LimitPolicy {
    #[default]
    Stop,
    Eccentric,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResetPosition {
    #[default]
    Min,
    Mid,
    Max,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TravelCfg {
    pub min: f64,
    pub mid: f64,
    pub max: f64,
    /// Half-width of the hysteresis band around each boundary (m)
    pub tolerance: f64,
    pub layout: ZoneLayout,
    pub policy: LimitPolicy,
    pub reset_position: ResetPosition,
    /// Direction of travel in part-local space; normalized at build time
    pub axis: [f64; 3],
    /// Distance already travelled when the scene was saved
    pub initial_position: f64,
}

impl Default for TravelCfg {
    fn default() -> Self {
        Self {
            min: 0.0,
            mid: 0.25,
            max: 0.5,
            tolerance: 0.05,
            layout: ZoneLayout::MinMidMax,
            policy: LimitPolicy::Stop,
            reset_position: ResetPosition::Min,
            axis: [0.0, 0.0, 1.0],
            initial_position: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PartCfg {
    pub name: String,
    #[serde(default = "default_gear")]
    pub gear: f64,
}

fn default_gear() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorCfg {
    #[serde(default)]
    pub name: Option<String>,
    pub center: f64,
    pub width: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationCfg {
    pub tick_hz: u32,
    pub duration_ms: u64,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            tick_hz: 100,
            duration_ms: 5_000,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub drive: DriveCfg,
    pub travel: TravelCfg,
    /// Parts moved by the actuator, in attachment order
    pub parts: Vec<PartCfg>,
    /// Range sensors evaluated against the travelled distance
    pub sensors: Vec<SensorCfg>,
    pub simulation: SimulationCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Drive
        if !(self.drive.speed.is_finite() && self.drive.speed > 0.0) {
            eyre::bail!("drive.speed must be > 0");
        }
        if !(self.drive.alternate_speed.is_finite() && self.drive.alternate_speed > 0.0) {
            eyre::bail!("drive.alternate_speed must be > 0");
        }
        if !(self.drive.ramp_up_ms.is_finite() && self.drive.ramp_up_ms >= 0.0) {
            eyre::bail!("drive.ramp_up_ms must be >= 0");
        }
        if !(self.drive.ramp_down_ms.is_finite() && self.drive.ramp_down_ms >= 0.0) {
            eyre::bail!("drive.ramp_down_ms must be >= 0");
        }

        // Travel
        let t = &self.travel;
        for (name, v) in [
            ("min", t.min),
            ("mid", t.mid),
            ("max", t.max),
            ("tolerance", t.tolerance),
            ("initial_position", t.initial_position),
        ] {
            if !v.is_finite() {
                eyre::bail!("travel.{name} must be finite");
            }
        }
        if !(t.min < t.mid && t.mid < t.max) {
            eyre::bail!("travel limits must satisfy min < mid < max");
        }
        if t.tolerance < 0.0 {
            eyre::bail!("travel.tolerance must be >= 0");
        }
        if !(t.min..=t.max).contains(&t.initial_position) {
            eyre::bail!("travel.initial_position must be within [min, max]");
        }
        let [x, y, z] = t.axis;
        let len = (x * x + y * y + z * z).sqrt();
        if !len.is_finite() || len <= f64::EPSILON {
            eyre::bail!("travel.axis must be a non-zero finite vector");
        }

        // Parts
        for (i, p) in self.parts.iter().enumerate() {
            if p.name.trim().is_empty() {
                eyre::bail!("parts[{i}].name must not be empty");
            }
            if !(p.gear.is_finite() && p.gear > 0.0) {
                eyre::bail!("parts[{i}].gear must be > 0");
            }
        }

        // Sensors
        for (i, s) in self.sensors.iter().enumerate() {
            if !s.center.is_finite() {
                eyre::bail!("sensors[{i}].center must be finite");
            }
            if !(s.width.is_finite() && s.width > 0.0) {
                eyre::bail!("sensors[{i}].width must be > 0");
            }
        }

        // Simulation
        if self.simulation.tick_hz == 0 || self.simulation.tick_hz > 10_000 {
            eyre::bail!("simulation.tick_hz must be in 1..=10000");
        }
        if self.simulation.duration_ms > 24 * 60 * 60 * 1000 {
            eyre::bail!("simulation.duration_ms is unreasonably large (>24h)");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

/// Script action names as they appear in the `action` column.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    MoveForward,
    MoveBackward,
    AlternateSpeed,
    Ready,
    Forward,
    Backward,
    Stop,
    Start,
    SwitchDirection,
    Calibrate,
    Reset,
    HardStop,
}

impl ScriptAction {
    /// Signal-level actions need an on/off argument; commands take none.
    pub const fn takes_level(self) -> bool {
        matches!(
            self,
            Self::MoveForward | Self::MoveBackward | Self::AlternateSpeed | Self::Ready
        )
    }
}

/// Script CSV schema.
///
/// Expected headers:
/// time_ms,action,arg
///
/// Example:
/// time_ms,action,arg
/// 0,move_forward,1
/// 1500,move_forward,0
/// 2000,calibrate,
#[derive(Debug, Deserialize, Clone)]
pub struct ScriptRow {
    pub time_ms: u64,
    pub action: ScriptAction,
    pub arg: Option<String>,
}

/// A validated script row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStep {
    pub time_ms: u64,
    pub action: ScriptAction,
    /// Present exactly when `action.takes_level()`
    pub level: Option<bool>,
}

pub fn parse_level(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

impl TryFrom<ScriptRow> for ScriptStep {
    type Error = eyre::Report;

    fn try_from(row: ScriptRow) -> Result<Self, Self::Error> {
        let arg = row.arg.as_deref().map(str::trim).filter(|a| !a.is_empty());
        let level = match (row.action.takes_level(), arg) {
            (true, Some(a)) => match parse_level(a) {
                Some(v) => Some(v),
                None => eyre::bail!("{:?} expects on/off, got '{a}'", row.action),
            },
            (true, None) => eyre::bail!("{:?} requires an on/off argument", row.action),
            (false, Some(a)) => eyre::bail!("{:?} takes no argument, got '{a}'", row.action),
            (false, None) => None,
        };
        Ok(Self {
            time_ms: row.time_ms,
            action: row.action,
            level,
        })
    }
}

/// Validate rows into steps; timestamps must be non-decreasing.
pub fn script_from_rows(rows: Vec<ScriptRow>) -> eyre::Result<Vec<ScriptStep>> {
    let mut steps: Vec<ScriptStep> = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let step =
            ScriptStep::try_from(row).map_err(|e| eyre::eyre!("script row {}: {e}", i + 2))?;
        if let Some(prev) = steps.last()
            && step.time_ms < prev.time_ms
        {
            eyre::bail!(
                "script timestamps must be non-decreasing (row {} at {} ms after {} ms)",
                i + 2,
                step.time_ms,
                prev.time_ms
            );
        }
        steps.push(step);
    }
    Ok(steps)
}

pub fn load_script_csv(path: &std::path::Path) -> eyre::Result<Vec<ScriptStep>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open script CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["time_ms", "action", "arg"];
    let actual: Vec<String> = headers.iter().map(ToString::to_string).collect();
    if actual != expected {
        eyre::bail!(
            "script CSV must have headers 'time_ms,action,arg', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ScriptRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    script_from_rows(rows)
}
