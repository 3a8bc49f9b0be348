//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "actuator", version, about = "Linear actuator simulator")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/actuator.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); defaults to logging.level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scripted input timeline against the configured motor
    Simulate {
        /// Script CSV (strict header: time_ms,action,arg)
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
        /// Override simulation.duration_ms
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
        /// Override simulation.tick_hz
        #[arg(long, value_name = "HZ", value_parser = clap::value_parser!(u32).range(1..=10_000))]
        tick_hz: Option<u32>,
        /// Pace ticks against the wall clock instead of virtual time
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Print one line per tick
        #[arg(long, action = ArgAction::SetTrue)]
        trace: bool,
    },
    /// Validate the config and run a short ramp in virtual time
    SelfCheck,
}
