//! `actuator` binary: config loading, logging setup and subcommand dispatch.

mod cli;
mod error_fmt;
mod simulate;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{EXIT_CONFIG, exit_code_for_error, format_error_json, humanize};

fn main() {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporter: {e}");
    }
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let cfg = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            report_error(&e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let file_guard = match init_tracing(cli.json, &level, &cfg.logging) {
        Ok(guard) => guard,
        Err(e) => {
            report_error(&e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let code = match run(&cli, &cfg) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            report_error(&e);
            exit_code_for_error(&e)
        }
    };
    // process::exit skips destructors; flush the file writer first.
    drop(file_guard);
    std::process::exit(code);
}

fn load_config(path: &Path) -> Result<actuator_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = actuator_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Console logs go to stderr so stdout carries only reports. The returned
/// guard must outlive the run when a log file is configured.
fn init_tracing(
    json: bool,
    level: &str,
    logging: &actuator_config::Logging,
) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level '{level}'"))?;

    let (json_layer, text_layer) = if json {
        (Some(fmt::layer().json().with_writer(std::io::stderr)), None)
    } else {
        (None, Some(fmt::layer().compact().with_writer(std::io::stderr)))
    };

    let mut guard = None;
    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file must name a file"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, worker) = tracing_appender::non_blocking(appender);
            guard = Some(worker);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(guard)
}

fn run(cli: &Cli, cfg: &actuator_config::Config) -> Result<()> {
    match &cli.cmd {
        Commands::Simulate {
            script,
            duration_ms,
            tick_hz,
            realtime,
            trace,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = shutdown.clone();
                ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                    .wrap_err("install Ctrl-C handler")?;
            }
            let opts = simulate::SimulateOpts {
                script,
                duration_ms: *duration_ms,
                tick_hz: *tick_hz,
                realtime: *realtime,
                trace: *trace,
                json: cli.json,
            };
            let report = simulate::run_simulate(cfg, &opts, &shutdown)?;
            if cli.json {
                println!("{}", simulate::report_json(&report));
            } else {
                println!("{}", simulate::report_text(&report));
            }
            Ok(())
        }
        Commands::SelfCheck => {
            let summary = simulate::self_check(cfg)?;
            tracing::info!(
                position = summary.final_position,
                velocity = summary.final_velocity,
                "self-check passed"
            );
            println!("OK");
            Ok(())
        }
    }
}

fn report_error(e: &eyre::Report) {
    if JSON_MODE.get().copied().unwrap_or(false) {
        println!("{}", format_error_json(e));
    } else {
        eprintln!("{}", humanize(e));
    }
}
