use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_inputs(dir: &tempfile::TempDir, policy: &str) -> (PathBuf, PathBuf) {
    let toml = format!(
        r#"
[travel]
policy = "{policy}"

[[parts]]
name = "carriage"
gear = 2.0

[[sensors]]
center = 0.25
width = 0.1

[simulation]
tick_hz = 50
duration_ms = 2000
"#
    );
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, toml).unwrap();
    let script = dir.path().join("script.csv");
    fs::write(
        &script,
        "time_ms,action,arg\n0,move_forward,1\n600,alternate_speed,on\n1200,move_forward,0\n",
    )
    .unwrap();
    (cfg, script)
}

fn run_json(cfg: &PathBuf, script: &PathBuf, trace: bool) -> String {
    let mut cmd = Command::cargo_bin("actuator").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(cfg)
        .arg("simulate")
        .arg("--script")
        .arg(script);
    if trace {
        cmd.arg("--trace");
    }
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8_lossy(&out).into_owned()
}

/// Validate the JSONL summary schema for a completed run.
#[rstest]
fn jsonl_summary_schema() {
    let dir = tempdir().unwrap();
    let (cfg, script) = write_inputs(&dir, "stop");

    let stdout = run_json(&cfg, &script, false);
    let line = stdout
        .lines()
        .find(|l| l.contains("\"final_position\""))
        .unwrap_or("")
        .to_string();
    assert!(
        !line.is_empty(),
        "no JSONL line with final_position found; stdout was: {stdout}"
    );

    let v: serde_json::Value = serde_json::from_str(&line).expect("valid JSON");

    assert!(v.get("timestamp").and_then(|x| x.as_i64()).is_some());
    assert_eq!(v.get("ticks").and_then(|x| x.as_u64()), Some(100));
    assert_eq!(v.get("elapsed_ms").and_then(|x| x.as_u64()), Some(2000));
    assert_eq!(v.get("actions_applied").and_then(|x| x.as_u64()), Some(3));
    for key in ["final_position", "final_velocity", "min_position", "max_position"] {
        assert!(
            v.get(key).and_then(|x| x.as_f64()).is_some(),
            "{key} should be a number"
        );
    }
    assert_eq!(v.get("command").and_then(|x| x.as_str()), Some("Stop"));
    for key in ["min", "mid", "max"] {
        assert!(v["limits"][key].is_boolean(), "limits.{key} should be bool");
    }

    let sensors = v["sensors"].as_array().expect("sensors array");
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0]["name"], "actuator.sensor.0");
    assert!(sensors[0]["active"].is_boolean());

    // Gear 2: the part travels twice the motor distance along +Z.
    let parts = v["parts"].as_array().expect("parts array");
    let z = parts[0]["position"][2].as_f64().unwrap();
    let x = v["final_position"].as_f64().unwrap();
    assert!((z - 2.0 * x).abs() < 1e-9, "part z {z} vs motor {x}");

    assert!(v.get("abort_reason").is_some());
    assert!(v.get("abort_reason").unwrap().is_null());
}

/// With --trace every tick is one JSON line ahead of the summary.
#[rstest]
#[case("stop")]
#[case("eccentric")]
fn jsonl_trace_has_one_line_per_tick(#[case] policy: &str) {
    let dir = tempdir().unwrap();
    let (cfg, script) = write_inputs(&dir, policy);

    let stdout = run_json(&cfg, &script, true);
    let ticks: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|l| l.contains("\"t_ms\""))
        .map(|l| serde_json::from_str(l).expect("valid JSON"))
        .collect();
    assert_eq!(ticks.len(), 100);
    assert_eq!(ticks[0]["t_ms"], 20);
    assert!(ticks.iter().all(|t| t["velocity"].is_f64()));
    assert!(ticks.iter().all(|t| t["status"].is_string()));
    let times: Vec<u64> = ticks.iter().map(|t| t["t_ms"].as_u64().unwrap()).collect();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}
