use actuator_config::{LimitPolicy, ResetPosition, ZoneLayout, load_toml};
use rstest::rstest;

const FULL: &str = r#"
[drive]
speed = 0.4
alternate_speed = 0.05
use_ramp = true
ramp_up_ms = 250
ramp_down_ms = 500

[travel]
min = 0.0
mid = 0.3
max = 0.6
tolerance = 0.02
layout = "min-max"
policy = "eccentric"
reset_position = "mid"
axis = [0.0, 1.0, 0.0]
initial_position = 0.1

[[parts]]
name = "carriage"

[[parts]]
name = "rod"
gear = 0.5

[[sensors]]
center = 0.3
width = 0.04

[simulation]
tick_hz = 200
duration_ms = 1500
"#;

#[test]
fn full_config_parses_and_validates() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.travel.layout, ZoneLayout::MinMax);
    assert_eq!(cfg.travel.policy, LimitPolicy::Eccentric);
    assert_eq!(cfg.travel.reset_position, ResetPosition::Mid);
    assert_eq!(cfg.parts.len(), 2);
    assert!((cfg.parts[0].gear - 1.0).abs() < f64::EPSILON);
    assert!((cfg.parts[1].gear - 0.5).abs() < f64::EPSILON);
    assert_eq!(cfg.simulation.tick_hz, 200);
}

#[test]
fn empty_config_uses_defaults() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults are valid");
    assert!((cfg.drive.speed - 0.3).abs() < f64::EPSILON);
    assert!((cfg.travel.max - 0.5).abs() < f64::EPSILON);
    assert!((cfg.travel.tolerance - 0.05).abs() < f64::EPSILON);
    assert_eq!(cfg.travel.policy, LimitPolicy::Stop);
}

#[rstest]
#[case("[drive]\nspeed = 0.0", "drive.speed must be > 0")]
#[case("[drive]\nalternate_speed = -1.0", "drive.alternate_speed must be > 0")]
#[case("[drive]\nramp_up_ms = -5.0", "drive.ramp_up_ms must be >= 0")]
#[case("[travel]\nmin = 0.3", "min < mid < max")]
#[case("[travel]\nmax = 0.2", "min < mid < max")]
#[case("[travel]\ntolerance = -0.01", "travel.tolerance must be >= 0")]
#[case("[travel]\ninitial_position = 0.8", "travel.initial_position must be within [min, max]")]
#[case("[travel]\ninitial_position = -0.1", "travel.initial_position must be within [min, max]")]
#[case("[travel]\naxis = [0.0, 0.0, 0.0]", "travel.axis must be a non-zero")]
#[case("[[parts]]\nname = \"p\"\ngear = 0.0", "parts[0].gear must be > 0")]
#[case("[[parts]]\nname = \" \"", "parts[0].name must not be empty")]
#[case("[[sensors]]\ncenter = 0.1\nwidth = 0.0", "sensors[0].width must be > 0")]
#[case("[simulation]\ntick_hz = 0", "simulation.tick_hz must be in 1..=10000")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation must be one of")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "expected '{needle}' in '{err}'"
    );
}

#[test]
fn unknown_policy_is_a_parse_error() {
    assert!(load_toml("[travel]\npolicy = \"bounce\"").is_err());
}
