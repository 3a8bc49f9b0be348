use std::rc::Rc;

use actuator_core::error::{ActuatorError, BuildError};
use actuator_core::mocks::{SceneFlag, SharedPart};
use actuator_core::{Actuator, DriveCfg, TravelCfg};
use actuator_traits::Vec3;
use rstest::rstest;

#[rstest]
fn builder_missing_scene_yields_typed_build_error() {
    let err = Actuator::builder("lift")
        // missing with_scene()
        .with_part(SharedPart::new("carriage", Vec3::ZERO), 1.0)
        .try_build()
        .expect_err("should fail with MissingScene");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingScene) => {}
        other => panic!("expected MissingScene, got: {other:?}"),
    }
}

#[rstest]
#[case::inverted(TravelCfg { min: 0.5, max: 0.0, ..TravelCfg::default() })]
#[case::mid_outside(TravelCfg { mid: 0.7, ..TravelCfg::default() })]
#[case::negative_tolerance(TravelCfg { tolerance: -0.01, ..TravelCfg::default() })]
#[case::zero_axis(TravelCfg { axis: Vec3::ZERO, ..TravelCfg::default() })]
#[case::nan_axis(TravelCfg { axis: Vec3::new(f64::NAN, 0.0, 1.0), ..TravelCfg::default() })]
#[case::infinite_start(TravelCfg { initial_position: f64::INFINITY, ..TravelCfg::default() })]
#[case::start_above_max(TravelCfg { initial_position: 0.8, ..TravelCfg::default() })]
#[case::start_below_min(TravelCfg { initial_position: -0.2, ..TravelCfg::default() })]
fn invalid_travel_is_rejected(#[case] travel: TravelCfg) {
    let err = Actuator::builder("lift")
        .with_scene(Rc::new(SceneFlag::default()))
        .with_travel(travel)
        .build()
        .expect_err("invalid travel");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[rstest]
#[case::zero_speed(DriveCfg { speed: 0.0, ..DriveCfg::default() })]
#[case::negative_alternate(DriveCfg { alternate_speed: -0.1, ..DriveCfg::default() })]
#[case::negative_ramp(DriveCfg { ramp_up_ms: -5.0, ..DriveCfg::default() })]
fn invalid_drive_is_rejected(#[case] drive: DriveCfg) {
    let err = Actuator::builder("lift")
        .with_scene(Rc::new(SceneFlag::default()))
        .with_drive(drive)
        .build()
        .expect_err("invalid drive");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn zero_ramps_build_without_acceleration() {
    let act = Actuator::builder("lift")
        .with_scene(Rc::new(SceneFlag::default()))
        .with_drive(DriveCfg {
            ramp_up_ms: 0.0,
            ramp_down_ms: 0.0,
            ..DriveCfg::default()
        })
        .build()
        .unwrap();
    assert!(!act.drive().use_ramp);
}

#[test]
fn detached_part_fails_the_build() {
    let err = Actuator::builder("lift")
        .with_scene(Rc::new(SceneFlag::default()))
        .with_part(SharedPart::detached("ghost"), 1.0)
        .build()
        .expect_err("detached part");
    assert_eq!(
        err.downcast_ref::<ActuatorError>(),
        Some(&ActuatorError::PartNotConfigured("ghost".into()))
    );
}

#[test]
fn bad_sensor_window_fails_the_build() {
    let err = Actuator::builder("lift")
        .with_scene(Rc::new(SceneFlag::default()))
        .with_sensor(0.2, 0.0)
        .build()
        .expect_err("zero width");
    assert!(err.downcast_ref::<BuildError>().is_some());
}

#[test]
fn sensors_get_default_symbols() {
    let act = Actuator::builder("lift")
        .with_scene(Rc::new(SceneFlag::default()))
        .with_sensor(0.0, 0.1)
        .with_named_sensor("door", 0.4, 0.1)
        .build()
        .unwrap();
    let symbols: Vec<_> = act.sensors().iter().map(|s| s.output().symbol()).collect();
    assert_eq!(symbols, ["lift.sensor.0", "door"]);
    assert!(act.sensors()[0].is_active());
    assert!(!act.sensors()[1].is_active());
}
