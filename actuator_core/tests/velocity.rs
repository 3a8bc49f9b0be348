use actuator_core::{RampTick, VelocityController};
use proptest::prelude::*;

/// Controller already cruising at `v` (ramps applied from the next retarget on).
fn cruising_at(v: f64, up: f64, down: f64, dt: f64) -> VelocityController {
    let mut vc = VelocityController::new(false);
    vc.set_target(v, up, down);
    vc.step(dt);
    vc.set_acceleration_enabled(true);
    vc
}

fn run(vc: &mut VelocityController, dt: f64, max_ticks: usize) -> Vec<RampTick> {
    let mut ticks = Vec::new();
    for _ in 0..max_ticks {
        let t = vc.step(dt);
        ticks.push(t);
        if vc.at_target() {
            break;
        }
    }
    ticks
}

#[test]
fn ramps_up_linearly_and_reaches_target_exactly_once() {
    let mut vc = VelocityController::new(true);
    vc.set_target(1.0, 1.0, 1.0);
    assert!((vc.slope() - 1.0).abs() < 1e-12);

    let ticks = run(&mut vc, 0.1, 50);
    assert!((9..=10).contains(&ticks.len()), "took {} ticks", ticks.len());
    assert!((ticks[0].velocity - 0.1).abs() < 1e-12);
    assert!(ticks.windows(2).all(|w| w[1].velocity >= w[0].velocity));
    assert_eq!(ticks.iter().filter(|t| t.reached).count(), 1);
    assert!(ticks.last().is_some_and(|t| t.reached && t.velocity == 1.0));
    assert!(vc.is_plateau());

    // At target: further steps change nothing and do not re-notify.
    let t = vc.step(0.1);
    assert!(!t.reached);
    assert!((t.velocity - 1.0).abs() < f64::EPSILON);
}

#[test]
fn slows_down_with_ramp_down_time() {
    let mut vc = cruising_at(1.0, 1.0, 0.5, 0.1);
    vc.set_target(0.0, 1.0, 0.5);
    assert!((vc.ramp_time() + 0.5).abs() < 1e-12);
    assert!((vc.slope() + 2.0).abs() < 1e-12);
    let ticks = run(&mut vc, 0.1, 50);
    assert!(ticks.len() <= 5);
    assert!(vc.current() == 0.0);
}

#[test]
fn negative_side_uses_mirrored_ramps() {
    let mut vc = VelocityController::new(true);
    vc.set_target(-0.3, 0.3, 0.6);
    // Growing magnitude on the negative side uses ramp-up with a negative sign.
    assert!((vc.ramp_time() + 0.3).abs() < 1e-12);
    run(&mut vc, 0.01, 100);
    vc.set_target(-0.1, 0.3, 0.6);
    // Shrinking magnitude uses ramp-down, positive slope.
    assert!((vc.ramp_time() - 0.6).abs() < 1e-12);
    assert!(vc.slope() > 0.0);
}

#[test]
fn reversal_passes_through_zero_and_switches_once() {
    let mut vc = cruising_at(1.0, 1.0, 1.0, 0.1);
    vc.set_target(-1.0, 1.0, 1.0);
    assert!(vc.is_switching_direction());

    let ticks = run(&mut vc, 0.1, 100);
    assert_eq!(ticks.iter().filter(|t| t.direction_switched).count(), 1);
    let switch = ticks.iter().position(|t| t.direction_switched).unwrap_or(usize::MAX);
    assert!(ticks[switch].velocity == 0.0);
    // Never jumps across zero in a single tick.
    let mut prev = 1.0_f64;
    for t in &ticks {
        assert!(!(prev > 0.0 && t.velocity < 0.0), "{prev} -> {}", t.velocity);
        prev = t.velocity;
    }
    assert!(ticks.iter().take(switch).all(|t| t.velocity >= 0.0));
    assert!(ticks.iter().skip(switch + 1).all(|t| t.velocity < 0.0));
    assert!(vc.current() == -1.0);
    assert_eq!(ticks.iter().filter(|t| t.reached).count(), 1);
    assert!(!vc.is_switching_direction());
}

#[test]
fn unaligned_reversal_clamps_at_zero_instead_of_crossing() {
    // dt does not divide the ramp: the decel leg would otherwise overshoot 0.
    let mut vc = cruising_at(0.25, 1.0, 1.0, 0.1);
    vc.set_target(-0.25, 1.0, 1.0);
    let ticks = run(&mut vc, 0.1, 100);
    let velocities: Vec<f64> = ticks.iter().map(|t| t.velocity).collect();
    assert!(velocities.contains(&0.0));
    let mut prev = 0.25_f64;
    for v in &velocities {
        assert!(!(prev > 0.0 && *v < 0.0), "{prev} -> {v}");
        prev = *v;
    }
    assert!(vc.current() == -0.25);
}

#[test]
fn disabled_acceleration_snaps_to_target() {
    let mut vc = VelocityController::new(false);
    vc.set_target(0.3, 0.3, 0.3);
    let t = vc.step(0.01);
    assert!((t.velocity - 0.3).abs() < f64::EPSILON);
    vc.set_target(-0.3, 0.3, 0.3);
    let t = vc.step(0.01);
    assert!((t.velocity + 0.3).abs() < f64::EPSILON);
    assert!(vc.is_plateau());
}

#[test]
fn reset_zeroes_everything() {
    let mut vc = VelocityController::new(true);
    vc.set_target(0.3, 0.3, 0.3);
    vc.step(0.01);
    vc.reset();
    assert!(vc.current() == 0.0);
    assert!(vc.target() == 0.0);
    assert!(vc.slope() == 0.0);
    assert!(vc.at_target());
    let t = vc.step(0.01);
    assert!(t.velocity == 0.0);
}

proptest! {
    #[test]
    fn ramp_stays_between_start_and_target_and_arrives(
        start in -2.0f64..2.0,
        target in -2.0f64..2.0,
        up in 0.05f64..2.0,
        down in 0.05f64..2.0,
        dt in 0.001f64..0.05,
    ) {
        let mut vc = cruising_at(start, up, down, dt);
        prop_assert!(vc.set_target(target, up, down));

        let lo = start.min(target);
        let hi = start.max(target);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let budget = ((up + down) / dt).ceil() as usize + 8;
        let mut prev = start;
        let mut switches = 0;
        for _ in 0..budget {
            let t = vc.step(dt);
            prop_assert!(t.velocity >= lo && t.velocity <= hi, "{} outside [{lo}, {hi}]", t.velocity);
            prop_assert!(!(prev > 0.0 && t.velocity < 0.0) && !(prev < 0.0 && t.velocity > 0.0));
            if t.direction_switched {
                switches += 1;
            }
            prev = t.velocity;
            if vc.at_target() {
                break;
            }
        }
        prop_assert!(vc.current() == target, "did not arrive: {} vs {target}", vc.current());
        let reversal = (start > 0.0 && target < 0.0) || (start < 0.0 && target > 0.0);
        prop_assert_eq!(switches, usize::from(reversal));
    }
}
