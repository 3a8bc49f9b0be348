//! Common time/period helpers for actuator_core.

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Compute the period in microseconds for a given tick rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Ramp durations are configured in milliseconds and consumed in seconds.
#[inline]
pub fn ms_to_secs(ms: f64) -> f64 {
    ms / 1_000.0
}

/// Non-finite inputs collapse to zero.
#[inline]
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}
