//! Windowed presence sensor over the travelled distance.

use crate::signal::{DigitalSignal, Edge};

/// Active while `center - width/2 <= position <= center + width/2`.
#[derive(Debug, Clone)]
pub struct RangeSensor {
    center: f64,
    width: f64,
    output: DigitalSignal,
}

impl RangeSensor {
    /// `None` unless `center` is finite and `width` is finite and positive.
    pub fn new(symbol: impl Into<String>, center: f64, width: f64) -> Option<Self> {
        if !center.is_finite() || !(width.is_finite() && width > 0.0) {
            return None;
        }
        Some(Self {
            center,
            width,
            output: DigitalSignal::new(symbol),
        })
    }

    #[inline]
    pub fn center(&self) -> f64 {
        self.center
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn output(&self) -> &DigitalSignal {
        &self.output
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.output.is_active()
    }

    pub fn set_center(&mut self, center: f64) -> bool {
        if center.is_finite() {
            self.center = center;
            true
        } else {
            false
        }
    }

    pub fn set_width(&mut self, width: f64) -> bool {
        if width.is_finite() && width > 0.0 {
            self.width = width;
            true
        } else {
            tracing::warn!(
                sensor = self.output.symbol(),
                width,
                "range sensor width must be > 0; keeping previous"
            );
            false
        }
    }

    pub fn contains(&self, position: f64) -> bool {
        let half = self.width / 2.0;
        position >= self.center - half && position <= self.center + half
    }

    /// Drive the output from `position`. Safe to call every tick.
    pub fn update(&self, position: f64) -> Option<Edge> {
        self.output.set(self.contains(position))
    }
}
