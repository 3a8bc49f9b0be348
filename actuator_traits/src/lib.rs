//! Host-facing seams shared by the actuator crates.
//!
//! The motion engine never talks to a scene graph or a wall clock directly.
//! It moves [`Placement`]s along an axis, asks a [`SceneLifecycle`] whether
//! the host is still deserializing, and paces scripted runs through a
//! [`Clock`].

pub mod clock;
pub mod geometry;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use geometry::Vec3;

/// A part moved by an actuator (carriage, platform, rod end).
///
/// The actuator only reads and writes the local position; everything else
/// about the part belongs to the host.
pub trait Placement {
    fn name(&self) -> &str;
    fn local_position(&self) -> Vec3;
    fn set_local_position(&mut self, position: Vec3);

    /// Whether the part is attached to an assembly the actuator may drive.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Scene lifecycle queried by the actuator before it touches part positions.
pub trait SceneLifecycle {
    /// True while the host is still loading (deserializing) the scene.
    fn is_loading(&self) -> bool;
}
