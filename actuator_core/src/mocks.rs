//! In-memory host doubles used by the CLI simulator and tests.

use std::cell::Cell;
use std::rc::Rc;

use actuator_traits::{Placement, SceneLifecycle, Vec3};

/// A part whose position lives in shared storage, so the host keeps a
/// handle (via `clone`) to observe where the actuator moved it.
#[derive(Debug, Clone)]
pub struct SharedPart {
    name: Rc<str>,
    position: Rc<Cell<Vec3>>,
    configured: bool,
}

impl SharedPart {
    pub fn new(name: &str, position: Vec3) -> Self {
        Self {
            name: Rc::from(name),
            position: Rc::new(Cell::new(position)),
            configured: true,
        }
    }

    /// A part that is not attached to any assembly.
    pub fn detached(name: &str) -> Self {
        Self {
            configured: false,
            ..Self::new(name, Vec3::ZERO)
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position.get()
    }
}

impl Placement for SharedPart {
    fn name(&self) -> &str {
        &self.name
    }

    fn local_position(&self) -> Vec3 {
        self.position.get()
    }

    fn set_local_position(&mut self, position: Vec3) {
        self.position.set(position);
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

/// Scene loading flag shared between the host and the actuator.
#[derive(Debug, Clone, Default)]
pub struct SceneFlag {
    loading: Rc<Cell<bool>>,
}

impl SceneFlag {
    /// A scene that is still deserializing.
    pub fn loading() -> Self {
        let flag = Self::default();
        flag.set_loading(true);
        flag
    }

    pub fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }
}

impl SceneLifecycle for SceneFlag {
    fn is_loading(&self) -> bool {
        self.loading.get()
    }
}
