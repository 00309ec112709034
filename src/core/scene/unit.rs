//=========================================================================
// Load Unit
//=========================================================================
//
// One scene inside a session: its identifier, its backend handle and the
// last progress value observed for it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::debug;

//=== Internal Dependencies ===============================================

use super::{LoadHandle, LoadMode, SceneId};
use crate::core::signal::Signal;

//=== LoadUnit ============================================================

/// A scene being loaded as part of a session.
pub struct LoadUnit {
    scene: SceneId,
    mode: LoadMode,
    handle: Box<dyn LoadHandle>,
    progress: f32,
    activation_allowed: bool,
}

impl LoadUnit {
    /// Wraps a freshly issued handle with activation held back.
    pub(crate) fn new(scene: SceneId, mode: LoadMode, mut handle: Box<dyn LoadHandle>) -> Self {
        handle.set_allow_activation(false);
        Self {
            scene,
            mode,
            handle,
            progress: 0.0,
            activation_allowed: false,
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn scene(&self) -> &SceneId {
        &self.scene
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    /// Progress observed at the last poll.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn activation_allowed(&self) -> bool {
        self.activation_allowed
    }

    pub fn is_done(&self) -> bool {
        self.handle.is_done()
    }

    //--- Per-Tick ---------------------------------------------------------

    /// Samples the handle's progress.
    ///
    /// Values are clamped to `[0, 1]` and never move backwards. Returns
    /// `true` if progress increased since the previous poll.
    pub(crate) fn poll(&mut self) -> bool {
        let sampled = self.handle.progress();
        let sampled = if sampled.is_nan() { 0.0 } else { sampled.clamp(0.0, 1.0) };

        if sampled > self.progress {
            self.progress = sampled;
            true
        } else {
            false
        }
    }

    //--- Activation -------------------------------------------------------

    /// Lets the unit activate as soon as it has loaded.
    pub(crate) fn permit(&mut self) {
        self.activation_allowed = true;
        self.handle.set_allow_activation(true);
    }

    /// Lets the unit activate and arms its completion signal.
    pub(crate) fn release(&mut self, on_completed: Signal) {
        debug!("Allowing activation of scene '{}'", self.scene);
        self.permit();
        self.handle.on_completed(on_completed);
    }

    /// Asks the backend to abort this load.
    pub(crate) fn cancel(&mut self) {
        if !self.handle.cancel() {
            debug!("Backend cannot cancel load of scene '{}'", self.scene);
        }
    }
}

impl fmt::Debug for LoadUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadUnit")
            .field("scene", &self.scene)
            .field("mode", &self.mode)
            .field("progress", &self.progress)
            .field("activation_allowed", &self.activation_allowed)
            .finish()
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::FakeBackend;
    use crate::core::scene::SceneBackend;

    fn unit_for(backend: &mut FakeBackend, name: &str) -> LoadUnit {
        let scene = SceneId::from(name);
        let handle = backend
            .begin_load(&scene, LoadMode::Additive)
            .expect("scene registered");
        LoadUnit::new(scene, LoadMode::Additive, handle)
    }

    #[test]
    fn new_units_are_held_back() {
        let mut backend = FakeBackend::with_scenes(["A"]);
        let unit = unit_for(&mut backend, "A");

        assert!(!unit.activation_allowed());
        assert_eq!(backend.allow_activation("A"), Some(false));
    }

    #[test]
    fn permit_reaches_handle() {
        let mut backend = FakeBackend::with_scenes(["A"]);
        let mut unit = unit_for(&mut backend, "A");

        unit.permit();
        assert!(unit.activation_allowed());
        assert_eq!(backend.allow_activation("A"), Some(true));
    }

    #[test]
    fn cancel_reaches_handle() {
        let mut backend = FakeBackend::with_scenes(["A"]);
        let mut unit = unit_for(&mut backend, "A");

        unit.cancel();
        assert!(backend.was_cancelled("A"));
    }

    #[test]
    fn poll_clamps_and_never_regresses() {
        let mut backend = FakeBackend::with_scenes(["A"]);
        let mut unit = unit_for(&mut backend, "A");

        backend.set_progress("A", 0.5);
        assert!(unit.poll());
        assert_eq!(unit.progress(), 0.5);

        backend.set_progress("A", 0.3);
        assert!(!unit.poll());
        assert_eq!(unit.progress(), 0.5);

        backend.set_progress("A", 1.7);
        assert!(unit.poll());
        assert_eq!(unit.progress(), 1.0);
    }

    #[test]
    fn poll_treats_nan_as_no_progress() {
        let mut backend = FakeBackend::with_scenes(["A"]);
        let mut unit = unit_for(&mut backend, "A");

        backend.set_progress("A", f32::NAN);
        assert!(!unit.poll());
        assert_eq!(unit.progress(), 0.0);
    }
}
