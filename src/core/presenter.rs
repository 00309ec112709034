//=========================================================================
// Presenter Contract
//=========================================================================
//
// The loading-screen overlay as seen by the orchestrator.
//
// The orchestrator never assumes fade durations or easing. It relies only
// on the fade-in signal firing exactly once after the overlay is fully
// visible. Fade-out is fire-and-forget.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::signal::Signal;

//=== Presenter ===========================================================

/// Visual loading-screen overlay.
///
/// # Minimal Implementation
///
/// ```rust
/// # use aetheric_scene_loader::prelude::*;
/// struct Overlay {
///     progress: f32,
/// }
///
/// impl Presenter for Overlay {
///     fn fade_in(&mut self, on_complete: Signal) {
///         // Start the fade animation; fire when it ends.
///         on_complete.fire();
///     }
///
///     fn fade_out(&mut self) {}
///
///     fn set_progress(&mut self, progress: f32) {
///         self.progress = progress;
///     }
///
///     fn set_scene_name(&mut self, _name: &str) {}
/// }
/// ```
pub trait Presenter: Send {
    /// Starts showing the overlay. `on_complete` fires once fully visible.
    fn fade_in(&mut self, on_complete: Signal);

    /// Starts hiding the overlay.
    fn fade_out(&mut self);

    /// Aggregate progress in `[0, 1]`.
    fn set_progress(&mut self, progress: f32);

    /// Scene currently loading, or empty once all are loaded.
    fn set_scene_name(&mut self, name: &str);
}

//=== OverlayTemplate =====================================================

/// Factory for the overlay, resolved once when the orchestrator is built.
pub trait OverlayTemplate: Send + Sync {
    fn instantiate(&self) -> Box<dyn Presenter>;
}

impl<F> OverlayTemplate for F
where
    F: Fn() -> Box<dyn Presenter> + Send + Sync,
{
    fn instantiate(&self) -> Box<dyn Presenter> {
        self()
    }
}
