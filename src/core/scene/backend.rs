//=========================================================================
// Scene Backend Contract
//=========================================================================
//
// The host engine's asynchronous scene-loading primitive, as consumed by
// the orchestrator. Implemented by engine integrations, never here.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{LoadMode, SceneId};
use crate::core::signal::Signal;
use crate::error::LoaderError;

//=== SceneBackend ========================================================

/// Starts asynchronous scene loads on the host engine.
pub trait SceneBackend: Send {
    /// Begins loading `scene`.
    ///
    /// Returns [`LoaderError::InvalidScene`] when the identifier does not
    /// resolve to a loadable unit.
    fn begin_load(&mut self, scene: &SceneId, mode: LoadMode)
        -> Result<Box<dyn LoadHandle>, LoaderError>;
}

//=== LoadHandle ==========================================================

/// One in-flight asynchronous load.
///
/// # Progress convention
///
/// `progress()` is non-decreasing in `[0, 1]`. While activation is held
/// back it stops at `0.9`; the remaining tenth covers activation itself.
pub trait LoadHandle: Send {
    /// Current load progress in `[0, 1]`.
    fn progress(&self) -> f32;

    /// Whether the unit may activate once loaded.
    fn set_allow_activation(&mut self, allow: bool);

    /// True once the unit has loaded and activated.
    fn is_done(&self) -> bool;

    /// Arms `signal` to fire when the load completes.
    ///
    /// Implementations must fire immediately if the load is already done.
    fn on_completed(&mut self, signal: Signal);

    /// Attempts to abort the load. Returns `false` if unsupported.
    fn cancel(&mut self) -> bool {
        false
    }
}
