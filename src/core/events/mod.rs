//=========================================================================
// Loader Events
//=========================================================================
//
// Process-wide notifications about loading sessions.
//
// Architecture:
//   LoadOrchestrator ── publish() ──> EventBus ──┬─ read()  (last tick)
//                                                └─ Receiver per subscriber
//
//=========================================================================

//=== Module Declarations =================================================

mod event_bus;

//=== Public API ==========================================================

pub use event_bus::EventBus;

//=== Internal Dependencies ===============================================

use crate::core::orchestrator::LoaderState;
use crate::core::scene::SceneId;
use crate::error::LoaderError;

//=== LoaderEvent =========================================================

/// Notification published by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderEvent {
    /// A session is about to fade in and issue its loads.
    LoadStarted { scenes: Vec<SceneId> },

    /// The orchestrator moved between states.
    StateChanged { from: LoaderState, to: LoaderState },

    /// A session finished; published after its completion callback ran.
    LoadCompleted { scenes: Vec<SceneId> },

    /// A session ended without loading (aborted, cancelled or stalled).
    LoadFailed { error: LoaderError },

    /// A scene hit the stall timeout.
    StallDetected { scene: SceneId },
}
