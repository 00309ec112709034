//=========================================================================
// Loader Errors
//=========================================================================
//
// Error taxonomy for scene loading sessions.
//
// Errors never unwind into caller code. They are logged where they occur
// and delivered to the request's completion callback (and returned from
// the facade when the request is refused up front).
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::scene::SceneId;

//=== LoaderError =========================================================

/// Failures a loading request can end with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoaderError {
    /// No loading-screen overlay is configured.
    #[error("no loading screen overlay configured")]
    Configuration,

    /// The request named no scenes.
    #[error("load request contains no scenes")]
    EmptyRequest,

    /// The backend refused to load a scene identifier.
    #[error("scene '{scene}' cannot be loaded")]
    InvalidScene { scene: SceneId },

    /// A scene made no progress within the configured stall timeout.
    #[error("scene '{scene}' made no progress for {waited:.2}s")]
    StalledLoad { scene: SceneId, waited: f64 },

    /// Another session is active and the busy policy rejects new requests.
    #[error("a loading session is already active")]
    SessionActive,

    /// The session was cancelled before it finished.
    #[error("loading session cancelled")]
    Cancelled,

    /// The loader runtime thread is no longer running.
    #[error("loader runtime has stopped")]
    RuntimeStopped,

    /// The runtime command channel was full when sent to from the loader
    /// thread, where blocking would deadlock.
    #[error("loader command channel is full")]
    CommandQueueFull,
}

//=== Tests ===============================================================
