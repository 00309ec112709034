//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_scene_loader::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Loader facade and runtime
pub use crate::core::SceneLoader;
pub use crate::runtime::{LoaderHandle, LoaderRuntime, LoaderRuntimeBuilder};

// Orchestration
pub use crate::core::orchestrator::{LoadOrchestrator, LoaderState};
pub use crate::core::settings::{BusyPolicy, InvalidScenePolicy, LoaderSettings, StallPolicy};

// Scene contracts
pub use crate::core::scene::{
    LoadHandle, LoadMode, LoadOutcome, LoadReport, LoadRequest, SceneBackend, SceneId,
};

// Overlay
pub use crate::core::presenter::{OverlayTemplate, Presenter};
pub use crate::core::signal::Signal;

// Events
pub use crate::core::events::{EventBus, LoaderEvent};

// Errors
pub use crate::error::LoaderError;
