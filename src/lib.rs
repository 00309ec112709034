//=========================================================================
// Aetheric Scene Loader — Library Root
//
// Loads scenes behind a loading-screen overlay.
//
// Responsibilities:
// - Expose the loader facade (`SceneLoader`) and its orchestrator
// - Define the contracts a host engine implements (`SceneBackend`,
//   `LoadHandle`, `Presenter`)
// - Offer a threaded runtime for hosts that tick on another thread
//
// Typical usage:
// ```ignore
// use aetheric_scene_loader::prelude::*;
//
// let settings = LoaderSettings::new().with_overlay(|| overlay());
// let mut loader = SceneLoader::new(settings, engine_backend);
//
// loader.load_scene("Town", false)?;
// loop {
//     loader.tick(clock.seconds());
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the orchestrator, scene contracts, overlay contract and
// events. Most applications only need the re-exports below.
//
pub mod core;
pub mod error;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `runtime` owns the loader thread; its types are re-exported below.
//
mod runtime;

//--- Public Exports ------------------------------------------------------

pub use crate::core::orchestrator::{LoadOrchestrator, LoaderState};
pub use crate::core::settings::LoaderSettings;
pub use crate::core::SceneLoader;
pub use error::LoaderError;
pub use runtime::{LoaderHandle, LoaderRuntime, LoaderRuntimeBuilder};
