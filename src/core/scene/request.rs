//=========================================================================
// Load Request
//=========================================================================
//
// Immutable description of one loading session, plus the outcome types
// delivered to its completion callback.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::debug;

//=== Internal Dependencies ===============================================

use super::{LoadMode, SceneId};
use crate::error::LoaderError;

//=== Outcome Types =======================================================

/// Summary of a session that finished successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Scenes that were loaded, in request order.
    pub scenes: Vec<SceneId>,

    /// Scenes dropped because the backend refused them.
    pub skipped: Vec<SceneId>,

    /// Seconds between the loads being issued and the session finishing.
    pub elapsed: f64,

    /// True if activation was forced after a stall.
    pub forced: bool,
}

/// Result handed to a request's completion callback.
pub type LoadOutcome = Result<LoadReport, LoaderError>;

/// Callback invoked exactly once when a request finishes, fails or is
/// refused. A request dropped before any of those resolves it with
/// [`LoaderError::Cancelled`].
///
/// Callbacks of requests handled by a runtime run on the loader thread.
pub type CompletionCallback = Box<dyn FnOnce(LoadOutcome) + Send>;

//=== LoadRequest =========================================================

/// Ordered set of scenes to load in one session.
///
/// # Example
///
/// ```rust
/// # use aetheric_scene_loader::prelude::*;
/// let request = LoadRequest::new(["Town", "TownAmbience"], false)
///     .on_complete(|outcome| {
///         if let Err(err) = outcome {
///             eprintln!("load failed: {err}");
///         }
///     });
///
/// assert_eq!(request.len(), 2);
/// assert_eq!(request.mode_for(1), LoadMode::Additive);
/// ```
pub struct LoadRequest {
    scenes: Vec<SceneId>,
    additive: bool,
    on_complete: Option<CompletionCallback>,
}

impl LoadRequest {
    //--- Construction -----------------------------------------------------

    /// Creates a request for `scenes` in order.
    ///
    /// `additive` applies to the first scene only; every later scene is
    /// loaded additively.
    pub fn new<I, T>(scenes: I, additive: bool) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SceneId>,
    {
        Self {
            scenes: scenes.into_iter().map(Into::into).collect(),
            additive,
            on_complete: None,
        }
    }

    /// Sets the callback invoked with the session outcome.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(LoadOutcome) + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    //--- Queries ----------------------------------------------------------

    pub fn scenes(&self) -> &[SceneId] {
        &self.scenes
    }

    pub fn is_additive(&self) -> bool {
        self.additive
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Load mode for the scene at `index`.
    pub fn mode_for(&self, index: usize) -> LoadMode {
        LoadMode::for_position(index, self.additive)
    }

    //--- Completion -------------------------------------------------------

    /// Delivers `outcome` to the callback, if one is still pending.
    ///
    /// Later calls are no-ops, so the callback runs at most once.
    pub(crate) fn resolve(&mut self, outcome: LoadOutcome) {
        match self.on_complete.take() {
            Some(callback) => callback(outcome),
            None => debug!("No completion callback pending for {:?}", self.scenes),
        }
    }
}

impl Drop for LoadRequest {
    fn drop(&mut self) {
        if let Some(callback) = self.on_complete.take() {
            debug!("Load request for {:?} dropped unresolved", self.scenes);
            callback(Err(LoaderError::Cancelled));
        }
    }
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("scenes", &self.scenes)
            .field("additive", &self.additive)
            .field("has_callback", &self.on_complete.is_some())
            .finish()
    }
}

//=== Tests ===============================================================
