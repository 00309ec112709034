//=========================================================================
// Scene Loading Primitives
//=========================================================================
//
// Types describing what gets loaded and how the host engine loads it.
//
// Architecture:
//   LoadRequest ──(fade-in done)──> SceneBackend::begin_load()
//                                        ↓
//                                   LoadUnit { handle: Box<dyn LoadHandle> }
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Module Declarations =================================================

mod backend;
mod request;
mod unit;

//=== Public API ==========================================================

pub use backend::{LoadHandle, SceneBackend};
pub use request::{CompletionCallback, LoadOutcome, LoadReport, LoadRequest};
pub use unit::LoadUnit;

//=== SceneId =============================================================

/// Name of an independently loadable chunk of content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(String);

impl SceneId {
    /// Creates a scene identifier from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SceneId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

//=== LoadMode ============================================================

/// How a scene is brought in relative to the currently active content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadMode {
    /// Replaces all current content.
    Single,

    /// Loads alongside current content.
    Additive,
}

impl LoadMode {
    /// Mode for the unit at `index` in a request.
    ///
    /// Only the first unit honours the caller's choice. Loading several
    /// non-additive scenes at once is not a legal backend operation, so
    /// every later unit is forced additive.
    pub fn for_position(index: usize, additive: bool) -> Self {
        if index == 0 && !additive {
            Self::Single
        } else {
            Self::Additive
        }
    }
}

//=== Tests ===============================================================
