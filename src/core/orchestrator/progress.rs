//=========================================================================
// Progress Aggregation & Activation Gate
//=========================================================================
//
// Pure per-tick computations over a session's units.
//
// Aggregate progress is a plain mean: every scene weighs 1/N regardless
// of its size.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::scene::{LoadUnit, SceneId};

//=== Aggregation =========================================================

/// Mean of `values`, or `0.0` when empty.
pub(crate) fn mean_progress<I>(values: I) -> f32
where
    I: IntoIterator<Item = f32>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f32, 0_usize), |(sum, count), value| (sum + value, count + 1));

    if count == 0 {
        0.0
    } else {
        (sum / count as f32).clamp(0.0, 1.0)
    }
}

/// Mean progress over `units`.
pub(crate) fn aggregate_progress(units: &[LoadUnit]) -> f32 {
    mean_progress(units.iter().map(LoadUnit::progress))
}

/// First scene still short of full progress, in request order.
pub(crate) fn loading_scene(units: &[LoadUnit]) -> Option<&SceneId> {
    units
        .iter()
        .find(|unit| unit.progress() < 1.0)
        .map(LoadUnit::scene)
}

//=== Activation Gate =====================================================

/// Whether the last unit may be released.
///
/// Both the minimum visible duration and the readiness threshold must be
/// met. A backend caps progress at the threshold while activation is held
/// back, so reaching it means "loaded, waiting to activate".
pub(crate) fn gate_open(
    elapsed: f64,
    min_visible_duration: f64,
    last_progress: f32,
    threshold: f32,
) -> bool {
    elapsed >= min_visible_duration && last_progress >= threshold
}

//=========================================================================
// Tests
//=========================================================================
