//=========================================================================
// Loader Settings
//=========================================================================
//
// Configuration record read once when the orchestrator is constructed.
//
// Default Values:
//   min_visible_duration   2.0 s
//   activation_threshold   0.9
//   completion_delay       0.2 s
//   busy_policy            Reject
//   invalid_scene_policy   AbortSession
//   stall_timeout          None (stalls wait forever)
//   stall_policy           Abort
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::Arc;

//=== Internal Dependencies ===============================================

use crate::core::presenter::OverlayTemplate;

//=== Policies ============================================================

/// What to do with a request that arrives while a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyPolicy {
    /// Refuse it with [`crate::LoaderError::SessionActive`].
    #[default]
    Reject,

    /// Hold it and start it once the orchestrator is idle again.
    Enqueue,
}

/// What to do when the backend refuses a scene identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidScenePolicy {
    /// Cancel everything already issued and fail the session.
    #[default]
    AbortSession,

    /// Drop the unit with a warning and load the rest.
    SkipUnit,
}

/// What to do when a session hits its stall timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StallPolicy {
    /// Cancel the session with [`crate::LoaderError::StalledLoad`].
    #[default]
    Abort,

    /// Open the activation gate regardless of progress.
    ForceActivation,
}

//=== LoaderSettings ======================================================

/// Settings for a [`crate::LoadOrchestrator`].
///
/// # Examples
///
/// ```rust
/// # use aetheric_scene_loader::prelude::*;
/// let settings = LoaderSettings::new()
///     .with_min_visible_duration(1.0)
///     .with_busy_policy(BusyPolicy::Enqueue)
///     .with_stall_timeout(10.0);
///
/// assert_eq!(settings.min_visible_duration(), 1.0);
/// assert_eq!(settings.stall_timeout(), Some(10.0));
/// ```
#[derive(Clone)]
pub struct LoaderSettings {
    overlay: Option<Arc<dyn OverlayTemplate>>,
    min_visible_duration: f64,
    activation_threshold: f32,
    completion_delay: f64,
    busy_policy: BusyPolicy,
    invalid_scene_policy: InvalidScenePolicy,
    stall_timeout: Option<f64>,
    stall_policy: StallPolicy,
}

impl LoaderSettings {
    //--- Construction -----------------------------------------------------

    /// Creates settings with defaults and no overlay.
    pub fn new() -> Self {
        Self {
            overlay: None,
            min_visible_duration: 2.0,
            activation_threshold: 0.9,
            completion_delay: 0.2,
            busy_policy: BusyPolicy::default(),
            invalid_scene_policy: InvalidScenePolicy::default(),
            stall_timeout: None,
            stall_policy: StallPolicy::default(),
        }
    }

    //--- Builder ----------------------------------------------------------

    /// Sets the overlay shown during loading.
    pub fn with_overlay<T>(mut self, template: T) -> Self
    where
        T: OverlayTemplate + 'static,
    {
        self.overlay = Some(Arc::new(template));
        self
    }

    /// Minimum seconds the overlay stays up once loads are issued.
    ///
    /// # Panics
    ///
    /// Panics if `seconds` is negative or not finite.
    pub fn with_min_visible_duration(mut self, seconds: f64) -> Self {
        assert!(
            seconds.is_finite() && seconds >= 0.0,
            "Minimum visible duration must be non-negative, got {}",
            seconds
        );
        self.min_visible_duration = seconds;
        self
    }

    /// Progress at which the last unit counts as loaded pending activation.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is outside `(0, 1]`.
    pub fn with_activation_threshold(mut self, threshold: f32) -> Self {
        assert!(
            threshold > 0.0 && threshold <= 1.0,
            "Activation threshold must be in (0, 1], got {}",
            threshold
        );
        self.activation_threshold = threshold;
        self
    }

    /// Seconds to wait after the last unit completes before fading out.
    ///
    /// Counted from the tick that observes completion, so the overlay may
    /// stay up to one extra frame.
    ///
    /// # Panics
    ///
    /// Panics if `seconds` is negative or not finite.
    pub fn with_completion_delay(mut self, seconds: f64) -> Self {
        assert!(
            seconds.is_finite() && seconds >= 0.0,
            "Completion delay must be non-negative, got {}",
            seconds
        );
        self.completion_delay = seconds;
        self
    }

    pub fn with_busy_policy(mut self, policy: BusyPolicy) -> Self {
        self.busy_policy = policy;
        self
    }

    pub fn with_invalid_scene_policy(mut self, policy: InvalidScenePolicy) -> Self {
        self.invalid_scene_policy = policy;
        self
    }

    /// Enables stall detection: a session whose progress does not move
    /// for `seconds` while loading is handled per the stall policy.
    ///
    /// # Panics
    ///
    /// Panics if `seconds <= 0.0` or not finite.
    pub fn with_stall_timeout(mut self, seconds: f64) -> Self {
        assert!(
            seconds.is_finite() && seconds > 0.0,
            "Stall timeout must be positive, got {}",
            seconds
        );
        self.stall_timeout = Some(seconds);
        self
    }

    pub fn with_stall_policy(mut self, policy: StallPolicy) -> Self {
        self.stall_policy = policy;
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn overlay(&self) -> Option<&Arc<dyn OverlayTemplate>> {
        self.overlay.as_ref()
    }

    pub fn min_visible_duration(&self) -> f64 {
        self.min_visible_duration
    }

    pub fn activation_threshold(&self) -> f32 {
        self.activation_threshold
    }

    pub fn completion_delay(&self) -> f64 {
        self.completion_delay
    }

    pub fn busy_policy(&self) -> BusyPolicy {
        self.busy_policy
    }

    pub fn invalid_scene_policy(&self) -> InvalidScenePolicy {
        self.invalid_scene_policy
    }

    pub fn stall_timeout(&self) -> Option<f64> {
        self.stall_timeout
    }

    pub fn stall_policy(&self) -> StallPolicy {
        self.stall_policy
    }
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoaderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderSettings")
            .field("overlay", &self.overlay.is_some())
            .field("min_visible_duration", &self.min_visible_duration)
            .field("activation_threshold", &self.activation_threshold)
            .field("completion_delay", &self.completion_delay)
            .field("busy_policy", &self.busy_policy)
            .field("invalid_scene_policy", &self.invalid_scene_policy)
            .field("stall_timeout", &self.stall_timeout)
            .field("stall_policy", &self.stall_policy)
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = LoaderSettings::new();
        assert!(settings.overlay().is_none());
        assert_eq!(settings.min_visible_duration(), 2.0);
        assert_eq!(settings.activation_threshold(), 0.9);
        assert_eq!(settings.completion_delay(), 0.2);
        assert_eq!(settings.busy_policy(), BusyPolicy::Reject);
        assert_eq!(settings.invalid_scene_policy(), InvalidScenePolicy::AbortSession);
        assert_eq!(settings.stall_timeout(), None);
        assert_eq!(settings.stall_policy(), StallPolicy::Abort);
    }

    #[test]
    fn builder_chaining() {
        let settings = LoaderSettings::new()
            .with_min_visible_duration(0.5)
            .with_activation_threshold(1.0)
            .with_completion_delay(0.0)
            .with_busy_policy(BusyPolicy::Enqueue)
            .with_invalid_scene_policy(InvalidScenePolicy::SkipUnit)
            .with_stall_timeout(3.0)
            .with_stall_policy(StallPolicy::ForceActivation);

        assert_eq!(settings.min_visible_duration(), 0.5);
        assert_eq!(settings.activation_threshold(), 1.0);
        assert_eq!(settings.completion_delay(), 0.0);
        assert_eq!(settings.busy_policy(), BusyPolicy::Enqueue);
        assert_eq!(settings.invalid_scene_policy(), InvalidScenePolicy::SkipUnit);
        assert_eq!(settings.stall_timeout(), Some(3.0));
        assert_eq!(settings.stall_policy(), StallPolicy::ForceActivation);
    }

    #[test]
    #[should_panic(expected = "Minimum visible duration must be non-negative")]
    fn negative_min_duration_panics() {
        LoaderSettings::new().with_min_visible_duration(-1.0);
    }

    #[test]
    #[should_panic(expected = "Activation threshold must be in (0, 1]")]
    fn zero_threshold_panics() {
        LoaderSettings::new().with_activation_threshold(0.0);
    }

    #[test]
    #[should_panic(expected = "Stall timeout must be positive")]
    fn zero_stall_timeout_panics() {
        LoaderSettings::new().with_stall_timeout(0.0);
    }

    #[test]
    fn debug_reports_overlay_presence_only() {
        let text = format!("{:?}", LoaderSettings::new());
        assert!(text.contains("overlay: false"));
    }
}
