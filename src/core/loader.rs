//=========================================================================
// Scene Loader Facade
//=========================================================================
//
// Public entry points for loading scenes behind the loading screen.
//
// Validates requests before handing them to the orchestrator. A refused
// request is logged, leaves the orchestrator untouched, is returned as an
// `Err` and is also delivered to its completion callback.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Receiver;
use log::error;

//=== Internal Dependencies ===============================================

use crate::core::events::{EventBus, LoaderEvent};
use crate::core::orchestrator::{LoadOrchestrator, LoaderState};
use crate::core::scene::{LoadRequest, LoadUnit, SceneBackend, SceneId};
use crate::core::settings::LoaderSettings;
use crate::error::LoaderError;

//=== SceneLoader =========================================================

/// Loads scenes behind a loading-screen overlay.
///
/// Wraps the application's single [`LoadOrchestrator`]. Call
/// [`tick`](Self::tick) once per frame with a monotonic time in seconds.
///
/// # Example
///
/// ```rust
/// # use aetheric_scene_loader::prelude::*;
/// # struct Engine;
/// # impl SceneBackend for Engine {
/// #     fn begin_load(&mut self, scene: &SceneId, _mode: LoadMode)
/// #         -> Result<Box<dyn LoadHandle>, LoaderError> {
/// #         Err(LoaderError::InvalidScene { scene: scene.clone() })
/// #     }
/// # }
/// // No overlay configured: the request is refused without side effects.
/// let mut loader = SceneLoader::new(LoaderSettings::new(), Engine);
///
/// assert_eq!(loader.load_scene("Town", false), Err(LoaderError::Configuration));
/// assert_eq!(loader.state(), LoaderState::Idle);
/// ```
pub struct SceneLoader {
    orchestrator: LoadOrchestrator,
}

impl SceneLoader {
    //--- Construction -----------------------------------------------------

    /// Builds the orchestrator from `settings` and wraps it.
    pub fn new<B>(settings: LoaderSettings, backend: B) -> Self
    where
        B: SceneBackend + 'static,
    {
        Self::with_orchestrator(LoadOrchestrator::new(settings, backend))
    }

    /// Wraps an existing orchestrator.
    pub fn with_orchestrator(orchestrator: LoadOrchestrator) -> Self {
        Self { orchestrator }
    }

    //--- Loading ----------------------------------------------------------

    /// Loads one scene. `additive` keeps the current content.
    pub fn load_scene(
        &mut self,
        scene: impl Into<SceneId>,
        additive: bool,
    ) -> Result<(), LoaderError> {
        self.load(LoadRequest::new([scene.into()], additive))
    }

    /// Loads several scenes in one session.
    ///
    /// `additive` applies to the first scene; the rest are always additive.
    pub fn load_scenes<I, T>(&mut self, scenes: I, additive: bool) -> Result<(), LoaderError>
    where
        I: IntoIterator<Item = T>,
        T: Into<SceneId>,
    {
        self.load(LoadRequest::new(scenes, additive))
    }

    /// Submits a fully described request, including its completion callback.
    ///
    /// # Errors
    ///
    /// - [`LoaderError::EmptyRequest`] if the request names no scenes
    /// - [`LoaderError::Configuration`] if no overlay is configured
    /// - [`LoaderError::SessionActive`] if busy and the policy rejects
    pub fn load(&mut self, mut request: LoadRequest) -> Result<(), LoaderError> {
        let refusal = if request.is_empty() {
            Some(LoaderError::EmptyRequest)
        } else if !self.orchestrator.has_overlay() {
            Some(LoaderError::Configuration)
        } else {
            None
        };

        if let Some(err) = refusal {
            error!("Refusing load of {:?}: {}", request.scenes(), err);
            request.resolve(Err(err.clone()));
            return Err(err);
        }

        self.orchestrator.submit(request)
    }

    /// Cancels the active session. See [`LoadOrchestrator::cancel`].
    pub fn cancel(&mut self) -> bool {
        self.orchestrator.cancel()
    }

    /// Cancels the active session and all queued requests.
    pub fn cancel_all(&mut self) {
        self.orchestrator.cancel_all();
    }

    //--- Update Loop ------------------------------------------------------

    /// Advances loading to time `now` (seconds, monotonic).
    pub fn tick(&mut self, now: f64) {
        self.orchestrator.tick(now);
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> LoaderState {
        self.orchestrator.state()
    }

    pub fn progress(&self) -> f32 {
        self.orchestrator.progress()
    }

    pub fn is_busy(&self) -> bool {
        self.orchestrator.is_busy()
    }

    pub fn pending_requests(&self) -> usize {
        self.orchestrator.pending_requests()
    }

    pub fn units(&self) -> &[LoadUnit] {
        self.orchestrator.units()
    }

    /// Events of the last tick, plus any published since it ended.
    pub fn events(&self) -> &EventBus {
        self.orchestrator.events()
    }

    pub fn subscribe(&mut self) -> Receiver<LoaderEvent> {
        self.orchestrator.subscribe()
    }

    pub fn orchestrator(&self) -> &LoadOrchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut LoadOrchestrator {
        &mut self.orchestrator
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{FakeBackend, FakePresenter, Outcomes};

    fn configured(backend: &FakeBackend, presenter: &FakePresenter) -> SceneLoader {
        let settings = LoaderSettings::new().with_overlay(presenter.template());
        SceneLoader::new(settings, backend.clone())
    }

    //--- Preconditions ----------------------------------------------------

    #[test]
    fn missing_overlay_is_a_no_op() {
        let backend = FakeBackend::with_scenes(["A"]);
        let outcomes = Outcomes::default();
        let mut loader = SceneLoader::new(LoaderSettings::new(), backend.clone());
        let events = loader.subscribe();

        let result = loader.load(LoadRequest::new(["A"], false).on_complete(outcomes.callback()));
        loader.tick(0.0);
        loader.tick(1.0);

        assert_eq!(result, Err(LoaderError::Configuration));
        assert_eq!(outcomes.take(), vec![Err(LoaderError::Configuration)]);
        assert!(backend.issued().is_empty());
        assert_eq!(loader.state(), LoaderState::Idle);
        assert!(events.try_iter().next().is_none());
    }

    #[test]
    fn empty_request_is_refused() {
        let backend = FakeBackend::with_scenes(["A"]);
        let presenter = FakePresenter::new();
        let mut loader = configured(&backend, &presenter);

        let result = loader.load_scenes(Vec::<SceneId>::new(), false);

        assert_eq!(result, Err(LoaderError::EmptyRequest));
        assert_eq!(presenter.log().fade_ins, 0);
        assert_eq!(loader.state(), LoaderState::Idle);
    }

    //--- Delegation -------------------------------------------------------

    #[test]
    fn load_scene_starts_fade_in() {
        let backend = FakeBackend::with_scenes(["A"]);
        let presenter = FakePresenter::new();
        let mut loader = configured(&backend, &presenter);

        assert_eq!(loader.load_scene("A", false), Ok(()));
        assert_eq!(loader.state(), LoaderState::FadingIn);
        assert!(loader.is_busy());
        assert_eq!(presenter.log().fade_ins, 1);

        // Loads wait for the fade
        loader.tick(0.1);
        assert!(backend.issued().is_empty());
    }

    #[test]
    fn load_started_precedes_fade_in_transition() {
        let backend = FakeBackend::with_scenes(["A", "B"]);
        let presenter = FakePresenter::new();
        let mut loader = configured(&backend, &presenter);

        loader.load_scenes(["A", "B"], true).unwrap();

        let events = loader.events().read();
        assert_eq!(
            events[0],
            LoaderEvent::LoadStarted {
                scenes: vec![SceneId::from("A"), SceneId::from("B")],
            }
        );
        assert_eq!(
            events[1],
            LoaderEvent::StateChanged {
                from: LoaderState::Idle,
                to: LoaderState::FadingIn,
            }
        );
    }

    #[test]
    fn events_of_an_accepted_request_survive_the_next_tick() {
        let backend = FakeBackend::with_scenes(["A"]);
        let presenter = FakePresenter::new();
        let mut loader = configured(&backend, &presenter);

        loader.load_scene("A", false).unwrap();
        loader.tick(0.0);

        assert_eq!(
            loader.events().read(),
            &[
                LoaderEvent::LoadStarted {
                    scenes: vec![SceneId::from("A")],
                },
                LoaderEvent::StateChanged {
                    from: LoaderState::Idle,
                    to: LoaderState::FadingIn,
                },
            ]
        );

        // Gone once the following tick starts
        loader.tick(0.1);
        assert!(loader.events().read().is_empty());
    }

    #[test]
    fn cancel_without_session_reports_false() {
        let backend = FakeBackend::with_scenes(["A"]);
        let presenter = FakePresenter::new();
        let mut loader = configured(&backend, &presenter);

        assert!(!loader.cancel());
    }
}
