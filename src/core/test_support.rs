//=========================================================================
// Test Support
//=========================================================================
//
// Scripted stand-ins for the host engine, shared by unit tests.
//
// Both fakes are cheap to clone: one clone is moved into the
// orchestrator, the other stays with the test to drive and inspect it.
//
//=========================================================================

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::presenter::Presenter;
use crate::core::scene::{LoadHandle, LoadMode, SceneBackend, SceneId};
use crate::core::signal::Signal;
use crate::error::LoaderError;

//=== FakeBackend =========================================================

#[derive(Default)]
struct HandleState {
    progress: f32,
    allow_activation: bool,
    done: bool,
    cancelled: bool,
    on_completed: Option<Signal>,
}

#[derive(Default)]
struct BackendState {
    handles: HashMap<SceneId, HandleState>,
    issued: Vec<(SceneId, LoadMode)>,
    allow_history: Vec<(SceneId, bool)>,
}

/// Backend whose loads only move when the test says so.
#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    known: Arc<HashSet<SceneId>>,
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub(crate) fn with_scenes<I>(scenes: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self {
            known: Arc::new(scenes.into_iter().map(SceneId::from).collect()),
            state: Arc::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn set_progress(&self, scene: &str, progress: f32) {
        if let Some(handle) = self.lock().handles.get_mut(&SceneId::from(scene)) {
            handle.progress = progress;
        }
    }

    /// Finishes the load and fires its completion signal if armed.
    pub(crate) fn complete(&self, scene: &str) {
        let signal = {
            let mut state = self.lock();
            let Some(handle) = state.handles.get_mut(&SceneId::from(scene)) else {
                return;
            };
            handle.progress = 1.0;
            handle.done = true;
            handle.on_completed.take()
        };
        if let Some(signal) = signal {
            signal.fire();
        }
    }

    /// Finishes the load without firing the completion signal.
    pub(crate) fn complete_silently(&self, scene: &str) {
        if let Some(handle) = self.lock().handles.get_mut(&SceneId::from(scene)) {
            handle.progress = 1.0;
            handle.done = true;
        }
    }

    pub(crate) fn allow_activation(&self, scene: &str) -> Option<bool> {
        self.lock()
            .handles
            .get(&SceneId::from(scene))
            .map(|handle| handle.allow_activation)
    }

    pub(crate) fn was_cancelled(&self, scene: &str) -> bool {
        self.lock()
            .handles
            .get(&SceneId::from(scene))
            .is_some_and(|handle| handle.cancelled)
    }

    pub(crate) fn issued(&self) -> Vec<(SceneId, LoadMode)> {
        self.lock().issued.clone()
    }

    /// Every `set_allow_activation` call, in order.
    pub(crate) fn allow_history(&self) -> Vec<(SceneId, bool)> {
        self.lock().allow_history.clone()
    }
}

impl SceneBackend for FakeBackend {
    fn begin_load(
        &mut self,
        scene: &SceneId,
        mode: LoadMode,
    ) -> Result<Box<dyn LoadHandle>, LoaderError> {
        if !self.known.contains(scene) {
            return Err(LoaderError::InvalidScene {
                scene: scene.clone(),
            });
        }

        let mut state = self.lock();
        state.issued.push((scene.clone(), mode));
        state.handles.insert(scene.clone(), HandleState::default());

        Ok(Box::new(FakeHandle {
            scene: scene.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeHandle {
    scene: SceneId,
    state: Arc<Mutex<BackendState>>,
}

impl FakeHandle {
    fn with<R>(&self, f: impl FnOnce(&mut HandleState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        let handle = state.handles.entry(self.scene.clone()).or_default();
        f(handle)
    }
}

impl LoadHandle for FakeHandle {
    fn progress(&self) -> f32 {
        self.with(|handle| handle.progress)
    }

    fn set_allow_activation(&mut self, allow: bool) {
        self.with(|handle| handle.allow_activation = allow);
        self.state
            .lock()
            .unwrap()
            .allow_history
            .push((self.scene.clone(), allow));
    }

    fn is_done(&self) -> bool {
        self.with(|handle| handle.done)
    }

    fn on_completed(&mut self, signal: Signal) {
        let pending = self.with(|handle| {
            if handle.done {
                Some(signal)
            } else {
                handle.on_completed = Some(signal);
                None
            }
        });
        if let Some(signal) = pending {
            signal.fire();
        }
    }

    fn cancel(&mut self) -> bool {
        self.with(|handle| handle.cancelled = true);
        true
    }
}

//=== FakePresenter =======================================================

#[derive(Default)]
pub(crate) struct PresenterLog {
    pub(crate) fade_ins: usize,
    pub(crate) fade_outs: usize,
    pub(crate) progress: f32,
    pub(crate) scene_name: String,
    pub(crate) pending_fade: Option<Signal>,
}

/// Overlay that records calls; fades complete on demand or instantly.
#[derive(Clone, Default)]
pub(crate) struct FakePresenter {
    auto_fade: bool,
    log: Arc<Mutex<PresenterLog>>,
}

impl FakePresenter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Presenter whose fade-in completes as soon as it starts.
    pub(crate) fn instant() -> Self {
        Self {
            auto_fade: true,
            ..Self::default()
        }
    }

    pub(crate) fn log(&self) -> MutexGuard<'_, PresenterLog> {
        self.log.lock().unwrap()
    }

    pub(crate) fn finish_fade_in(&self) {
        let signal = self.log().pending_fade.take();
        if let Some(signal) = signal {
            signal.fire();
        }
    }

    pub(crate) fn template(&self) -> impl Fn() -> Box<dyn Presenter> + Send + Sync + 'static {
        let presenter = self.clone();
        move || Box::new(presenter.clone()) as Box<dyn Presenter>
    }
}

impl Presenter for FakePresenter {
    fn fade_in(&mut self, on_complete: Signal) {
        let mut log = self.log();
        log.fade_ins += 1;
        if self.auto_fade {
            drop(log);
            on_complete.fire();
        } else {
            log.pending_fade = Some(on_complete);
        }
    }

    fn fade_out(&mut self) {
        self.log().fade_outs += 1;
    }

    fn set_progress(&mut self, progress: f32) {
        self.log().progress = progress;
    }

    fn set_scene_name(&mut self, name: &str) {
        self.log().scene_name = name.to_string();
    }
}

//=== Outcome Capture =====================================================

/// Collects completion outcomes for later inspection.
#[derive(Clone, Default)]
pub(crate) struct Outcomes {
    inner: Arc<Mutex<Vec<crate::core::scene::LoadOutcome>>>,
}

impl Outcomes {
    pub(crate) fn callback(&self) -> impl FnOnce(crate::core::scene::LoadOutcome) + Send + 'static {
        let inner = Arc::clone(&self.inner);
        move |outcome| inner.lock().unwrap().push(outcome)
    }

    pub(crate) fn take(&self) -> Vec<crate::core::scene::LoadOutcome> {
        std::mem::take(&mut *self.inner.lock().unwrap())
    }
}
