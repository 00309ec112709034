//=========================================================================
// Load Orchestrator
//=========================================================================
//
// Tick-driven state machine for one loading session at a time.
//
// Architecture:
//   Idle ──submit()──> FadingIn ──fade-in signal──> Loading
//                                                      │ gate open
//                                                      ↓
//   Idle <──finish── FadingOut <──last unit + delay── Activating
//
//   Any active state ──cancel() / abort──> Idle
//
// Per tick (fixed order):
//   1. Clear last tick's events
//   2. Drain queued signals (fade-in complete, unit complete)
//   3. Loading:    poll units → aggregate → presenter → stall → gate
//   4. Activating: observe last unit completion, wait completion delay
//   5. FadingOut:  progress 1.0 → callback → event → fade out → Idle
//   6. Idle:       start the next queued request, if any
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;

use crossbeam_channel::Receiver;
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::events::{EventBus, LoaderEvent};
use crate::core::presenter::Presenter;
use crate::core::scene::{LoadRequest, LoadUnit, SceneBackend, SceneId};
use crate::core::settings::{BusyPolicy, InvalidScenePolicy, LoaderSettings, StallPolicy};
use crate::core::signal::{LoaderSignal, SignalQueue};
use crate::error::LoaderError;

//=== Module Declarations =================================================

mod progress;
mod session;

use progress::{aggregate_progress, gate_open, loading_scene};
use session::Session;

//=== LoaderState =========================================================

/// Phase of the orchestrator's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoaderState {
    /// No session active.
    #[default]
    Idle,

    /// Overlay fading in; loads not yet issued.
    FadingIn,

    /// Loads issued; waiting for the activation gate.
    Loading,

    /// Last unit released; waiting for it to complete.
    Activating,

    /// Session finishing; overlay fading out.
    FadingOut,
}

//=== LoadingStep =========================================================
//
// Decision reached by a Loading tick, applied once the session borrow ends.
//
enum LoadingStep {
    Wait,
    OpenGate,
    Stalled { scene: SceneId, waited: f64 },
}

//=== LoadOrchestrator ====================================================

/// Owns the active loading session and drives it one tick at a time.
///
/// Construct one per application and hand it to [`crate::SceneLoader`].
/// Nothing here blocks: external completions arrive as signals and are
/// applied at the start of the next [`tick`](Self::tick).
pub struct LoadOrchestrator {
    settings: LoaderSettings,
    backend: Box<dyn SceneBackend>,
    presenter: Option<Box<dyn Presenter>>,
    signals: SignalQueue,
    events: EventBus,
    state: LoaderState,
    session: Option<Session>,
    pending: VecDeque<LoadRequest>,
    next_session_id: u64,
    progress: f32,
    now: f64,
}

impl LoadOrchestrator {
    //--- Construction -----------------------------------------------------

    /// Creates an idle orchestrator.
    ///
    /// The overlay template in `settings` is instantiated here, once.
    pub fn new<B>(settings: LoaderSettings, backend: B) -> Self
    where
        B: SceneBackend + 'static,
    {
        let presenter = settings.overlay().map(|template| template.instantiate());
        if presenter.is_none() {
            warn!("No loading screen overlay configured; load requests will be refused");
        }

        debug!("Creating load orchestrator with {:?}", settings);

        Self {
            settings,
            backend: Box::new(backend),
            presenter,
            signals: SignalQueue::new(),
            events: EventBus::new(),
            state: LoaderState::Idle,
            session: None,
            pending: VecDeque::new(),
            next_session_id: 1,
            progress: 0.0,
            now: 0.0,
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// True while a session is active.
    pub fn is_busy(&self) -> bool {
        self.session.is_some()
    }

    pub fn has_overlay(&self) -> bool {
        self.presenter.is_some()
    }

    /// Aggregate progress last written to the overlay.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Requests waiting behind the active session.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Units of the active session, in request order.
    pub fn units(&self) -> &[LoadUnit] {
        self.session
            .as_ref()
            .map(|session| session.units.as_slice())
            .unwrap_or(&[])
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    //--- Events -----------------------------------------------------------

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Receiver for every event published from now on.
    pub fn subscribe(&mut self) -> Receiver<LoaderEvent> {
        self.events.subscribe()
    }

    //--- Requests ---------------------------------------------------------

    /// Starts `request`, or queues or refuses it if a session is active.
    pub(crate) fn submit(&mut self, mut request: LoadRequest) -> Result<(), LoaderError> {
        if self.is_busy() || !self.pending.is_empty() {
            match self.settings.busy_policy() {
                BusyPolicy::Reject => {
                    warn!(
                        "Refusing load of {:?}: session already active ({:?})",
                        request.scenes(),
                        self.state
                    );
                    request.resolve(Err(LoaderError::SessionActive));
                    return Err(LoaderError::SessionActive);
                }
                BusyPolicy::Enqueue => {
                    info!(
                        "Queueing load of {:?} behind active session ({} waiting)",
                        request.scenes(),
                        self.pending.len()
                    );
                    self.pending.push_back(request);
                    return Ok(());
                }
            }
        }

        self.start_session(request);
        Ok(())
    }

    /// Cancels the active session. Queued requests are kept.
    ///
    /// Outstanding loads are cancelled where the backend supports it, the
    /// overlay fades out and the callback receives
    /// [`LoaderError::Cancelled`]. Returns `false` if nothing was active.
    pub fn cancel(&mut self) -> bool {
        if self.session.is_none() {
            debug!("Cancel requested with no active session");
            return false;
        }

        self.abort_session(LoaderError::Cancelled);
        true
    }

    /// Cancels the active session and every queued request.
    pub fn cancel_all(&mut self) {
        for mut request in self.pending.drain(..) {
            debug!("Dropping queued load of {:?}", request.scenes());
            request.resolve(Err(LoaderError::Cancelled));
        }
        self.cancel();
    }

    //--- Update Loop ------------------------------------------------------

    /// Advances the state machine to time `now` (seconds, monotonic).
    ///
    /// Afterwards [`events`](Self::events) holds everything published
    /// since the previous tick ended, including requests accepted between
    /// ticks.
    pub fn tick(&mut self, now: f64) {
        self.events.begin_frame();
        self.now = now;

        for signal in self.signals.drain() {
            self.apply_signal(signal, now);
        }

        if self.state == LoaderState::Loading {
            self.tick_loading(now);
        }

        if self.state == LoaderState::Activating {
            self.tick_activating(now);
        }

        if self.state == LoaderState::FadingOut {
            self.finish_session(now);
        }

        if self.session.is_none() {
            if let Some(next) = self.pending.pop_front() {
                self.start_session(next);
            }
        }

        self.events.end_frame();
    }

    //--- Session Start ----------------------------------------------------

    fn start_session(&mut self, mut request: LoadRequest) {
        let Some(presenter) = self.presenter.as_mut() else {
            error!("Cannot load {:?}: no loading screen overlay", request.scenes());
            request.resolve(Err(LoaderError::Configuration));
            return;
        };

        let id = self.next_session_id;
        self.next_session_id += 1;

        info!("Starting load session {} for {:?}", id, request.scenes());
        self.events.publish(LoaderEvent::LoadStarted {
            scenes: request.scenes().to_vec(),
        });

        presenter.set_progress(0.0);
        presenter.set_scene_name("");
        presenter.fade_in(self.signals.arm(LoaderSignal::FadeInComplete { session: id }));

        self.progress = 0.0;
        self.session = Some(Session::new(
            id,
            request,
            self.settings.min_visible_duration(),
        ));
        self.transition(LoaderState::FadingIn);
    }

    //--- Signals ----------------------------------------------------------

    fn apply_signal(&mut self, signal: LoaderSignal, now: f64) {
        let Some(active) = self.session.as_ref().map(|session| session.id) else {
            debug!("Ignoring {:?}: no active session", signal);
            return;
        };

        if signal.session() != active {
            debug!("Ignoring stale {:?} (active session {})", signal, active);
            return;
        }

        match signal {
            LoaderSignal::FadeInComplete { .. } if self.state == LoaderState::FadingIn => {
                self.issue_loads(now);
            }
            LoaderSignal::UnitCompleted { index, .. } if self.state == LoaderState::Activating => {
                self.mark_completed(index, now);
            }
            other => warn!("Unexpected {:?} in state {:?}", other, self.state),
        }
    }

    //--- FadingIn → Loading -----------------------------------------------

    fn issue_loads(&mut self, now: f64) {
        match self.issue_units(now) {
            Ok(()) => self.transition(LoaderState::Loading),
            Err(err) => self.abort_session(err),
        }
    }

    /// Issues one load per scene in request order.
    ///
    /// Every unit starts held back; all but the last are then permitted to
    /// activate, so only the last waits on the gate.
    fn issue_units(&mut self, now: f64) -> Result<(), LoaderError> {
        let policy = self.settings.invalid_scene_policy();
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        let scenes = session.request.scenes().to_vec();
        for (index, scene) in scenes.into_iter().enumerate() {
            let mode = session.request.mode_for(index);

            match self.backend.begin_load(&scene, mode) {
                Ok(handle) => {
                    debug!("Issued load of scene '{}' ({:?})", scene, mode);
                    session.units.push(LoadUnit::new(scene, mode, handle));
                }
                Err(err) => match policy {
                    InvalidScenePolicy::AbortSession => return Err(err),
                    InvalidScenePolicy::SkipUnit => {
                        warn!("Skipping scene '{}': {}", scene, err);
                        session.skipped.push(scene);
                    }
                },
            }
        }

        let Some(last) = session.units.len().checked_sub(1) else {
            return Err(match session.skipped.last() {
                Some(scene) => LoaderError::InvalidScene {
                    scene: scene.clone(),
                },
                None => LoaderError::EmptyRequest,
            });
        };

        for unit in &mut session.units[..last] {
            unit.permit();
        }

        session.begin(now);
        Ok(())
    }

    //--- Loading ----------------------------------------------------------

    fn tick_loading(&mut self, now: f64) {
        let threshold = self.settings.activation_threshold();
        let stall_timeout = self.settings.stall_timeout();
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let mut advanced = false;
        for unit in &mut session.units {
            advanced |= unit.poll();
        }
        if advanced {
            session.last_progress_at = now;
        }

        let aggregate = aggregate_progress(&session.units);
        let scene_name = loading_scene(&session.units).map_or("", SceneId::as_str);
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.set_progress(aggregate);
            presenter.set_scene_name(scene_name);
        }
        self.progress = aggregate;

        let last_progress = session.last_unit().map_or(0.0, LoadUnit::progress);
        let waited = now - session.last_progress_at;

        let step = if session.forced
            || gate_open(
                session.elapsed(now),
                session.min_visible_duration,
                last_progress,
                threshold,
            )
        {
            LoadingStep::OpenGate
        } else {
            match stall_timeout {
                Some(timeout) if last_progress < threshold && waited >= timeout => {
                    let scene = session
                        .units
                        .iter()
                        .find(|unit| unit.progress() < threshold)
                        .map(|unit| unit.scene().clone());

                    match scene {
                        Some(scene) => LoadingStep::Stalled { scene, waited },
                        None => LoadingStep::Wait,
                    }
                }
                _ => LoadingStep::Wait,
            }
        };

        match step {
            LoadingStep::Wait => {}
            LoadingStep::OpenGate => self.enter_activating(),
            LoadingStep::Stalled { scene, waited } => self.handle_stall(scene, waited),
        }
    }

    fn handle_stall(&mut self, scene: SceneId, waited: f64) {
        warn!("Scene '{}' made no progress for {:.2}s", scene, waited);
        self.events.publish(LoaderEvent::StallDetected {
            scene: scene.clone(),
        });

        match self.settings.stall_policy() {
            StallPolicy::Abort => self.abort_session(LoaderError::StalledLoad { scene, waited }),
            StallPolicy::ForceActivation => {
                if let Some(session) = self.session.as_mut() {
                    session.forced = true;
                }
                self.enter_activating();
            }
        }
    }

    //--- Loading → Activating ---------------------------------------------

    fn enter_activating(&mut self) {
        let now = self.now;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(index) = session.units.len().checked_sub(1) else {
            return;
        };

        let signal = self.signals.arm(LoaderSignal::UnitCompleted {
            session: session.id,
            index,
        });
        session.units[index].release(signal);

        info!(
            "Activation gate open for session {} after {:.2}s",
            session.id,
            session.elapsed(now)
        );
        self.transition(LoaderState::Activating);
    }

    //--- Activating → FadingOut -------------------------------------------

    fn mark_completed(&mut self, index: usize, now: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if index + 1 != session.units.len() {
            debug!("Ignoring completion of non-final unit {}", index);
            return;
        }

        if session.completed_at.is_none() {
            debug!("Last unit of session {} completed at {:.3}", session.id, now);
            session.completed_at = Some(now);
        }
    }

    fn tick_activating(&mut self, now: f64) {
        let delay = self.settings.completion_delay();
        let Some(session) = self.session.as_mut() else {
            return;
        };

        // Poll as well as listen: a handle may finish without firing.
        if session.completed_at.is_none() && session.last_unit().is_some_and(LoadUnit::is_done) {
            session.completed_at = Some(now);
        }

        // Hold the overlay briefly so the scene swap cannot outrace it.
        // Measured from the tick that observes completion, so the hold
        // may exceed the delay by up to one frame.
        if session.completed_at.is_some_and(|done| now - done >= delay) {
            self.transition(LoaderState::FadingOut);
        }
    }

    //--- FadingOut → Idle -------------------------------------------------

    fn finish_session(&mut self, now: f64) {
        let Some(session) = self.session.take() else {
            return;
        };

        let scenes = session.scenes();
        let report = session.report(now);
        info!(
            "Load session {} complete: {:?} in {:.2}s",
            session.id, scenes, report.elapsed
        );

        if let Some(presenter) = self.presenter.as_mut() {
            presenter.set_progress(1.0);
        }
        self.progress = 1.0;

        session.resolve(Ok(report));
        self.events.publish(LoaderEvent::LoadCompleted { scenes });

        if let Some(presenter) = self.presenter.as_mut() {
            presenter.fade_out();
        }

        self.transition(LoaderState::Idle);
    }

    //--- Abort ------------------------------------------------------------

    fn abort_session(&mut self, error: LoaderError) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        match error {
            LoaderError::Cancelled => info!("Load session {} cancelled", session.id),
            _ => error!("Load session {} failed: {}", session.id, error),
        }

        session.cancel_units();
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.fade_out();
        }
        self.progress = 0.0;

        session.resolve(Err(error.clone()));
        self.events.publish(LoaderEvent::LoadFailed { error });

        self.transition(LoaderState::Idle);
    }

    //--- Internal Helpers -------------------------------------------------

    fn transition(&mut self, to: LoaderState) {
        let from = self.state;
        if from == to {
            return;
        }

        debug!("Loader state {:?} -> {:?}", from, to);
        self.state = to;
        self.events.publish(LoaderEvent::StateChanged { from, to });
    }
}

impl Drop for LoadOrchestrator {
    fn drop(&mut self) {
        if self.is_busy() || !self.pending.is_empty() {
            warn!("Load orchestrator dropped with work in flight; cancelling");
            self.cancel_all();
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
