//=========================================================================
// Loader Runtime
//
// Runs a scene loader on its own thread for multi-threaded hosts.
//
// Architecture:
// ```text
//     LoaderRuntimeBuilder ──spawn()──> LoaderRuntime ──handle()──> LoaderHandle
//         │                               │                           │
//         ├─ with_tps()                   ├─ owns loader thread       ├─ load / cancel
//         └─ with_channel_capacity()      └─ shutdown() joins it      └─ subscribe
// ```
//
// Handles are cheap to clone and may be used from any thread. Requests
// travel as commands over a bounded MPSC channel and take effect at the
// next tick boundary of the loader thread.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::thread::{self, JoinHandle, ThreadId};

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, unbounded, Receiver, SendError, Sender, TrySendError};
use log::{error, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::command::LoaderCommand;
use crate::core::events::LoaderEvent;
use crate::core::scene::{LoadRequest, SceneId};
use crate::core::{CoreLoop, SceneLoader};
use crate::error::LoaderError;

//=== LoaderRuntimeBuilder ================================================

/// Builder for a [`LoaderRuntime`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (ticks per second)
/// - **Channel capacity**: 128 commands
///
/// # Examples
///
/// ```no_run
/// # use aetheric_scene_loader::prelude::*;
/// # struct Engine;
/// # impl SceneBackend for Engine {
/// #     fn begin_load(&mut self, scene: &SceneId, _mode: LoadMode)
/// #         -> Result<Box<dyn LoadHandle>, LoaderError> {
/// #         Err(LoaderError::InvalidScene { scene: scene.clone() })
/// #     }
/// # }
/// let loader = SceneLoader::new(LoaderSettings::new(), Engine);
/// let runtime = LoaderRuntimeBuilder::new()
///     .with_tps(120.0)
///     .spawn(loader);
///
/// let handle = runtime.handle();
/// handle.load_scene("Town", false).unwrap();
///
/// runtime.shutdown();
/// ```
pub struct LoaderRuntimeBuilder {
    tps: f64,
    channel_capacity: usize,
}

impl LoaderRuntimeBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
        }
    }

    /// Sets the target ticks per second of the loader thread.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the command channel capacity.
    ///
    /// Senders block while the channel is full.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Moves `loader` onto a new thread and starts ticking it.
    pub fn spawn(self, loader: SceneLoader) -> LoaderRuntime {
        info!(
            "Spawning loader runtime (TPS: {}, channel: {})",
            self.tps, self.channel_capacity
        );

        let (sender, receiver) = bounded(self.channel_capacity);
        let thread = CoreLoop::new(loader).spawn_core_thread(receiver, self.tps);
        let loader_thread = thread.thread().id();

        LoaderRuntime {
            handle: LoaderHandle {
                sender,
                loader_thread,
            },
            thread: Some(thread),
            tps: self.tps,
        }
    }
}

impl Default for LoaderRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== LoaderRuntime =======================================================

/// Owner of the loader thread.
///
/// Dropping the runtime shuts the thread down the same way
/// [`shutdown`](Self::shutdown) does: the active session and every queued
/// request are cancelled before the thread exits.
pub struct LoaderRuntime {
    handle: LoaderHandle,
    thread: Option<JoinHandle<()>>,
    tps: f64,
}

impl LoaderRuntime {
    /// Returns a new handle to the loader thread.
    pub fn handle(&self) -> LoaderHandle {
        self.handle.clone()
    }

    pub fn tps(&self) -> f64 {
        self.tps
    }

    /// Stops the loader thread and waits for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };

        // Already gone if the thread panicked
        let _ = self.handle.sender.send(LoaderCommand::Shutdown);

        match thread.join() {
            Ok(()) => info!("Loader thread terminated cleanly"),
            Err(e) => error!("Loader thread panicked: {:?}", e),
        }
    }
}

impl Drop for LoaderRuntime {
    fn drop(&mut self) {
        self.stop();
    }
}

//=== LoaderHandle ========================================================

/// Thread-safe handle for submitting work to a [`LoaderRuntime`].
///
/// Acceptance is asynchronous: `Ok` means the command was queued. Refusals
/// made on the loader thread (busy, missing overlay, empty request) reach
/// the request's completion callback instead.
///
/// Completion callbacks run on the loader thread. Called from there, a
/// handle never blocks: a full channel yields
/// [`LoaderError::CommandQueueFull`]. Other threads block until there is
/// room.
#[derive(Clone)]
pub struct LoaderHandle {
    sender: Sender<LoaderCommand>,
    loader_thread: ThreadId,
}

impl LoaderHandle {
    /// Loads one scene. `additive` keeps the current content.
    pub fn load_scene(&self, scene: impl Into<SceneId>, additive: bool) -> Result<(), LoaderError> {
        self.load(LoadRequest::new([scene.into()], additive))
    }

    /// Loads several scenes in one session.
    pub fn load_scenes<I, T>(&self, scenes: I, additive: bool) -> Result<(), LoaderError>
    where
        I: IntoIterator<Item = T>,
        T: Into<SceneId>,
    {
        self.load(LoadRequest::new(scenes, additive))
    }

    /// Queues a fully described request.
    ///
    /// # Errors
    ///
    /// - [`LoaderError::RuntimeStopped`] if the loader thread has exited
    /// - [`LoaderError::CommandQueueFull`] if called from the loader thread
    ///   while the channel is full
    ///
    /// The request's callback receives the same error.
    pub fn load(&self, request: LoadRequest) -> Result<(), LoaderError> {
        self.dispatch(LoaderCommand::Load(request))
            .map_err(|(command, err)| {
                warn!("Dropping load request: {}", err);
                if let LoaderCommand::Load(mut request) = command {
                    request.resolve(Err(err.clone()));
                }
                err
            })
    }

    /// Cancels the active session.
    pub fn cancel(&self) -> Result<(), LoaderError> {
        self.send(LoaderCommand::Cancel)
    }

    /// Cancels the active session and every queued request.
    pub fn cancel_all(&self) -> Result<(), LoaderError> {
        self.send(LoaderCommand::CancelAll)
    }

    /// Receives every event published from the next tick on.
    pub fn subscribe(&self) -> Result<Receiver<LoaderEvent>, LoaderError> {
        let (sender, receiver) = unbounded();
        self.send(LoaderCommand::Subscribe(sender))?;
        Ok(receiver)
    }

    fn send(&self, command: LoaderCommand) -> Result<(), LoaderError> {
        self.dispatch(command).map_err(|(_, err)| err)
    }

    /// Sends `command`, handing it back with the error on failure.
    fn dispatch(&self, command: LoaderCommand) -> Result<(), (LoaderCommand, LoaderError)> {
        if thread::current().id() != self.loader_thread {
            return self
                .sender
                .send(command)
                .map_err(|SendError(command)| (command, LoaderError::RuntimeStopped));
        }

        // A blocking send here would wait on this very thread
        self.sender.try_send(command).map_err(|err| match err {
            TrySendError::Full(command) => (command, LoaderError::CommandQueueFull),
            TrySendError::Disconnected(command) => (command, LoaderError::RuntimeStopped),
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
