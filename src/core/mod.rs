//=========================================================================
// Core Loader Systems
//
// Scene loading orchestration and the fixed-rate loop that drives it.
//
// Responsibilities:
// - Model requests, units and the backend/presenter contracts
// - Run the load orchestrator state machine one tick at a time
// - Own the orchestrator on a dedicated thread for multi-threaded hosts,
//   receiving commands via MPSC channel
//
// Notes:
// Single-threaded hosts call `SceneLoader::tick` from their own frame
// loop and never touch `CoreLoop`. Multi-threaded hosts go through
// `LoaderRuntime`, which moves the loader onto the thread spawned here.
//
//=========================================================================

//=== Standard Library Imports ============================================
use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info, warn};

//=== Internal Modules ====================================================
pub mod events;
pub mod orchestrator;
pub mod presenter;
pub mod scene;
pub mod settings;
pub mod signal;

pub(crate) mod command;
mod loader;

#[cfg(test)]
pub(crate) mod test_support;

pub use loader::SceneLoader;

use crate::error::LoaderError;
use command::LoaderCommand;

//=== TickControl =========================================================
//
// Defines control flow for the loader loop.
// Each batch of commands can signal either to continue or terminate.
//
pub(crate) enum TickControl {
    Continue,
    Exit,
}

//=== CoreLoop ============================================================
//
// Owns the scene loader on the loader thread and ticks it at a fixed
// rate using wall-clock seconds since the thread started.
//
pub(crate) struct CoreLoop {
    loader: SceneLoader,
}

impl CoreLoop {
    //--- Construction -----------------------------------------------------
    pub fn new(loader: SceneLoader) -> Self {
        Self { loader }
    }

    //--- spawn_core_thread() ---------------------------------------------
    //
    // Spawns the loader thread.
    //
    // Each tick:
    //  1. Waits up to one frame for commands, then drains the rest
    //  2. Ticks the loader with the elapsed time
    //  3. Sleeps out the remainder of the frame
    //  4. Exits on Shutdown or if the channel disconnects
    //
    // On exit the active session and queued requests are cancelled and
    // commands left in the channel are refused, so every callback fires.
    //
    pub fn spawn_core_thread(
        self,
        receiver: Receiver<LoaderCommand>,
        tps: f64,
    ) -> thread::JoinHandle<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / tps);

        thread::spawn(move || {
            let mut loader = self.loader;
            let epoch = Instant::now();

            loop {
                let frame_start = Instant::now();

                //--- Step 1: Apply queued commands -------------------------
                if let TickControl::Exit =
                    Self::collect_commands(&receiver, &mut loader, frame_duration)
                {
                    break;
                }

                //--- Step 2: Advance the state machine ---------------------
                loader.tick(epoch.elapsed().as_secs_f64());

                //--- Step 3: Maintain fixed pacing -------------------------
                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }

            loader.cancel_all();
            Self::refuse_remaining(&receiver);
            info!("Loader thread exiting.");
        })
    }

    //--- refuse_remaining() ----------------------------------------------
    //
    // Resolves requests still queued behind the exit command. Their
    // senders were told the command was accepted.
    //
    fn refuse_remaining(receiver: &Receiver<LoaderCommand>) {
        for command in receiver.try_iter() {
            if let LoaderCommand::Load(mut request) = command {
                warn!("Refusing load of {:?}: loader thread exiting", request.scenes());
                request.resolve(Err(LoaderError::RuntimeStopped));
            }
        }
    }

    //--- collect_commands() ----------------------------------------------
    //
    // Applies every command received during this frame.
    // Returns a TickControl indicating whether to continue or exit.
    //
    fn collect_commands(
        receiver: &Receiver<LoaderCommand>,
        loader: &mut SceneLoader,
        frame_duration: Duration,
    ) -> TickControl {
        // Wait for at least one command this frame
        match receiver.recv_timeout(frame_duration) {
            Ok(command) => {
                if let TickControl::Exit = Self::apply(command, loader) {
                    return TickControl::Exit;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return TickControl::Exit,
            Err(RecvTimeoutError::Timeout) => {}
        }

        // Drain additional commands queued during this frame
        while let Ok(command) = receiver.try_recv() {
            if let TickControl::Exit = Self::apply(command, loader) {
                return TickControl::Exit;
            }
        }

        TickControl::Continue
    }

    fn apply(command: LoaderCommand, loader: &mut SceneLoader) -> TickControl {
        match command {
            LoaderCommand::Load(request) => {
                // Refusals are logged and delivered to the callback already
                if let Err(err) = loader.load(request) {
                    debug!("Runtime load refused: {}", err);
                }
            }
            LoaderCommand::Cancel => {
                loader.cancel();
            }
            LoaderCommand::CancelAll => loader.cancel_all(),
            LoaderCommand::Subscribe(subscriber) => {
                loader.orchestrator_mut().events_mut().attach(subscriber);
            }
            LoaderCommand::Shutdown => return TickControl::Exit,
        }

        TickControl::Continue
    }
}
