//=========================================================================
// Loader Commands
//=========================================================================
//
// Messages sent from any thread to the loader thread.
//
// The loader thread is the single writer of orchestrator state. Other
// threads never touch the orchestrator; they queue commands that are
// applied at the next tick boundary.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;

//=== Internal Dependencies ===============================================

use crate::core::events::LoaderEvent;
use crate::core::scene::LoadRequest;

//=== LoaderCommand =======================================================

/// Commands sent to the loader thread via MPSC.
#[derive(Debug)]
pub(crate) enum LoaderCommand {
    /// Submit a request through the facade.
    Load(LoadRequest),

    /// Cancel the active session.
    Cancel,

    /// Cancel the active session and every queued request.
    CancelAll,

    /// Forward every future event to this sender.
    Subscribe(Sender<LoaderEvent>),

    /// Stop ticking and exit the thread.
    Shutdown,
}
