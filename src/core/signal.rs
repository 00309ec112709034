//=========================================================================
// Completion Signals
//=========================================================================
//
// One-shot notifications from external collaborators back into the
// orchestrator.
//
// Architecture:
//   Presenter / LoadHandle ── Signal::fire() ──> channel
//                                                  ↓
//   LoadOrchestrator::tick() ── SignalQueue::drain() (start of tick)
//
// Signals never call into the orchestrator directly. They are queued and
// applied at the next tick boundary, so a collaborator may fire from any
// thread, or synchronously from inside `fade_in`/`on_completed`.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;

//=== LoaderSignal ========================================================

/// Payload carried by a [`Signal`].
///
/// Every payload is stamped with the session that armed it so that a
/// signal outliving its session (for example after a cancel) is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoaderSignal {
    /// The overlay finished fading in.
    FadeInComplete { session: u64 },

    /// The unit at `index` finished loading and activating.
    UnitCompleted { session: u64, index: usize },
}

impl LoaderSignal {
    /// Session the signal belongs to.
    pub(crate) fn session(&self) -> u64 {
        match *self {
            Self::FadeInComplete { session } => session,
            Self::UnitCompleted { session, .. } => session,
        }
    }
}

//=== Signal ==============================================================

/// One-shot completion token handed to a presenter or load handle.
///
/// Consumed by [`Signal::fire`], so it can be delivered at most once.
#[derive(Debug)]
pub struct Signal {
    sender: Sender<LoaderSignal>,
    payload: LoaderSignal,
}

impl Signal {
    /// Notifies the orchestrator. Takes effect on its next tick.
    pub fn fire(self) {
        if self.sender.send(self.payload).is_err() {
            debug!("Dropping {:?}: orchestrator no longer listening", self.payload);
        }
    }
}

//=== SignalQueue =========================================================

/// Receiving end of all signals armed by one orchestrator.
pub(crate) struct SignalQueue {
    sender: Sender<LoaderSignal>,
    receiver: Receiver<LoaderSignal>,
}

impl SignalQueue {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Creates a token that will deliver `payload` when fired.
    pub(crate) fn arm(&self, payload: LoaderSignal) -> Signal {
        Signal {
            sender: self.sender.clone(),
            payload,
        }
    }

    /// Takes every signal fired since the last drain, in firing order.
    pub(crate) fn drain(&self) -> Vec<LoaderSignal> {
        self.receiver.try_iter().collect()
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fired_signals_drain_in_order() {
        let queue = SignalQueue::new();
        let a = queue.arm(LoaderSignal::FadeInComplete { session: 1 });
        let b = queue.arm(LoaderSignal::UnitCompleted { session: 1, index: 2 });

        b.fire();
        a.fire();

        assert_eq!(
            queue.drain(),
            vec![
                LoaderSignal::UnitCompleted { session: 1, index: 2 },
                LoaderSignal::FadeInComplete { session: 1 },
            ]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn unfired_signal_delivers_nothing() {
        let queue = SignalQueue::new();
        let signal = queue.arm(LoaderSignal::FadeInComplete { session: 3 });
        drop(signal);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn signal_fired_from_other_thread_is_queued() {
        let queue = SignalQueue::new();
        let signal = queue.arm(LoaderSignal::UnitCompleted { session: 7, index: 0 });

        std::thread::spawn(move || signal.fire())
            .join()
            .expect("signal thread panicked");

        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].session(), 7);
    }
}
