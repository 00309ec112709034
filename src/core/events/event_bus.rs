//=========================================================================
// Event Bus
//=========================================================================
//
// Multi-consumer fan-out for loader events.
//
// Pattern: begin_frame → publish → end_frame → read (N consumers) → repeat
//          publish → Receiver (N channel subscribers, any thread)
//
// `read` returns the events of the last tick plus any published since it
// ended. Events published between ticks (a request accepted from outside
// the tick) stay readable through the following tick. Channel subscribers
// receive every event until they drop their receiver.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;

//=== Internal Dependencies ===============================================

use super::LoaderEvent;

//=== EventBus ============================================================

/// Publishes [`LoaderEvent`]s to per-tick readers and channel subscribers.
pub struct EventBus {
    frame: Vec<LoaderEvent>,
    /// Events at the front of `frame` that belong to the last ended tick.
    sealed: usize,
    subscribers: Vec<Sender<LoaderEvent>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            frame: Vec::new(),
            sealed: 0,
            subscribers: Vec::new(),
        }
    }

    //--- Publishing -------------------------------------------------------

    /// Records `event` for this tick and forwards it to every subscriber.
    ///
    /// Subscribers whose receiver was dropped are pruned.
    pub fn publish(&mut self, event: LoaderEvent) {
        let before = self.subscribers.len();
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());

        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            debug!("Pruned {} disconnected event subscriber(s)", pruned);
        }

        self.frame.push(event);
    }

    //--- Subscription -----------------------------------------------------

    /// Returns a receiver for every event published from now on.
    pub fn subscribe(&mut self) -> Receiver<LoaderEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Registers an externally created sender as a subscriber.
    pub fn attach(&mut self, subscriber: Sender<LoaderEvent>) {
        self.subscribers.push(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    //--- Per-Tick Access --------------------------------------------------

    /// Events of the last tick and any published since.
    pub fn read(&self) -> &[LoaderEvent] {
        &self.frame
    }

    /// Starts a tick: drops the previous tick's events and keeps those
    /// published since it ended.
    pub fn begin_frame(&mut self) {
        self.frame.drain(..self.sealed);
        self.sealed = 0;
    }

    /// Ends a tick: everything published so far is dropped by the next
    /// `begin_frame`.
    pub fn end_frame(&mut self) {
        self.sealed = self.frame.len();
    }

    /// Drops every readable event, keeping capacity for reuse.
    pub fn clear(&mut self) {
        self.frame.clear();
        self.sealed = 0;
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
