//! Non-blocking event delivery from the camera core to the UI thread.
//!
//! The core runs on the UI thread, so a send that could wait for the UI
//! would deadlock it. Events that cannot be queued are dropped.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::Event;

/// Handle the exposure controller, library and studio report through
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Queue an event, dropping it when nobody listens or the queue is full
    pub fn send(&self, event: Event) {
        if self.inner.try_send(event).is_err() {
            tracing::trace!("event dropped: no listener or channel full");
        }
    }
}

/// UI side of the channel, polled after each call into the core
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Wait for the next event; `None` once every sender is gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Everything queued since the last poll, oldest first
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

/// Constructors for a sender/receiver pair
pub struct EventChannel;

impl EventChannel {
    /// A queue that never drops while the receiver is alive
    pub fn new() -> (EventSender, EventReceiver) {
        pair(unbounded())
    }

    /// A queue holding at most `capacity` events between UI polls
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        pair(bounded(capacity))
    }
}

fn pair((sender, receiver): (Sender<Event>, Receiver<Event>)) -> (EventSender, EventReceiver) {
    (
        EventSender { inner: sender },
        EventReceiver { inner: receiver },
    )
}

/// Sender for components constructed without a listener
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
