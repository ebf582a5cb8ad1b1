//! Simulation event feed.
//!
//! The driver publishes human-readable notices (task generated, routed,
//! failed, run finished) into a bounded channel that an external status layer
//! drains on its own schedule. Publishing never blocks the tick loop: when the
//! channel is full the event is dropped.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

/// Severity of a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Info,
    Warning,
    Success,
}

/// One entry in the event feed, stamped with sim-clock seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimEvent {
    pub kind: EventKind,
    pub time: f64,
    pub message: String,
}

const FEED_CAPACITY: usize = 10_000;

/// Publishing half of the feed, held by the engine.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<SimEvent>,
}

impl EventSender {
    pub fn emit(&self, kind: EventKind, time: f64, message: impl Into<String>) {
        let event = SimEvent {
            kind,
            time,
            message: message.into(),
        };
        match self.tx.try_send(event) {
            Ok(()) | Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Draining half of the feed, held by the controller.
#[derive(Debug)]
pub struct EventFeed {
    tx: Sender<SimEvent>,
    rx: Receiver<SimEvent>,
}

impl EventFeed {
    pub fn new() -> Self {
        let (tx, rx) = bounded(FEED_CAPACITY);
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Remove and return every event currently buffered.
    pub fn drain(&self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Default for EventFeed {
    fn default() -> Self {
        Self::new()
    }
}
