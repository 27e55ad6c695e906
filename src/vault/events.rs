//! "Entries changed" notifications.
//!
//! The presentation layer subscribes once and refreshes its list view
//! whenever an event arrives.

use std::sync::mpsc::{channel, Receiver, Sender};

/// A successful mutation of the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultEvent {
    Created { id: i64 },
    Renamed { id: i64 },
    SecretChanged { id: i64 },
    Deleted { id: i64 },
}

impl VaultEvent {
    pub fn id(&self) -> i64 {
        match *self {
            VaultEvent::Created { id }
            | VaultEvent::Renamed { id }
            | VaultEvent::SecretChanged { id }
            | VaultEvent::Deleted { id } => id,
        }
    }
}

/// Fan-out of `VaultEvent`s to any number of subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<VaultEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<VaultEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber.
    pub fn publish(&mut self, event: VaultEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
