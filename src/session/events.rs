//! Session event bus.
//!
//! Pipelines publish session-level signals here. Auth state components
//! subscribe and react (forced logout, transient banners).

use tokio::sync::broadcast;

use crate::routing::Actor;

/// Signals broadcast to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The actor's session cannot be recovered; log out.
    SessionExpired { actor: Actor },
    /// Requests are failing for lack of a network; show the banner.
    NetworkUnavailable { actor: Actor },
}

impl SessionEvent {
    pub fn actor(&self) -> Actor {
        match self {
            SessionEvent::SessionExpired { actor } | SessionEvent::NetworkUnavailable { actor } => {
                *actor
            }
        }
    }
}

/// Broadcast channel for session events.
///
/// Cloning yields another handle to the same bus, so both actors can share
/// one when a single consumer wants every signal.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Returns the number of subscribers reached.
    pub fn publish(&self, event: SessionEvent) -> usize {
        match self.tx.send(event) {
            Ok(reached) => reached,
            Err(_) => {
                tracing::debug!(?event, "No session event subscribers");
                0
            }
        }
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new(64)
    }
}
